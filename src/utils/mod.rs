pub mod cookie;
pub mod jwt;
pub mod password;
pub mod sanitize;

pub use jwt::{encode_access_token, encode_refresh_token, hash_refresh_token};
pub use password::{hash_password, verify_password};
pub use sanitize::sanitize_text;
