pub mod auth;
pub mod category;
pub mod comment;
pub mod dashboard;
pub mod leaderboard;
pub mod report;
pub mod upload;
pub mod upvote;
pub mod user;

pub use auth::*;
