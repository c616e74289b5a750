pub mod category;
pub mod comment;
pub mod points_ledger;
pub mod refresh_token;
pub mod report;
pub mod upvote;
pub mod user;

pub use category::{Entity as Category, Model as CategoryModel};
pub use comment::{Entity as Comment, Model as CommentModel};
pub use points_ledger::Entity as PointsLedger;
pub use refresh_token::Entity as RefreshToken;
pub use report::{Entity as Report, Model as ReportModel};
pub use upvote::{Entity as Upvote, Model as UpvoteModel};
pub use user::{Entity as User, Model as UserModel};
