pub mod auth;
pub mod bootstrap_admin;
pub mod cache;
pub mod category;
pub mod comment;
pub mod dashboard;
pub mod email;
pub mod feed;
pub mod leaderboard;
pub mod points;
pub mod report;
pub mod upload;
pub mod upvote;
pub mod user;
