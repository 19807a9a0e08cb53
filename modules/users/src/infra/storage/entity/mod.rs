pub mod bookmark;
pub mod follow;
pub mod user;
