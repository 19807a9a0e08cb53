pub mod like;
pub mod tweet;
