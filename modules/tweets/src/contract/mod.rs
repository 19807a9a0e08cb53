pub mod model;

pub use model::{AuthorSnapshot, NewTweet, TimelineScope, Tweet};
