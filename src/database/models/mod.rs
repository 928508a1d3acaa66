pub mod admin;
pub mod tweet;

pub use admin::{Admin, NewAdmin};
pub use tweet::{NewTweet, Tweet};
