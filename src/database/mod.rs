pub mod admin_store;
pub mod manager;
pub mod models;
pub mod query_builder;
pub mod tweet_store;

pub use admin_store::{AdminStore, Upserted};
pub use manager::{Database, DatabaseError};
pub use tweet_store::{TweetPage, TweetStore};
