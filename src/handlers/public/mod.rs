// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Security Level: None
// Routes: POST /api/fortauth, GET /api/tweets[/...]
//
// Every input here is untrusted. Search parameters go through the filter
// module before they reach SQL.

pub mod fortauth; // POST /api/fortauth - exchange credentials for a token
pub mod tweets;   // GET /api/tweets* - tweet search and lookup

pub use fortauth::fortauth_post;
pub use tweets::{
    tweet_get, tweets_by_author, tweets_by_date, tweets_by_location, tweets_by_source, tweets_by_text, tweets_get,
};
