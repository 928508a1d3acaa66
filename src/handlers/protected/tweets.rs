// handlers/protected/tweets.rs - POST /api/tweets handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};

use crate::app::AppState;
use crate::auth::Claims;
use crate::database::models::{NewTweet, Tweet};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

/**
 * POST /api/tweets - Store a new tweet
 *
 * Body: { "author", "content", "location"?, "source"?, "created_at"? }
 * Returns 201 with the stored tweet.
 */
pub async fn tweet_post(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    body: Result<Json<NewTweet>, JsonRejection>,
) -> ApiResult<Tweet> {
    let Json(new_tweet) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
    new_tweet
        .validate()
        .map_err(|field_errors| ApiError::validation_error("Invalid tweet", Some(field_errors)))?;

    let tweet = state.tweets.insert(new_tweet).await?;
    tracing::info!("Tweet {} stored by '{}'", tweet.id, claims.username);
    Ok(ApiResponse::created(tweet))
}
