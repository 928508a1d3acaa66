// handlers/public/tweets.rs - GET /api/tweets and the per-dimension search routes

use axum::extract::{rejection::QueryRejection, Path, Query, State};
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::Tweet;
use crate::database::TweetPage;
use crate::error::ApiError;
use crate::filter::{FilterError, TweetQuery};
use crate::middleware::{ApiResponse, ApiResult};

type QueryParams = Result<Query<TweetQuery>, QueryRejection>;

/**
 * GET /api/tweets - Combined search
 *
 * Any of author, date, location, source and q (or text) may be combined;
 * present dimensions are AND-ed. Without filters this lists every tweet,
 * newest first, one page at a time (limit/offset).
 */
pub async fn tweets_get(State(state): State<AppState>, params: QueryParams) -> ApiResult<TweetPage> {
    let query = unpack(params)?;
    search(&state, query).await
}

/// GET /api/tweets/tweet?q= - free-text search on content
pub async fn tweets_by_text(State(state): State<AppState>, params: QueryParams) -> ApiResult<TweetPage> {
    let query = unpack(params)?;
    let value = required("q", query.q.clone())?;
    search(&state, narrowed(TweetQuery::text(value), query)).await
}

/// GET /api/tweets/author?author= - exact author, or prefix with a trailing `*`
pub async fn tweets_by_author(State(state): State<AppState>, params: QueryParams) -> ApiResult<TweetPage> {
    let query = unpack(params)?;
    let value = required("author", query.author.clone())?;
    search(&state, narrowed(TweetQuery::author(value), query)).await
}

/// GET /api/tweets/date?date= - one day or a START..END range
pub async fn tweets_by_date(State(state): State<AppState>, params: QueryParams) -> ApiResult<TweetPage> {
    let query = unpack(params)?;
    let value = required("date", query.date.clone())?;
    search(&state, narrowed(TweetQuery::date(value), query)).await
}

pub async fn tweets_by_location(State(state): State<AppState>, params: QueryParams) -> ApiResult<TweetPage> {
    let query = unpack(params)?;
    let value = required("location", query.location.clone())?;
    search(&state, narrowed(TweetQuery::location(value), query)).await
}

pub async fn tweets_by_source(State(state): State<AppState>, params: QueryParams) -> ApiResult<TweetPage> {
    let query = unpack(params)?;
    let value = required("source", query.source.clone())?;
    search(&state, narrowed(TweetQuery::source(value), query)).await
}

/// GET /api/tweets/:id - a single tweet. Malformed ids are simply not found.
pub async fn tweet_get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Tweet> {
    let not_found = || ApiError::not_found(format!("Tweet '{}' not found", id));
    let uuid = Uuid::parse_str(&id).map_err(|_| not_found())?;

    match state.tweets.find(uuid).await? {
        Some(tweet) => Ok(ApiResponse::success(tweet)),
        None => Err(not_found()),
    }
}

async fn search(state: &AppState, query: TweetQuery) -> ApiResult<TweetPage> {
    let page = state.tweets.search(&query).await?;
    Ok(ApiResponse::success(page))
}

fn unpack(params: QueryParams) -> Result<TweetQuery, ApiError> {
    params
        .map(|Query(query)| query)
        .map_err(|e| ApiError::bad_request(e.body_text()))
}

fn required(parameter: &'static str, value: Option<String>) -> Result<String, FilterError> {
    value.ok_or(FilterError::MissingParameter(parameter))
}

/// Keeps only the route's own dimension plus pagination.
fn narrowed(mut single: TweetQuery, original: TweetQuery) -> TweetQuery {
    single.limit = original.limit;
    single.offset = original.offset;
    single
}
