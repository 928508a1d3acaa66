use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Client-supplied search parameters. Every field is untrusted text.
///
/// `limit` and `offset` stay strings here so that a malformed number is
/// reported as a filter error naming the parameter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TweetQuery {
    pub author: Option<String>,
    pub date: Option<String>,
    pub location: Option<String>,
    pub source: Option<String>,
    #[serde(alias = "text")]
    pub q: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl TweetQuery {
    pub fn author(value: impl Into<String>) -> Self {
        Self { author: Some(value.into()), ..Default::default() }
    }

    pub fn date(value: impl Into<String>) -> Self {
        Self { date: Some(value.into()), ..Default::default() }
    }

    pub fn location(value: impl Into<String>) -> Self {
        Self { location: Some(value.into()), ..Default::default() }
    }

    pub fn source(value: impl Into<String>) -> Self {
        Self { source: Some(value.into()), ..Default::default() }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self { q: Some(value.into()), ..Default::default() }
    }
}

/// Whitelisted tweet columns. SQL text only ever contains these names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Id,
    Author,
    Content,
    Location,
    Source,
    CreatedAt,
}

impl Column {
    pub const ALL: [Column; 6] = [
        Column::Id,
        Column::Author,
        Column::Content,
        Column::Location,
        Column::Source,
        Column::CreatedAt,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::Author => "author",
            Column::Content => "content",
            Column::Location => "location",
            Column::Source => "source",
            Column::CreatedAt => "created_at",
        }
    }

    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Like,
    Gte,
    Lt,
}

/// A value bound to a `?` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Timestamp(DateTime<Utc>),
    Integer(i64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterWhereInfo {
    pub column: Column,
    pub operator: FilterOp,
    pub data: SqlParam,
}

/// Listings are newest first only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterOrderInfo {
    pub column: Column,
    pub sort: SortDirection,
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<SqlParam>,
}
