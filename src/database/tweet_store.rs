use chrono::Utc;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::config::FilterConfig;
use crate::database::manager::{Database, DatabaseError};
use crate::database::models::{NewTweet, Tweet};
use crate::database::query_builder::{count, QueryBuilder};
use crate::filter::{Filter, TweetQuery};

const TWEETS_TABLE: &str = "tweets";

/// One page of search results.
#[derive(Debug, Clone, Serialize)]
pub struct TweetPage {
    pub items: Vec<Tweet>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Clone, Debug)]
pub struct TweetStore {
    db: Database,
    filter_config: FilterConfig,
}

impl TweetStore {
    pub fn new(db: Database, filter_config: FilterConfig) -> Self {
        Self { db, filter_config }
    }

    /// Runs a validated, bounded search. Absent dimensions match everything.
    pub async fn search(&self, query: &TweetQuery) -> Result<TweetPage, DatabaseError> {
        let mut filter = Filter::new(TWEETS_TABLE, &self.filter_config)?;
        filter.assign(query, &self.filter_config)?;

        let select = filter.to_sql();
        let count_sql = filter.to_count_sql();
        if self.filter_config.debug_logging {
            debug!("Tweet search SQL: {}", select.query);
        }

        let items = QueryBuilder::<Tweet>::new(select).select_all(&self.db).await?;
        let total = count(&self.db, &count_sql).await?;

        Ok(TweetPage {
            items,
            total,
            limit: filter.applied_limit(),
            offset: filter.applied_offset(),
        })
    }

    pub async fn insert(&self, new_tweet: NewTweet) -> Result<Tweet, DatabaseError> {
        let sql = "INSERT INTO tweets (id, author, content, location, source, created_at) \
                   VALUES (?, ?, ?, ?, ?, ?) \
                   RETURNING id, author, content, location, source, created_at";
        let query = sqlx::query_as::<_, Tweet>(sql)
            .bind(Uuid::new_v4())
            .bind(new_tweet.author.trim())
            .bind(new_tweet.content)
            .bind(new_tweet.location.as_deref().map(str::trim))
            .bind(new_tweet.source.as_deref().map(str::trim))
            .bind(new_tweet.created_at.unwrap_or_else(Utc::now));
        self.db.run(query.fetch_one(self.db.pool())).await
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<Tweet>, DatabaseError> {
        let sql = "SELECT id, author, content, location, source, created_at FROM tweets WHERE id = ?";
        let query = sqlx::query_as::<_, Tweet>(sql).bind(id);
        self.db.run(query.fetch_optional(self.db.pool())).await
    }

    /// Returns false when no tweet had that id.
    pub async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let query = sqlx::query("DELETE FROM tweets WHERE id = ?").bind(id);
        let result = self.db.run(query.execute(self.db.pool())).await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::filter::FilterError;
    use chrono::TimeZone;

    async fn store() -> TweetStore {
        let db = Database::connect(&DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            query_timeout_secs: 5,
        })
        .await
        .unwrap();
        db.migrate().await.unwrap();
        TweetStore::new(
            db,
            FilterConfig {
                default_limit: 2,
                max_limit: 3,
                debug_logging: false,
            },
        )
    }

    async fn seed(store: &TweetStore) {
        let day = |d: u32, h: u32| Utc.with_ymd_and_hms(2024, 1, d, h, 0, 0).unwrap();
        let tweets = [
            NewTweet::new("alice", "hello world").location("NYC").source("web").created_at(day(1, 9)),
            NewTweet::new("alice", "100% sure").location("LA").source("android").created_at(day(2, 9)),
            NewTweet::new("alicia", "hi there").location("NYC").source("web").created_at(day(2, 23)),
            NewTweet::new("bob", "Hello again").source("iphone").created_at(day(3, 0)),
        ];
        for tweet in tweets {
            store.insert(tweet).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_search_applies_default_limit_and_order() {
        let store = store().await;
        seed(&store).await;

        let page = store.search(&TweetQuery::default()).await.unwrap();
        assert_eq!(page.total, 4);
        assert_eq!(page.limit, 2);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].author, "bob");
        assert_eq!(page.items[1].author, "alicia");
    }

    #[tokio::test]
    async fn test_search_caps_limit_and_offsets() {
        let store = store().await;
        seed(&store).await;

        let query = TweetQuery {
            limit: Some("100".to_string()),
            offset: Some("2".to_string()),
            ..Default::default()
        };
        let page = store.search(&query).await.unwrap();
        assert_eq!(page.limit, 3);
        assert_eq!(page.offset, 2);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 4);
    }

    #[tokio::test]
    async fn test_author_exact_and_prefix() {
        let store = store().await;
        seed(&store).await;

        let exact = store.search(&TweetQuery::author("alice")).await.unwrap();
        assert_eq!(exact.total, 2);

        let prefix = store.search(&TweetQuery::author("ali*")).await.unwrap();
        assert_eq!(prefix.total, 3);
    }

    #[tokio::test]
    async fn test_text_search_treats_wildcards_literally() {
        let store = store().await;
        seed(&store).await;

        let page = store.search(&TweetQuery::text("100%")).await.unwrap();
        assert_eq!(page.total, 1);

        let page = store.search(&TweetQuery::text("%")).await.unwrap();
        assert_eq!(page.total, 1);

        let page = store.search(&TweetQuery::text("hello")).await.unwrap();
        assert_eq!(page.total, 2);
    }

    #[tokio::test]
    async fn test_date_day_and_composition() {
        let store = store().await;
        seed(&store).await;

        let page = store.search(&TweetQuery::date("2024-01-02")).await.unwrap();
        assert_eq!(page.total, 2);

        let query = TweetQuery {
            date: Some("2024-01-02".to_string()),
            location: Some("NYC".to_string()),
            ..Default::default()
        };
        let page = store.search(&query).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].author, "alicia");
    }

    #[tokio::test]
    async fn test_invalid_filter_is_reported() {
        let store = store().await;
        let err = store.search(&TweetQuery::date("2024-13-40")).await.unwrap_err();
        match err {
            DatabaseError::InvalidFilter(e) => assert_eq!(e.parameter(), Some("date")),
            other => panic!("unexpected error: {:?}", other),
        }

        let err = store
            .search(&TweetQuery { limit: Some("-1".to_string()), ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidFilter(FilterError::InvalidParameter { parameter: "limit", .. })));
    }

    #[tokio::test]
    async fn test_insert_find_delete() {
        let store = store().await;
        let tweet = store.insert(NewTweet::new("carol", "bye")).await.unwrap();

        assert_eq!(store.find(tweet.id).await.unwrap(), Some(tweet.clone()));
        assert!(store.delete(tweet.id).await.unwrap());
        assert!(!store.delete(tweet.id).await.unwrap());
        assert!(store.find(tweet.id).await.unwrap().is_none());
    }
}
