use sqlx::query::{QueryAs, QueryScalar};
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteRow};
use sqlx::FromRow;

use crate::database::manager::{Database, DatabaseError};
use crate::filter::{SqlParam, SqlResult};

/// Executes a rendered `SqlResult`, binding every parameter positionally.
pub struct QueryBuilder<T> {
    sql_result: SqlResult,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> QueryBuilder<T>
where
    T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    pub fn new(sql_result: SqlResult) -> Self {
        Self {
            sql_result,
            _phantom: std::marker::PhantomData,
        }
    }

    pub async fn select_all(&self, db: &Database) -> Result<Vec<T>, DatabaseError> {
        let q = bind_param_query_as(sqlx::query_as::<_, T>(&self.sql_result.query), &self.sql_result.params);
        db.run(q.fetch_all(db.pool())).await
    }
}

/// Runs a `SELECT COUNT(*) AS count …` statement.
pub async fn count(db: &Database, sql_result: &SqlResult) -> Result<i64, DatabaseError> {
    let q = bind_param_query_scalar(sqlx::query_scalar::<_, i64>(&sql_result.query), &sql_result.params);
    db.run(q.fetch_one(db.pool())).await
}

fn bind_param_query_as<'q, O>(
    mut q: QueryAs<'q, Sqlite, O, SqliteArguments<'q>>,
    params: &'q [SqlParam],
) -> QueryAs<'q, Sqlite, O, SqliteArguments<'q>>
where
    O: for<'r> FromRow<'r, SqliteRow>,
{
    for p in params {
        q = match p {
            SqlParam::Text(s) => q.bind(s.as_str()),
            SqlParam::Timestamp(t) => q.bind(*t),
            SqlParam::Integer(i) => q.bind(*i),
        };
    }
    q
}

fn bind_param_query_scalar<'q>(
    mut q: QueryScalar<'q, Sqlite, i64, SqliteArguments<'q>>,
    params: &'q [SqlParam],
) -> QueryScalar<'q, Sqlite, i64, SqliteArguments<'q>> {
    for p in params {
        q = match p {
            SqlParam::Text(s) => q.bind(s.as_str()),
            SqlParam::Timestamp(t) => q.bind(*t),
            SqlParam::Integer(i) => q.bind(*i),
        };
    }
    q
}
