use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{Column, FilterOrderInfo, FilterWhereInfo, SqlParam, SqlResult, TweetQuery};
use crate::config::FilterConfig;

/// A validated, bounded read over one table.
#[derive(Debug, Clone)]
pub struct Filter {
    table_name: String,
    conditions: Vec<FilterWhereInfo>,
    order_data: Vec<FilterOrderInfo>,
    limit: i64,
    offset: i64,
}

impl Filter {
    pub fn new(table_name: impl Into<String>, config: &FilterConfig) -> Result<Self, FilterError> {
        let table_name = table_name.into();
        Self::validate_table_name(&table_name)?;
        Ok(Self {
            table_name,
            conditions: vec![],
            order_data: FilterOrder::default_order(),
            limit: config.default_limit,
            offset: 0,
        })
    }

    /// Applies every filter dimension and the pagination of `query`.
    pub fn assign(&mut self, query: &TweetQuery, config: &FilterConfig) -> Result<&mut Self, FilterError> {
        self.conditions = FilterWhere::parse(query)?;

        let limit = match &query.limit {
            Some(raw) => parse_number("limit", raw)?,
            None => config.default_limit,
        };
        let offset = match &query.offset {
            Some(raw) => parse_number("offset", raw)?,
            None => 0,
        };
        self.limit(limit, offset, config)?;
        Ok(self)
    }

    pub fn limit(&mut self, limit: i64, offset: i64, config: &FilterConfig) -> Result<&mut Self, FilterError> {
        if limit < 1 {
            return Err(FilterError::invalid("limit", "must be at least 1"));
        }
        if offset < 0 {
            return Err(FilterError::invalid("offset", "must be non-negative"));
        }

        let applied_limit = if limit > config.max_limit {
            if config.debug_logging {
                tracing::debug!("Limit {} exceeds max {}, capping to max", limit, config.max_limit);
            }
            config.max_limit
        } else {
            limit
        };

        self.limit = applied_limit;
        self.offset = offset;
        Ok(self)
    }

    pub fn applied_limit(&self) -> i64 {
        self.limit
    }

    pub fn applied_offset(&self) -> i64 {
        self.offset
    }

    pub fn to_sql(&self) -> SqlResult {
        let (where_clause, mut params) = FilterWhere::generate(&self.conditions);
        let order_clause = FilterOrder::generate(&self.order_data);
        params.push(SqlParam::Integer(self.limit));
        params.push(SqlParam::Integer(self.offset));

        let query = [
            format!("SELECT {}", Self::select_clause()),
            format!("FROM \"{}\"", self.table_name),
            if where_clause.is_empty() { String::new() } else { format!("WHERE {}", where_clause) },
            order_clause,
            "LIMIT ? OFFSET ?".to_string(),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        SqlResult { query, params }
    }

    pub fn to_count_sql(&self) -> SqlResult {
        let (where_clause, params) = FilterWhere::generate(&self.conditions);
        let query = if where_clause.is_empty() {
            format!("SELECT COUNT(*) AS count FROM \"{}\"", self.table_name)
        } else {
            format!("SELECT COUNT(*) AS count FROM \"{}\" WHERE {}", self.table_name, where_clause)
        };
        SqlResult { query, params }
    }

    fn select_clause() -> String {
        Column::ALL
            .iter()
            .map(|c| c.quoted())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn validate_table_name(name: &str) -> Result<(), FilterError> {
        let mut chars = name.chars();
        let valid_start = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
        if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(FilterError::InvalidTableName(name.to_string()));
        }
        Ok(())
    }
}

fn parse_number(parameter: &'static str, raw: &str) -> Result<i64, FilterError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| FilterError::invalid(parameter, format!("'{}' is not an integer", raw.trim())))
}
