use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};

use super::error::FilterError;
use super::types::{Column, FilterOp, FilterWhereInfo, SqlParam, TweetQuery};

const MAX_AUTHOR_LEN: usize = 64;
const MAX_TEXT_LEN: usize = 280;
const MAX_LOCATION_LEN: usize = 100;
const MAX_SOURCE_LEN: usize = 100;
const MAX_YEAR: i32 = 9999;

/// Translates a `TweetQuery` into column conditions and renders them as a
/// parameterized WHERE clause.
pub struct FilterWhere {
    param_values: Vec<SqlParam>,
}

impl FilterWhere {
    pub fn new() -> Self {
        Self { param_values: vec![] }
    }

    /// Validates every present dimension. Absent dimensions add nothing.
    pub fn parse(query: &TweetQuery) -> Result<Vec<FilterWhereInfo>, FilterError> {
        let mut conditions = vec![];

        if let Some(raw) = &query.author {
            conditions.push(Self::parse_author(raw)?);
        }
        if let Some(raw) = &query.date {
            conditions.extend(Self::parse_date(raw)?);
        }
        if let Some(raw) = &query.location {
            let value = clean_value("location", raw, MAX_LOCATION_LEN)?;
            conditions.push(FilterWhereInfo { column: Column::Location, operator: FilterOp::Eq, data: SqlParam::Text(value) });
        }
        if let Some(raw) = &query.source {
            let value = clean_value("source", raw, MAX_SOURCE_LEN)?;
            conditions.push(FilterWhereInfo { column: Column::Source, operator: FilterOp::Eq, data: SqlParam::Text(value) });
        }
        if let Some(raw) = &query.q {
            let value = clean_value("q", raw, MAX_TEXT_LEN)?;
            let pattern = format!("%{}%", escape_like(&value));
            conditions.push(FilterWhereInfo { column: Column::Content, operator: FilterOp::Like, data: SqlParam::Text(pattern) });
        }

        Ok(conditions)
    }

    pub fn generate(conditions: &[FilterWhereInfo]) -> (String, Vec<SqlParam>) {
        let mut filter_where = Self::new();
        let sql_conditions: Vec<String> = conditions
            .iter()
            .map(|c| filter_where.build_sql_condition(c))
            .collect();
        (sql_conditions.join(" AND "), filter_where.param_values)
    }

    fn parse_author(raw: &str) -> Result<FilterWhereInfo, FilterError> {
        let value = clean_value("author", raw, MAX_AUTHOR_LEN)?;
        match value.strip_suffix('*') {
            Some(prefix) => {
                if prefix.is_empty() {
                    return Err(FilterError::invalid("author", "prefix before '*' must not be empty"));
                }
                Ok(FilterWhereInfo {
                    column: Column::Author,
                    operator: FilterOp::Like,
                    data: SqlParam::Text(format!("{}%", escape_like(prefix))),
                })
            }
            None => Ok(FilterWhereInfo { column: Column::Author, operator: FilterOp::Eq, data: SqlParam::Text(value) }),
        }
    }

    /// `YYYY-MM-DD` selects one UTC day; `START..END` selects whole days,
    /// inclusive, with either bound optional.
    fn parse_date(raw: &str) -> Result<Vec<FilterWhereInfo>, FilterError> {
        let value = raw.trim();
        let (start, end) = match value.split_once("..") {
            Some((start, end)) => {
                let start = optional_day(start)?;
                let end = optional_day(end)?;
                if start.is_none() && end.is_none() {
                    return Err(FilterError::invalid("date", "range needs at least one bound"));
                }
                if let (Some(s), Some(e)) = (start, end) {
                    if s > e {
                        return Err(FilterError::invalid("date", "range start is after its end"));
                    }
                }
                (start, end)
            }
            None => {
                let day = parse_day(value)?;
                (Some(day), Some(day))
            }
        };

        let mut conditions = vec![];
        if let Some(day) = start {
            conditions.push(FilterWhereInfo { column: Column::CreatedAt, operator: FilterOp::Gte, data: SqlParam::Timestamp(start_of(day)?) });
        }
        // Stored timestamps are text, so a bound past year 9999 would not
        // compare as a date. The last representable day is left open.
        if let Some(next) = end.and_then(|day| day.succ_opt()).filter(|next| next.year() <= MAX_YEAR) {
            conditions.push(FilterWhereInfo { column: Column::CreatedAt, operator: FilterOp::Lt, data: SqlParam::Timestamp(start_of(next)?) });
        }
        Ok(conditions)
    }

    fn build_sql_condition(&mut self, condition: &FilterWhereInfo) -> String {
        let quoted_column = condition.column.quoted();
        let placeholder = self.param(condition.data.clone());
        match condition.operator {
            FilterOp::Eq => format!("{} = {}", quoted_column, placeholder),
            FilterOp::Like => format!("{} LIKE {} ESCAPE '\\'", quoted_column, placeholder),
            FilterOp::Gte => format!("{} >= {}", quoted_column, placeholder),
            FilterOp::Lt => format!("{} < {}", quoted_column, placeholder),
        }
    }

    fn param(&mut self, value: SqlParam) -> String {
        self.param_values.push(value);
        "?".to_string()
    }
}

impl Default for FilterWhere {
    fn default() -> Self {
        Self::new()
    }
}

/// Escapes LIKE wildcards so user input only ever matches literally.
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn clean_value(parameter: &'static str, raw: &str, max_len: usize) -> Result<String, FilterError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(FilterError::invalid(parameter, "must not be empty"));
    }
    if value.chars().count() > max_len {
        return Err(FilterError::invalid(parameter, format!("must be at most {} characters", max_len)));
    }
    if value.chars().any(char::is_control) {
        return Err(FilterError::invalid(parameter, "must not contain control characters"));
    }
    Ok(value.to_string())
}

fn parse_day(raw: &str) -> Result<NaiveDate, FilterError> {
    let day = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| FilterError::invalid("date", format!("'{}' is not a YYYY-MM-DD date", raw.trim())))?;
    if !(0..=MAX_YEAR).contains(&day.year()) {
        return Err(FilterError::invalid("date", format!("'{}' is outside years 0000-9999", raw.trim())));
    }
    Ok(day)
}

fn optional_day(raw: &str) -> Result<Option<NaiveDate>, FilterError> {
    if raw.trim().is_empty() {
        Ok(None)
    } else {
        parse_day(raw).map(Some)
    }
}

fn start_of(day: NaiveDate) -> Result<DateTime<Utc>, FilterError> {
    let midnight = day
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| FilterError::invalid("date", "date is out of range"))?;
    Ok(Utc.from_utc_datetime(&midnight))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> SqlParam {
        SqlParam::Timestamp(DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc))
    }

    #[test]
    fn test_empty_query_has_no_conditions() {
        let conditions = FilterWhere::parse(&TweetQuery::default()).unwrap();
        assert!(conditions.is_empty());
        let (sql, params) = FilterWhere::generate(&conditions);
        assert!(sql.is_empty());
        assert!(params.is_empty());
    }

    #[test]
    fn test_author_exact_and_prefix() {
        let exact = FilterWhere::parse(&TweetQuery::author("alice")).unwrap();
        assert_eq!(exact[0].operator, FilterOp::Eq);
        assert_eq!(exact[0].data, SqlParam::Text("alice".to_string()));

        let prefix = FilterWhere::parse(&TweetQuery::author("al_*")).unwrap();
        assert_eq!(prefix[0].operator, FilterOp::Like);
        assert_eq!(prefix[0].data, SqlParam::Text("al\\_%".to_string()));

        let err = FilterWhere::parse(&TweetQuery::author("*")).unwrap_err();
        assert_eq!(err.parameter(), Some("author"));
    }

    #[test]
    fn test_single_day_becomes_half_open_range() {
        let conditions = FilterWhere::parse(&TweetQuery::date("2024-02-28")).unwrap();
        assert_eq!(conditions.len(), 2);
        assert_eq!(conditions[0].operator, FilterOp::Gte);
        assert_eq!(conditions[0].data, ts("2024-02-28T00:00:00Z"));
        assert_eq!(conditions[1].operator, FilterOp::Lt);
        assert_eq!(conditions[1].data, ts("2024-02-29T00:00:00Z"));
    }

    #[test]
    fn test_date_ranges() {
        let both = FilterWhere::parse(&TweetQuery::date("2024-01-01..2024-01-31")).unwrap();
        assert_eq!(both.len(), 2);
        assert_eq!(both[1].data, ts("2024-02-01T00:00:00Z"));

        let open_end = FilterWhere::parse(&TweetQuery::date("2024-01-01..")).unwrap();
        assert_eq!(open_end.len(), 1);
        assert_eq!(open_end[0].operator, FilterOp::Gte);

        let open_start = FilterWhere::parse(&TweetQuery::date("..2024-01-01")).unwrap();
        assert_eq!(open_start.len(), 1);
        assert_eq!(open_start[0].operator, FilterOp::Lt);
    }

    #[test]
    fn test_range_ending_on_last_year_leaves_upper_bound_open() {
        let conditions = FilterWhere::parse(&TweetQuery::date("2024-03-01..9999-12-31")).unwrap();
        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions[0].operator, FilterOp::Gte);
        assert_eq!(conditions[0].data, ts("2024-03-01T00:00:00Z"));

        let last_day = FilterWhere::parse(&TweetQuery::date("9999-12-31")).unwrap();
        assert_eq!(last_day.len(), 1);

        let err = FilterWhere::parse(&TweetQuery::date("+10000-01-01")).unwrap_err();
        assert_eq!(err.parameter(), Some("date"));
    }

    #[test]
    fn test_malformed_dates_name_the_parameter() {
        for raw in ["yesterday", "2024-13-01", "2024-02-30", "..", "2024-02-01..2024-01-01", "'; DROP TABLE tweets; --"] {
            let err = FilterWhere::parse(&TweetQuery::date(raw)).unwrap_err();
            assert_eq!(err.parameter(), Some("date"), "input {:?}", raw);
        }
    }

    #[test]
    fn test_text_is_escaped_substring() {
        let conditions = FilterWhere::parse(&TweetQuery::text("100%_off")).unwrap();
        assert_eq!(conditions[0].column, Column::Content);
        assert_eq!(conditions[0].data, SqlParam::Text("%100\\%\\_off%".to_string()));
    }

    #[test]
    fn test_value_validation() {
        let err = FilterWhere::parse(&TweetQuery::location("   ")).unwrap_err();
        assert_eq!(err.parameter(), Some("location"));

        let err = FilterWhere::parse(&TweetQuery::location("NYC\u{0}")).unwrap_err();
        assert_eq!(err.parameter(), Some("location"));

        let err = FilterWhere::parse(&TweetQuery::source("x".repeat(101))).unwrap_err();
        assert_eq!(err.parameter(), Some("source"));

        let err = FilterWhere::parse(&TweetQuery::text("y".repeat(281))).unwrap_err();
        assert_eq!(err.parameter(), Some("q"));
    }

    #[test]
    fn test_generated_sql_never_contains_values() {
        let query = TweetQuery {
            author: Some("alice' OR '1'='1".to_string()),
            location: Some("NYC\"; --".to_string()),
            source: Some("web".to_string()),
            q: Some("'); DROP TABLE tweets; --".to_string()),
            ..Default::default()
        };
        let conditions = FilterWhere::parse(&query).unwrap();
        let (sql, params) = FilterWhere::generate(&conditions);

        assert_eq!(
            sql,
            "\"author\" = ? AND \"location\" = ? AND \"source\" = ? AND \"content\" LIKE ? ESCAPE '\\'"
        );
        assert_eq!(params.len(), 4);
        assert_eq!(params[0], SqlParam::Text("alice' OR '1'='1".to_string()));
        assert!(!sql.contains("DROP"));
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("50%"), "50\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
    }
}
