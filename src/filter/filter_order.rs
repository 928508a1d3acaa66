use super::types::{Column, FilterOrderInfo, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    /// Newest first, with the id as tie-breaker so pages are stable.
    pub fn default_order() -> Vec<FilterOrderInfo> {
        vec![
            FilterOrderInfo { column: Column::CreatedAt, sort: SortDirection::Desc },
            FilterOrderInfo { column: Column::Id, sort: SortDirection::Desc },
        ]
    }

    pub fn generate(infos: &[FilterOrderInfo]) -> String {
        if infos.is_empty() {
            return String::new();
        }
        let parts: Vec<String> = infos
            .iter()
            .map(|i| format!("{} {}", i.column.quoted(), i.sort.to_sql()))
            .collect();
        format!("ORDER BY {}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_order_sql() {
        assert_eq!(
            FilterOrder::generate(&FilterOrder::default_order()),
            "ORDER BY \"created_at\" DESC, \"id\" DESC"
        );
        assert_eq!(FilterOrder::generate(&[]), "");
    }
}
