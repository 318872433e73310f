//! Translation of a [`QueryFilter`] into one SQL statement
//!
//! Each filter dimension adds a join and a condition. Meta filters each get
//! their own `meta_properties` alias so several of them can be AND-ed.
//! Range filters read `numeric_value`, which is NULL for values with no
//! quantity, so words never fall inside a range.

use corpora_domain::{MetaCondition, QueryFilter};
use rusqlite::ToSql;

/// A statement and its positional parameters
pub(crate) struct SentenceQuery {
    pub sql: String,
    pub params: Vec<Box<dyn ToSql>>,
}

impl SentenceQuery {
    pub fn param_refs(&self) -> Vec<&dyn ToSql> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

pub(crate) fn build(filter: &QueryFilter) -> SentenceQuery {
    let mut joins: Vec<String> = Vec::new();
    let mut conditions: Vec<String> = Vec::new();
    let mut params: Vec<Box<dyn ToSql>> = Vec::new();

    if !filter.subfolders.is_empty() {
        joins.push("JOIN subfolders sf ON sf.file_path = s.file_path".to_string());
        conditions.push(format!(
            "sf.subfolder_name IN ({})",
            placeholders(filter.subfolders.len())
        ));
        for name in &filter.subfolders {
            params.push(Box::new(name.clone()));
        }
    }

    if !filter.file_paths.is_empty() {
        conditions.push(format!(
            "s.file_path IN ({})",
            placeholders(filter.file_paths.len())
        ));
        for path in &filter.file_paths {
            params.push(Box::new(path.clone()));
        }
    }

    if !filter.text_categories.is_empty() {
        joins.push("JOIN text_categories tc ON tc.sentence_id = s.id".to_string());
        conditions.push(format!(
            "tc.name IN ({})",
            placeholders(filter.text_categories.len())
        ));
        for name in &filter.text_categories {
            params.push(Box::new(name.clone()));
        }
    }

    for (idx, meta) in filter.meta_filters.iter().enumerate() {
        let alias = format!("mp{}", idx);
        joins.push(format!(
            "JOIN meta_properties {alias} ON {alias}.file_path = s.file_path"
        ));
        conditions.push(format!(
            "{alias}.label_name = ? AND {alias}.property_name = ?"
        ));
        params.push(Box::new(meta.label_name.clone()));
        params.push(Box::new(meta.property_name.clone()));

        match &meta.condition {
            MetaCondition::Equals(value) => {
                conditions.push(format!("{alias}.value = ?"));
                params.push(Box::new(value.clone()));
            }
            MetaCondition::AnyOf(values) if values.is_empty() => {
                conditions.push("0 = 1".to_string());
            }
            MetaCondition::AnyOf(values) => {
                conditions.push(format!("{alias}.value IN ({})", placeholders(values.len())));
                for value in values {
                    params.push(Box::new(value.clone()));
                }
            }
            MetaCondition::Range { min, max } => {
                conditions.push(format!("{alias}.numeric_value BETWEEN ? AND ?"));
                params.push(Box::new(*min));
                params.push(Box::new(*max));
            }
        }
    }

    let mut sql = String::from(
        "SELECT DISTINCT s.id, s.text, s.file_path, s.embedding, s.group_id FROM sentences s",
    );
    for join in &joins {
        sql.push(' ');
        sql.push_str(join);
    }
    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }
    sql.push_str(" ORDER BY s.id");

    SentenceQuery { sql, params }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corpora_domain::MetaFilter;

    #[test]
    fn test_empty_filter_has_no_where_clause() {
        let q = build(&QueryFilter::all());
        assert!(!q.sql.contains("WHERE"));
        assert!(q.params.is_empty());
    }

    #[test]
    fn test_meta_filters_use_distinct_aliases() {
        let filter = QueryFilter::all()
            .with_meta(MetaFilter::equals("a", "a", "1"))
            .with_meta(MetaFilter::range("b", "b", 0.0, 2.0));
        let q = build(&filter);
        assert!(q.sql.contains("JOIN meta_properties mp0"));
        assert!(q.sql.contains("JOIN meta_properties mp1"));
        assert!(q.sql.contains("mp1.numeric_value BETWEEN ? AND ?"));
        assert_eq!(q.params.len(), 7);
    }

    #[test]
    fn test_empty_value_list_matches_nothing() {
        let filter = QueryFilter::all().with_meta(MetaFilter::any_of::<String>("a", "a", vec![]));
        let q = build(&filter);
        assert!(q.sql.contains("0 = 1"));
    }
}
