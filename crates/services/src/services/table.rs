//! Search, sort and pagination over a collection slice.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize, de::Deserializer};
use serde_json::Value;
use strum_macros::{Display, EnumString};
use ts_rs::TS;

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS, EnumString, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default)]
pub struct TableQuery {
    #[serde(deserialize_with = "empty_as_none")]
    pub search: Option<String>,
    #[serde(deserialize_with = "empty_as_none")]
    pub sort: Option<String>,
    pub direction: SortDirection,
    /// 0-based.
    pub page: usize,
    pub page_size: usize,
}

impl Default for TableQuery {
    fn default() -> Self {
        Self {
            search: None,
            sort: None,
            direction: SortDirection::Asc,
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct TableView<T> {
    pub rows: Vec<T>,
    /// Rows matching the search, across all pages.
    pub total: usize,
    pub page: usize,
    pub page_count: usize,
    pub page_size: usize,
}

impl TableQuery {
    /// Filter `records` on `search_field`, sort, then cut out the requested page.
    ///
    /// Columns are read from each record's serialized form. A page past the end
    /// yields no rows; `page_count` is at least 1.
    pub fn apply<T>(&self, records: &[T], search_field: &str) -> TableView<T>
    where
        T: Serialize + Clone,
    {
        let needle = self.search.as_deref().map(str::to_lowercase);
        let mut matched: Vec<(Value, &T)> = records
            .iter()
            .map(|record| (serde_json::to_value(record).unwrap_or(Value::Null), record))
            .filter(|(value, _)| match &needle {
                None => true,
                Some(needle) => cell_text(value.get(search_field))
                    .to_lowercase()
                    .contains(needle.as_str()),
            })
            .collect();

        if let Some(column) = &self.sort {
            matched.sort_by(|(a, _), (b, _)| {
                let ordering = compare_cells(a.get(column), b.get(column));
                match self.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
        }

        let page_size = self.page_size.max(1);
        let total = matched.len();
        let page_count = total.div_ceil(page_size).max(1);
        let rows = matched
            .into_iter()
            .skip(self.page.saturating_mul(page_size))
            .take(page_size)
            .map(|(_, record)| record.clone())
            .collect();

        TableView {
            rows,
            total,
            page: self.page,
            page_count,
            page_size,
        }
    }
}

fn cell_text(cell: Option<&Value>) -> String {
    match cell {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| cell_text(Some(item)))
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => other.to_string(),
    }
}

fn compare_cells(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or_default(), y.as_f64().unwrap_or_default());
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => cell_text(a).cmp(&cell_text(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Serialize, PartialEq)]
    struct Row {
        name: String,
        capacity: i32,
    }

    fn rows(n: usize) -> Vec<Row> {
        (0..n)
            .map(|i| Row {
                name: format!("Program {i:02}"),
                capacity: (n - i) as i32,
            })
            .collect()
    }

    #[test]
    fn search_is_case_insensitive_substring_on_one_column() {
        let records = vec![
            Row { name: "Infant Care".to_string(), capacity: 8 },
            Row { name: "Preschool".to_string(), capacity: 16 },
            Row { name: "School Age Program".to_string(), capacity: 20 },
        ];
        let query = TableQuery {
            search: Some("SCHOOL".to_string()),
            ..Default::default()
        };
        let view = query.apply(&records, "name");
        assert_eq!(view.total, 2);
        assert_eq!(view.rows[0].name, "Preschool");

        let by_capacity = TableQuery {
            search: Some("16".to_string()),
            ..Default::default()
        };
        assert_eq!(by_capacity.apply(&records, "name").total, 0);
    }

    #[test]
    fn pages_are_zero_based_with_ten_rows() {
        let records = rows(23);
        let view = TableQuery {
            page: 2,
            ..Default::default()
        }
        .apply(&records, "name");
        assert_eq!(view.page_count, 3);
        assert_eq!(view.rows.len(), 3);
        assert_eq!(view.rows[0].name, "Program 20");

        let past_end = TableQuery {
            page: 5,
            ..Default::default()
        }
        .apply(&records, "name");
        assert!(past_end.rows.is_empty());
        assert_eq!(past_end.total, 23);
    }

    #[test]
    fn numeric_columns_sort_numerically() {
        let records = vec![
            Row { name: "a".to_string(), capacity: 9 },
            Row { name: "b".to_string(), capacity: 10 },
            Row { name: "c".to_string(), capacity: 100 },
        ];
        let view = TableQuery {
            sort: Some("capacity".to_string()),
            direction: SortDirection::Desc,
            ..Default::default()
        }
        .apply(&records, "name");
        let names: Vec<_> = view.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["c", "b", "a"]);
    }

    #[test]
    fn empty_collection_still_has_one_page() {
        let view = TableQuery::default().apply::<Row>(&[], "name");
        assert_eq!(view.total, 0);
        assert_eq!(view.page_count, 1);
    }
}
