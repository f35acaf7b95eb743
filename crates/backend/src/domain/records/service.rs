use std::cmp::Ordering;
use std::collections::HashSet;

use contracts::records::record_id;
use contracts::shared::data_table::{decode_search_term, FetchParams, Meta, PageResult, Row};
use serde_json::Value;

use super::repository::RecordStore;

/// Совпадение без учёта регистра по строковым и числовым полям строки
fn matches_search(row: &Row, needle_lower: &str) -> bool {
    row.values().any(|value| match value {
        Value::String(s) => s.to_lowercase().contains(needle_lower),
        Value::Number(n) => n.to_string().contains(needle_lower),
        _ => false,
    })
}

/// Порядок типов: null < bool < число < строка < прочее
fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(_)) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::String(_)) => 3,
        Some(_) => 4,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => {
            x.to_lowercase().cmp(&y.to_lowercase())
        }
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// Одна страница с учётом поиска и сортировки.
///
/// Размер страницы ограничен `max_page_size` хранилища; страница за пределами
/// результата приводится к последней, и это отражается в `meta.current_page`.
pub fn query_page(store: &RecordStore, params: &FetchParams) -> PageResult {
    let params = params.clone().normalized(store.max_page_size());
    let needle = decode_search_term(&params.search_term).map(str::to_lowercase);

    let rows = store.read();
    let mut matched: Vec<&Row> = match &needle {
        Some(needle) => rows.iter().filter(|row| matches_search(row, needle)).collect(),
        None => rows.iter().collect(),
    };

    if let Some(field) = params.sort_field.as_deref() {
        // sort_by стабильна: равные значения сохраняют порядок хранилища
        matched.sort_by(|a, b| {
            let ordering = compare_values(a.get(field), b.get(field));
            if params.sort_direction.is_ascending() {
                ordering
            } else {
                ordering.reverse()
            }
        });
    }

    let meta = Meta::from_total(matched.len(), params.page, params.items_per_page);
    let offset = (meta.current_page - 1) * meta.items_per_page;
    let items = matched
        .into_iter()
        .skip(offset)
        .take(meta.items_per_page)
        .cloned()
        .collect();

    PageResult {
        items,
        meta: Some(meta),
    }
}

/// Удаляет записи по id, возвращает количество удалённых
pub fn delete_records(store: &RecordStore, ids: &[String]) -> usize {
    let ids: HashSet<&str> = ids.iter().map(String::as_str).collect();
    let mut rows = store.write();
    let before = rows.len();
    rows.retain(|row| {
        record_id(row)
            .map(|id| !ids.contains(id.as_str()))
            .unwrap_or(true)
    });
    before - rows.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::shared::data_table::{encode_search_term, SortDirection};
    use serde_json::json;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => panic!("test row must be an object"),
        }
    }

    fn store() -> RecordStore {
        RecordStore::new(
            vec![
                row(json!({"id": "1", "name": "Bravo", "amount": 30, "tag": null})),
                row(json!({"id": "2", "name": "alpha", "amount": 5.5, "tag": "x"})),
                row(json!({"id": "3", "name": "Charlie", "amount": 12, "tag": "y"})),
                row(json!({"id": 4, "name": "Alpine", "amount": 100})),
                row(json!({"id": "5", "name": "delta", "amount": 12})),
            ],
            3,
        )
    }

    fn ids(result: &PageResult) -> Vec<String> {
        result.items.iter().filter_map(record_id).collect()
    }

    fn params(page: usize, items_per_page: usize) -> FetchParams {
        FetchParams {
            page,
            items_per_page,
            ..FetchParams::default()
        }
    }

    #[test]
    fn test_first_page_and_meta() {
        let result = query_page(&store(), &params(1, 2));
        assert_eq!(ids(&result), vec!["1", "2"]);
        let meta = result.meta.unwrap();
        assert_eq!(meta.total_items, 5);
        assert_eq!(meta.total_pages, 3);
        assert!(meta.has_next);
        assert!(!meta.has_prev);
    }

    #[test]
    fn test_page_size_capped_by_store() {
        let result = query_page(&store(), &params(1, 1000));
        assert_eq!(result.items.len(), 3);
        assert_eq!(result.meta.unwrap().items_per_page, 3);
    }

    #[test]
    fn test_out_of_range_page_is_clamped() {
        let result = query_page(&store(), &params(9, 2));
        let meta = result.meta.unwrap();
        assert_eq!(meta.current_page, 3);
        assert_eq!(ids(&result), vec!["5"]);
    }

    #[test]
    fn test_search_is_case_insensitive_contains() {
        let query = FetchParams {
            search_term: encode_search_term("AL"),
            ..params(1, 3)
        };
        let result = query_page(&store(), &query);
        assert_eq!(ids(&result), vec!["2", "4"]);
        assert_eq!(result.meta.unwrap().total_items, 2);
    }

    #[test]
    fn test_search_matches_numbers() {
        let query = FetchParams {
            search_term: "contains:12".to_string(),
            ..params(1, 3)
        };
        assert_eq!(ids(&query_page(&store(), &query)), vec!["3", "5"]);
    }

    #[test]
    fn test_empty_search_result_is_single_page() {
        let query = FetchParams {
            search_term: encode_search_term("zzz"),
            ..params(4, 3)
        };
        let result = query_page(&store(), &query);
        assert!(result.items.is_empty());
        let meta = result.meta.unwrap();
        assert_eq!(meta.total_pages, 1);
        assert_eq!(meta.current_page, 1);
    }

    #[test]
    fn test_sort_numbers_descending() {
        let query = FetchParams {
            sort_field: Some("amount".to_string()),
            sort_direction: SortDirection::Desc,
            ..params(1, 3)
        };
        assert_eq!(ids(&query_page(&store(), &query)), vec!["4", "1", "3"]);
    }

    #[test]
    fn test_sort_strings_ignores_case() {
        let query = FetchParams {
            sort_field: Some("name".to_string()),
            ..params(1, 3)
        };
        assert_eq!(ids(&query_page(&store(), &query)), vec!["2", "4", "1"]);
    }

    #[test]
    fn test_sort_missing_values_first_when_ascending() {
        let query = FetchParams {
            sort_field: Some("tag".to_string()),
            ..params(1, 3)
        };
        // у "1" null, у "4" и "5" поля нет: порядок хранилища сохраняется
        assert_eq!(ids(&query_page(&store(), &query)), vec!["1", "4", "5"]);
    }

    #[test]
    fn test_delete_records_by_string_and_numeric_id() {
        let store = store();
        let deleted = delete_records(&store, &["2".to_string(), "4".to_string(), "404".to_string()]);
        assert_eq!(deleted, 2);
        assert_eq!(store.len(), 3);
        let result = query_page(&store, &params(1, 3));
        assert_eq!(ids(&result), vec!["1", "3", "5"]);
    }
}
