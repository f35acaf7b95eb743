use std::path::Path;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{Duration, NaiveDate};
use contracts::shared::data_table::Row;
use once_cell::sync::OnceCell;
use serde_json::{json, Value};

static STORE: OnceCell<RecordStore> = OnceCell::new();

/// Хранилище записей в памяти. Строки не типизированы: любой JSON-объект.
#[derive(Debug)]
pub struct RecordStore {
    rows: RwLock<Vec<Row>>,
    max_page_size: usize,
}

impl RecordStore {
    pub fn new(rows: Vec<Row>, max_page_size: usize) -> Self {
        Self {
            rows: RwLock::new(rows),
            max_page_size: max_page_size.max(1),
        }
    }

    pub fn max_page_size(&self) -> usize {
        self.max_page_size
    }

    // Паника в другом потоке не делает данные невалидными: строки заменяются целиком
    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Vec<Row>> {
        self.rows.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, Vec<Row>> {
        self.rows.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn initialize_store(store: RecordStore) -> anyhow::Result<()> {
    STORE
        .set(store)
        .map_err(|_| anyhow::anyhow!("Record store is already initialized"))
}

pub fn get_store() -> Option<&'static RecordStore> {
    STORE.get()
}

/// Загружает строки из JSON-файла с массивом объектов. Не-объекты пропускаются.
pub fn load_seed(path: &Path) -> anyhow::Result<Vec<Row>> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Cannot read seed file {}: {}", path.display(), e))?;
    parse_seed(&contents)
}

fn parse_seed(contents: &str) -> anyhow::Result<Vec<Row>> {
    let items: Vec<Value> = serde_json::from_str(contents)?;
    let total = items.len();
    let rows: Vec<Row> = items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(row) => Some(row),
            _ => None,
        })
        .collect();
    if rows.len() < total {
        tracing::warn!("Skipped {} seed items that are not JSON objects", total - rows.len());
    }
    Ok(rows)
}

const NAMES: [&str; 8] = [
    "Альфа", "Бета", "Гамма", "Дельта", "Эпсилон", "Дзета", "Эта", "Тета",
];
const CATEGORIES: [&str; 4] = ["Склад", "Продажи", "Закупки", "Логистика"];
const STATUSES: [&str; 3] = ["active", "pending", "archived"];

/// Детерминированный демонстрационный набор
pub fn demo_rows(count: usize) -> Vec<Row> {
    let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or(NaiveDate::MIN);
    (0..count)
        .map(|i| {
            let created = base + Duration::days(i as i64 % 365);
            let comment = if i % 5 == 0 {
                Value::Null
            } else {
                Value::String(format!("Запись №{}", i + 1))
            };
            let value = json!({
                "id": format!("rec-{:04}", i + 1),
                "name": format!("{} {}", NAMES[i % NAMES.len()], i / NAMES.len() + 1),
                "category": CATEGORIES[i % CATEGORIES.len()],
                "status": STATUSES[i % STATUSES.len()],
                "amount": ((i * 7919) % 100_000) as f64 / 100.0,
                "createdAt": created.format("%Y-%m-%d").to_string(),
                "comment": comment,
            });
            match value {
                Value::Object(row) => row,
                _ => Row::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::records::record_id;

    #[test]
    fn test_demo_rows_are_unique_and_stable() {
        let rows = demo_rows(20);
        assert_eq!(rows.len(), 20);
        assert_eq!(record_id(&rows[0]).as_deref(), Some("rec-0001"));
        assert_eq!(rows[0]["name"], "Альфа 1");
        assert_eq!(rows[8]["name"], "Альфа 2");
        assert!(rows[0]["comment"].is_null());

        let mut ids: Vec<String> = rows.iter().filter_map(record_id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 20);
        assert_eq!(demo_rows(20), rows);
    }

    #[test]
    fn test_parse_seed_skips_non_objects() {
        let rows = parse_seed(r#"[{"id": 1, "name": "a"}, 5, "x", {"id": 2}]"#).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(record_id(&rows[0]).as_deref(), Some("1"));
    }

    #[test]
    fn test_parse_seed_rejects_non_array() {
        assert!(parse_seed(r#"{"id": 1}"#).is_err());
    }

    #[test]
    fn test_store_clamps_page_size_limit() {
        let store = RecordStore::new(Vec::new(), 0);
        assert_eq!(store.max_page_size(), 1);
        assert!(store.is_empty());
    }
}
