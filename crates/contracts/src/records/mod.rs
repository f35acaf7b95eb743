use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::shared::data_table::Row;

/// Идентификатор записи, который уходит в `DeleteRecordsRequest::ids`.
/// Строка берётся как есть, число переводится в строку.
pub fn record_id(row: &Row) -> Option<String> {
    match row.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Тело `POST /api/records/delete`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteRecordsRequest {
    pub ids: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteRecordsResponse {
    pub deleted: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_record_id_accepts_strings_and_numbers() {
        assert_eq!(record_id(&row(json!({"id": "rec-1"}))).as_deref(), Some("rec-1"));
        assert_eq!(record_id(&row(json!({"id": 42}))).as_deref(), Some("42"));
        assert_eq!(record_id(&row(json!({"id": null}))), None);
        assert_eq!(record_id(&row(json!({"name": "a"}))), None);
    }
}
