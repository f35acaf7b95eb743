//! Выбор строк текущей страницы

use contracts::shared::data_table::Row;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Непрозрачный ключ строки
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(String);

impl RowId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Способ получить [`RowId`] из строки
#[derive(Clone)]
pub enum RowIdentity {
    /// Значение указанного поля. Если поля нет, берётся сериализация всей строки.
    Field(String),
    Custom(Arc<dyn Fn(&Row) -> RowId + Send + Sync>),
}

impl Default for RowIdentity {
    fn default() -> Self {
        RowIdentity::Field("id".to_string())
    }
}

impl fmt::Debug for RowIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowIdentity::Field(name) => f.debug_tuple("Field").field(name).finish(),
            RowIdentity::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl RowIdentity {
    pub fn custom(f: impl Fn(&Row) -> RowId + Send + Sync + 'static) -> Self {
        RowIdentity::Custom(Arc::new(f))
    }

    pub fn id_of(&self, row: &Row) -> RowId {
        match self {
            RowIdentity::Field(name) => match row.get(name) {
                Some(Value::String(s)) => RowId::new(s.clone()),
                Some(Value::Null) | None => {
                    // serde_json::Map упорядочен по ключам, поэтому строка стабильна
                    RowId::new(Value::Object(row.clone()).to_string())
                }
                Some(other) => RowId::new(other.to_string()),
            },
            RowIdentity::Custom(f) => f(row),
        }
    }
}

/// Производное состояние выбора для отрисовки
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub selected: HashSet<RowId>,
    pub all_selected: bool,
    pub indeterminate: bool,
}

impl SelectionState {
    pub fn count(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}

/// Выбранные строки. Ключи с других страниц не хранятся.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionManager {
    page_ids: Vec<RowId>,
    selected: HashSet<RowId>,
}

impl SelectionManager {
    /// Новая отрисованная страница: ключи, которых на ней нет, отбрасываются.
    ///
    /// Возвращает `true`, если набор выбранных изменился.
    pub fn retain_page(&mut self, ids: Vec<RowId>) -> bool {
        let on_page: HashSet<&RowId> = ids.iter().collect();
        let before = self.selected.len();
        self.selected.retain(|id| on_page.contains(id));
        let changed = self.selected.len() != before;
        self.page_ids = ids;
        changed
    }

    pub fn page_ids(&self) -> &[RowId] {
        &self.page_ids
    }

    /// Переключает строку. Ключ не с текущей страницы игнорируется.
    pub fn toggle_row(&mut self, id: &RowId) -> bool {
        if !self.page_ids.contains(id) {
            return false;
        }
        if !self.selected.remove(id) {
            self.selected.insert(id.clone());
        }
        true
    }

    /// Полный или частичный выбор сбрасывается, иначе выбирается вся страница
    pub fn toggle_all(&mut self) -> bool {
        if self.selected.is_empty() {
            self.selected = self.page_ids.iter().cloned().collect();
        } else {
            self.selected.clear();
        }
        !self.page_ids.is_empty()
    }

    pub fn clear(&mut self) -> bool {
        let changed = !self.selected.is_empty();
        self.selected.clear();
        changed
    }

    pub fn is_selected(&self, id: &RowId) -> bool {
        self.selected.contains(id)
    }

    pub fn state(&self) -> SelectionState {
        let total = self.page_ids.len();
        let count = self.selected.len();
        SelectionState {
            selected: self.selected.clone(),
            all_selected: total > 0 && count == total,
            indeterminate: count > 0 && count < total,
        }
    }

    /// Выбранные строки в порядке страницы
    pub fn selected_rows(&self, rows: &[Row], identity: &RowIdentity) -> Vec<Row> {
        rows.iter()
            .filter(|row| self.selected.contains(&identity.id_of(row)))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids(n: usize) -> Vec<RowId> {
        (0..n).map(|i| RowId::new(i.to_string())).collect()
    }

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_aggregate_flags_for_all_counts() {
        for n in 0..6 {
            for s in 0..=n {
                let mut selection = SelectionManager::default();
                selection.retain_page(ids(n));
                for id in ids(n).iter().take(s) {
                    selection.toggle_row(id);
                }
                let state = selection.state();
                assert_eq!(state.count(), s);
                assert_eq!(state.all_selected, s == n && n > 0, "n={n} s={s}");
                assert_eq!(state.indeterminate, 0 < s && s < n, "n={n} s={s}");
            }
        }
    }

    #[test]
    fn test_toggle_all_selects_then_clears() {
        let mut selection = SelectionManager::default();
        selection.retain_page(ids(3));

        selection.toggle_all();
        assert!(selection.state().all_selected);

        selection.toggle_all();
        assert!(selection.state().is_empty());

        // частичный выбор тоже сбрасывается
        selection.toggle_row(&RowId::new("1"));
        selection.toggle_all();
        assert!(selection.state().is_empty());
    }

    #[test]
    fn test_new_page_drops_foreign_ids() {
        let mut selection = SelectionManager::default();
        selection.retain_page(ids(3));
        selection.toggle_row(&RowId::new("0"));
        selection.toggle_row(&RowId::new("2"));

        let changed = selection.retain_page(vec![RowId::new("2"), RowId::new("3")]);
        assert!(changed);
        assert!(selection.is_selected(&RowId::new("2")));
        assert!(!selection.is_selected(&RowId::new("0")));
        assert!(!selection.toggle_row(&RowId::new("0")));
    }

    #[test]
    fn test_identity_by_field_and_fallback() {
        let identity = RowIdentity::default();
        assert_eq!(identity.id_of(&row(json!({"id": 7, "name": "x"}))).as_str(), "7");
        assert_eq!(identity.id_of(&row(json!({"id": "a-1"}))).as_str(), "a-1");

        let a = identity.id_of(&row(json!({"name": "x", "code": 1})));
        let b = identity.id_of(&row(json!({"code": 1, "name": "x"})));
        assert_eq!(a, b);
    }

    #[test]
    fn test_selected_rows_keep_page_order() {
        let rows = vec![
            row(json!({"id": 1})),
            row(json!({"id": 2})),
            row(json!({"id": 3})),
        ];
        let identity = RowIdentity::default();
        let mut selection = SelectionManager::default();
        selection.retain_page(rows.iter().map(|r| identity.id_of(r)).collect());
        selection.toggle_row(&RowId::new("3"));
        selection.toggle_row(&RowId::new("1"));

        let picked = selection.selected_rows(&rows, &identity);
        assert_eq!(picked, vec![rows[0].clone(), rows[2].clone()]);
    }
}
