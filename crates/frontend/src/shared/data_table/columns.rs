//! Реестр колонок таблицы и их видимость

use std::collections::HashSet;
use thiserror::Error;

/// Описание колонки. Колонка идентифицируется по `accessor`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDefinition {
    pub header: String,
    pub accessor: String,
    pub sortable: bool,
    pub searchable: bool,
    pub visible: bool,
}

impl ColumnDefinition {
    pub fn new(header: impl Into<String>, accessor: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            accessor: accessor.into(),
            sortable: false,
            searchable: false,
            visible: true,
        }
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn searchable(mut self) -> Self {
        self.searchable = true;
        self
    }

    /// Колонка скрыта по умолчанию
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColumnConfigError {
    #[error("колонка \"{header}\" без accessor")]
    MissingAccessor { header: String },
    #[error("accessor \"{0}\" задан у нескольких колонок")]
    DuplicateAccessor(String),
}

/// Колонки таблицы с текущей видимостью.
///
/// Хранит неизменяемую копию исходной конфигурации для [`ColumnRegistry::restore_defaults`].
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRegistry {
    defaults: Vec<ColumnDefinition>,
    columns: Vec<ColumnDefinition>,
}

impl ColumnRegistry {
    pub fn new(definitions: Vec<ColumnDefinition>) -> Result<Self, ColumnConfigError> {
        let mut seen = HashSet::new();
        for def in &definitions {
            if def.accessor.trim().is_empty() {
                return Err(ColumnConfigError::MissingAccessor {
                    header: def.header.clone(),
                });
            }
            if !seen.insert(def.accessor.as_str()) {
                return Err(ColumnConfigError::DuplicateAccessor(def.accessor.clone()));
            }
        }
        Ok(Self {
            columns: definitions.clone(),
            defaults: definitions,
        })
    }

    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    pub fn get(&self, accessor: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.accessor == accessor)
    }

    pub fn is_visible(&self, accessor: &str) -> bool {
        self.get(accessor).map(|c| c.visible).unwrap_or(false)
    }

    /// Переключает видимость. Возвращает `false` для неизвестного accessor.
    pub fn toggle_visible(&mut self, accessor: &str) -> bool {
        match self.columns.iter_mut().find(|c| c.accessor == accessor) {
            Some(column) => {
                column.visible = !column.visible;
                true
            }
            None => false,
        }
    }

    pub fn select_all(&mut self) {
        self.columns.iter_mut().for_each(|c| c.visible = true);
    }

    pub fn select_none(&mut self) {
        self.columns.iter_mut().for_each(|c| c.visible = false);
    }

    pub fn restore_defaults(&mut self) {
        self.columns = self.defaults.clone();
    }

    pub fn visible_columns(&self) -> Vec<ColumnDefinition> {
        self.columns.iter().filter(|c| c.visible).cloned().collect()
    }

    pub fn visible_accessors(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.visible)
            .map(|c| c.accessor.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("Название", "name").sortable().searchable(),
            ColumnDefinition::new("Код", "code").sortable(),
            ColumnDefinition::new("Комментарий", "comment").hidden(),
        ]
    }

    fn visible(registry: &ColumnRegistry) -> Vec<String> {
        registry.visible_accessors()
    }

    #[test]
    fn test_initial_visibility_comes_from_definitions() {
        let registry = ColumnRegistry::new(sample()).unwrap();
        assert_eq!(visible(&registry), vec!["name", "code"]);
        assert!(!registry.is_visible("comment"));
        assert!(!registry.is_visible("unknown"));
    }

    #[test]
    fn test_rejects_duplicate_accessor() {
        let mut defs = sample();
        defs.push(ColumnDefinition::new("Ещё код", "code"));
        assert_eq!(
            ColumnRegistry::new(defs),
            Err(ColumnConfigError::DuplicateAccessor("code".to_string()))
        );
    }

    #[test]
    fn test_rejects_missing_accessor() {
        let defs = vec![ColumnDefinition::new("Пусто", "  ")];
        assert!(matches!(
            ColumnRegistry::new(defs),
            Err(ColumnConfigError::MissingAccessor { .. })
        ));
    }

    #[test]
    fn test_restore_defaults_ignores_intermediate_state() {
        let mut registry = ColumnRegistry::new(sample()).unwrap();
        let expected = visible(&registry);

        registry.toggle_visible("name");
        registry.toggle_visible("comment");
        registry.select_all();
        registry.toggle_visible("code");
        registry.select_none();
        registry.toggle_visible("comment");
        assert_eq!(visible(&registry), vec!["comment"]);

        registry.restore_defaults();
        assert_eq!(visible(&registry), expected);
    }

    #[test]
    fn test_toggle_unknown_column() {
        let mut registry = ColumnRegistry::new(sample()).unwrap();
        assert!(!registry.toggle_visible("missing"));
        assert!(registry.toggle_visible("comment"));
        assert!(registry.is_visible("comment"));
    }
}
