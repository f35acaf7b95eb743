use contracts::shared::data_table::SortDirection;

/// Текущая сортировка. При `key == None` действует порядок источника.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortState {
    pub key: Option<String>,
    pub direction: SortDirection,
}

impl SortState {
    pub fn is_sorted_by(&self, key: &str) -> bool {
        self.key.as_deref() == Some(key)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortController {
    state: SortState,
}

impl SortController {
    pub fn new(initial: SortState) -> Self {
        Self { state: initial }
    }

    /// Повторный клик по колонке с сортировкой по возрастанию меняет её на убывание, иначе сортировка по возрастанию
    pub fn toggle(&mut self, key: &str) {
        let direction = if self.state.is_sorted_by(key) && self.state.direction.is_ascending() {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        self.state = SortState {
            key: Some(key.to_string()),
            direction,
        };
    }

    pub fn current(&self) -> &SortState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_column_flips_direction() {
        let mut sort = SortController::default();
        sort.toggle("name");
        assert_eq!(sort.current().direction, SortDirection::Asc);
        sort.toggle("name");
        assert_eq!(sort.current().direction, SortDirection::Desc);
        sort.toggle("name");
        assert_eq!(sort.current().direction, SortDirection::Asc);
    }

    #[test]
    fn test_other_column_resets_to_ascending() {
        let mut sort = SortController::default();
        sort.toggle("name");
        sort.toggle("name");
        sort.toggle("code");
        assert_eq!(
            sort.current(),
            &SortState {
                key: Some("code".to_string()),
                direction: SortDirection::Asc,
            }
        );
    }
}
