use serde::{Deserialize, Serialize};

/// Префикс оператора "содержит" для поискового запроса
pub const CONTAINS_MARKER: &str = "contains:";

/// Минимальная длина поискового запроса, с которой фильтр уходит на сервер
pub const MIN_SEARCH_LEN: usize = 2;

/// Направление сортировки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn is_ascending(self) -> bool {
        matches!(self, SortDirection::Asc)
    }

    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Параметры запроса одной страницы данных.
///
/// `page` считается с 1. `search_term` уже закодирован через [`encode_search_term`]:
/// пустая строка означает отсутствие фильтра.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FetchParams {
    pub page: usize,
    pub items_per_page: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_field: Option<String>,
    #[serde(default)]
    pub sort_direction: SortDirection,
    #[serde(default)]
    pub search_term: String,
}

impl Default for FetchParams {
    fn default() -> Self {
        Self {
            page: 1,
            items_per_page: 10,
            sort_field: None,
            sort_direction: SortDirection::Asc,
            search_term: String::new(),
        }
    }
}

impl FetchParams {
    /// Приводит страницу к `>= 1`, а размер страницы к `1..=max_items_per_page`
    pub fn normalized(mut self, max_items_per_page: usize) -> Self {
        self.page = self.page.max(1);
        self.items_per_page = self.items_per_page.clamp(1, max_items_per_page.max(1));
        self
    }

    /// Смещение первой строки страницы
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1) * self.items_per_page
    }
}

/// Кодирует введённый пользователем текст для передачи источнику.
///
/// Короче [`MIN_SEARCH_LEN`] символов (после trim) даёт пустую строку, иначе `contains:<term>`.
pub fn encode_search_term(raw: &str) -> String {
    let term = raw.trim();
    if term.chars().count() < MIN_SEARCH_LEN {
        String::new()
    } else {
        format!("{CONTAINS_MARKER}{term}")
    }
}

/// Извлекает искомую подстроку. Строка без маркера трактуется как "содержит".
pub fn decode_search_term(encoded: &str) -> Option<&str> {
    let term = encoded.strip_prefix(CONTAINS_MARKER).unwrap_or(encoded).trim();
    if term.is_empty() {
        None
    } else {
        Some(term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_search_is_dropped() {
        assert_eq!(encode_search_term(""), "");
        assert_eq!(encode_search_term("a"), "");
        assert_eq!(encode_search_term("  a  "), "");
        assert_eq!(encode_search_term("ab"), "contains:ab");
        // длина в символах, а не в байтах
        assert_eq!(encode_search_term("ж"), "");
        assert_eq!(encode_search_term("жу"), "contains:жу");
    }

    #[test]
    fn test_decode_search_term() {
        assert_eq!(decode_search_term("contains:abc"), Some("abc"));
        assert_eq!(decode_search_term("abc"), Some("abc"));
        assert_eq!(decode_search_term("contains:"), None);
        assert_eq!(decode_search_term(""), None);
    }

    #[test]
    fn test_params_wire_format() {
        let params = FetchParams {
            page: 2,
            items_per_page: 20,
            sort_field: Some("name".to_string()),
            sort_direction: SortDirection::Desc,
            search_term: "contains:ab".to_string(),
        };
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["itemsPerPage"], 20);
        assert_eq!(json["sortField"], "name");
        assert_eq!(json["sortDirection"], "desc");
        assert_eq!(json["searchTerm"], "contains:ab");

        let unsorted = serde_json::to_value(FetchParams::default()).unwrap();
        assert!(unsorted.get("sortField").is_none());
    }

    #[test]
    fn test_normalized() {
        let params = FetchParams {
            page: 0,
            items_per_page: 5000,
            ..FetchParams::default()
        }
        .normalized(500);
        assert_eq!(params.page, 1);
        assert_eq!(params.items_per_page, 500);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let params: FetchParams = serde_json::from_str(r#"{"page":3}"#).unwrap();
        assert_eq!(params.page, 3);
        assert_eq!(params.items_per_page, 10);
        assert_eq!(params.sort_field, None);
        assert_eq!(params.search_term, "");
    }
}
