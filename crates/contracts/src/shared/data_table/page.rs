use serde::{Deserialize, Serialize};

use super::params::FetchParams;

/// Строка данных: произвольный набор полей
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Метаданные пагинации по всему результату запроса
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub total_items: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_prev: bool,
    pub current_page: usize,
    pub items_per_page: usize,
}

impl Default for Meta {
    fn default() -> Self {
        Self::from_total(0, 1, 10)
    }
}

impl Meta {
    /// Метаданные при известном общем количестве строк.
    ///
    /// Пустой результат считается одной страницей; `current_page` приводится к `1..=total_pages`.
    pub fn from_total(total_items: usize, page: usize, items_per_page: usize) -> Self {
        let items_per_page = items_per_page.max(1);
        let total_pages = if total_items == 0 {
            1
        } else {
            (total_items + items_per_page - 1) / items_per_page
        };
        let current_page = page.clamp(1, total_pages);
        Self {
            total_items,
            total_pages,
            has_next: current_page < total_pages,
            has_prev: current_page > 1,
            current_page,
            items_per_page,
        }
    }

    /// Локальная оценка, когда источник не прислал метаданные.
    ///
    /// Неполная страница считается последней. Для полной страницы общее
    /// количество лишь нижняя граница, и предполагается наличие следующей.
    pub fn derive(page: usize, items_per_page: usize, rows_on_page: usize) -> Self {
        let page = page.max(1);
        let items_per_page = items_per_page.max(1);
        let before = (page - 1) * items_per_page;
        if rows_on_page < items_per_page {
            Self {
                total_items: before + rows_on_page,
                total_pages: page,
                has_next: false,
                has_prev: page > 1,
                current_page: page,
                items_per_page,
            }
        } else {
            Self {
                total_items: before + rows_on_page,
                total_pages: page + 1,
                has_next: true,
                has_prev: page > 1,
                current_page: page,
                items_per_page,
            }
        }
    }
}

/// Ответ источника данных на [`FetchParams`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    pub items: Vec<Row>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl PageResult {
    /// Метаданные из ответа, либо вычисленные по запросу
    pub fn meta_or_derived(&self, params: &FetchParams) -> Meta {
        self.meta.unwrap_or_else(|| {
            Meta::derive(params.page, params.items_per_page, self.items.len())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_total() {
        let meta = Meta::from_total(25, 1, 10);
        assert_eq!(meta.total_pages, 3);
        assert!(meta.has_next);
        assert!(!meta.has_prev);

        let clamped = Meta::from_total(25, 4, 10);
        assert_eq!(clamped.current_page, 3);
        assert!(!clamped.has_next);
        assert!(clamped.has_prev);

        let empty = Meta::from_total(0, 3, 10);
        assert_eq!(empty.total_pages, 1);
        assert_eq!(empty.current_page, 1);
    }

    #[test]
    fn test_derive_without_source_meta() {
        let partial = Meta::derive(3, 10, 4);
        assert_eq!(partial.total_items, 24);
        assert_eq!(partial.total_pages, 3);
        assert!(!partial.has_next);

        let full = Meta::derive(1, 10, 10);
        assert_eq!(full.total_pages, 2);
        assert!(full.has_next);
    }

    #[test]
    fn test_page_result_without_meta_field() {
        let result: PageResult = serde_json::from_str(r#"{"items":[{"id":1}]}"#).unwrap();
        assert!(result.meta.is_none());
        let meta = result.meta_or_derived(&FetchParams::default());
        assert_eq!(meta.total_items, 1);
        assert_eq!(meta.total_pages, 1);
    }
}
