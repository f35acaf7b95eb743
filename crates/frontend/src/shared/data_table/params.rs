use contracts::shared::data_table::{encode_search_term, FetchParams};

use super::sort::SortState;

/// Собирает параметры запроса из четырёх срезов состояния
pub fn build_params(
    page: usize,
    items_per_page: usize,
    sort: &SortState,
    search_term: &str,
) -> FetchParams {
    FetchParams {
        page: page.max(1),
        items_per_page: items_per_page.max(1),
        sort_field: sort.key.clone(),
        sort_direction: sort.direction,
        search_term: encode_search_term(search_term),
    }
}
