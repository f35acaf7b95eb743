//! Контракты табличного контроллера: параметры запроса страницы и ответ источника данных.
//!
//! Общие для frontend (формирует запрос) и backend (исполняет его).

pub mod page;
pub mod params;

pub use page::{Meta, PageResult, Row};
pub use params::{
    decode_search_term, encode_search_term, FetchParams, SortDirection, CONTAINS_MARKER,
    MIN_SEARCH_LEN,
};
