use super::menu::MenuMetrics;

/// Настройки табличного контроллера
#[derive(Debug, Clone, PartialEq)]
pub struct DataTableConfig {
    pub page_size_options: Vec<usize>,
    pub default_page_size: usize,
    /// Задержка перед отправкой поискового запроса, мс
    pub search_debounce_ms: u32,
    /// Размер страницы при выгрузке всего набора
    pub export_batch_size: usize,
    /// Максимум строк при выгрузке всего набора
    pub export_row_limit: usize,
    pub menu: MenuMetrics,
}

impl Default for DataTableConfig {
    fn default() -> Self {
        Self {
            page_size_options: vec![10, 20, 50, 100],
            default_page_size: 10,
            search_debounce_ms: 300,
            export_batch_size: 500,
            export_row_limit: 10_000,
            menu: MenuMetrics::default(),
        }
    }
}
