//! Единая функция переходов табличного контроллера.
//!
//! Все срезы состояния (сортировка, поиск, страница, выбор, колонки) меняются
//! только через [`TableState::dispatch`] и [`TableState::receive`], поэтому
//! правила вида "смена сортировки сбрасывает страницу" живут в одном месте.

use contracts::shared::data_table::{encode_search_term, FetchParams, Meta, PageResult, Row};

use super::columns::{ColumnConfigError, ColumnDefinition, ColumnRegistry};
use super::config::DataTableConfig;
use super::params::build_params;
use super::selection::{RowId, RowIdentity, SelectionManager, SelectionState};
use super::sort::{SortController, SortState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableAction {
    /// Первая загрузка после монтирования
    Load,
    Sort(String),
    Search(String),
    GoToPage(usize),
    SetPageSize(usize),
    ToggleRow(RowId),
    ToggleAllRows,
    ClearSelection,
    ToggleColumn(String),
    ShowAllColumns,
    HideAllColumns,
    RestoreColumns,
    Refresh,
    Retry,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Idle,
    Loading,
    Failed { page: usize, message: String },
}

/// Запрос, который нужно отправить источнику данных
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub seq: u64,
    pub params: FetchParams,
}

/// Побочные эффекты перехода
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transition {
    pub fetch: Option<FetchRequest>,
    pub selection_changed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveOutcome {
    Applied { selection_changed: bool },
    /// Ответ на устаревший запрос, отброшен
    Stale,
    Failed,
}

#[derive(Debug, Clone)]
pub struct TableState {
    columns: ColumnRegistry,
    sort: SortController,
    selection: SelectionManager,
    identity: RowIdentity,
    search_input: String,
    page: usize,
    items_per_page: usize,
    rows: Vec<Row>,
    meta: Meta,
    status: LoadStatus,
    last_params: Option<FetchParams>,
    in_flight: Option<FetchRequest>,
    next_seq: u64,
}

impl TableState {
    pub fn new(
        columns: Vec<ColumnDefinition>,
        config: &DataTableConfig,
    ) -> Result<Self, ColumnConfigError> {
        let items_per_page = config.default_page_size.max(1);
        Ok(Self {
            columns: ColumnRegistry::new(columns)?,
            sort: SortController::default(),
            selection: SelectionManager::default(),
            identity: RowIdentity::default(),
            search_input: String::new(),
            page: 1,
            items_per_page,
            rows: Vec::new(),
            meta: Meta::from_total(0, 1, items_per_page),
            status: LoadStatus::Idle,
            last_params: None,
            in_flight: None,
            next_seq: 0,
        })
    }

    pub fn with_identity(mut self, identity: RowIdentity) -> Self {
        self.identity = identity;
        self
    }

    pub fn with_sort(mut self, sort: SortState) -> Self {
        self.sort = SortController::new(sort);
        self
    }

    pub fn dispatch(&mut self, action: TableAction) -> Transition {
        match action {
            TableAction::Load | TableAction::Refresh => self.request_fetch(true),
            TableAction::Retry => match self.status {
                LoadStatus::Failed { page, .. } => {
                    self.page = page;
                    self.request_fetch(true)
                }
                _ => Transition::default(),
            },
            TableAction::Sort(key) => {
                let sortable = self.columns.get(&key).map(|c| c.sortable).unwrap_or(false);
                if !sortable {
                    return Transition::default();
                }
                self.sort.toggle(&key);
                self.page = 1;
                self.request_fetch(false)
            }
            TableAction::Search(raw) => {
                let changed = encode_search_term(&raw) != encode_search_term(&self.search_input);
                self.search_input = raw;
                if !changed {
                    return Transition::default();
                }
                self.page = 1;
                self.request_fetch(false)
            }
            TableAction::GoToPage(page) => {
                self.page = page.clamp(1, self.meta.total_pages.max(1));
                self.request_fetch(false)
            }
            TableAction::SetPageSize(size) => {
                self.items_per_page = size.max(1);
                self.page = 1;
                self.request_fetch(false)
            }
            TableAction::ToggleRow(id) => Transition {
                fetch: None,
                selection_changed: self.selection.toggle_row(&id),
            },
            TableAction::ToggleAllRows => Transition {
                fetch: None,
                selection_changed: self.selection.toggle_all(),
            },
            TableAction::ClearSelection => Transition {
                fetch: None,
                selection_changed: self.selection.clear(),
            },
            TableAction::ToggleColumn(accessor) => {
                self.columns.toggle_visible(&accessor);
                Transition::default()
            }
            TableAction::ShowAllColumns => {
                self.columns.select_all();
                Transition::default()
            }
            TableAction::HideAllColumns => {
                self.columns.select_none();
                Transition::default()
            }
            TableAction::RestoreColumns => {
                self.columns.restore_defaults();
                Transition::default()
            }
        }
    }

    /// Применяет ответ источника. Принимается только ответ на последний запрос.
    pub fn receive(&mut self, seq: u64, result: Result<PageResult, String>) -> ReceiveOutcome {
        let request = match self.in_flight.take() {
            Some(request) if request.seq == seq => request,
            other => {
                self.in_flight = other;
                return ReceiveOutcome::Stale;
            }
        };

        match result {
            Err(message) => {
                // на экране остаётся прежняя страница, повтор берёт номер из статуса
                self.page = self.meta.current_page.max(1);
                self.last_params = None;
                self.status = LoadStatus::Failed {
                    page: request.params.page,
                    message,
                };
                ReceiveOutcome::Failed
            }
            Ok(result) => {
                let meta = result.meta_or_derived(&request.params);
                // источник мог ограничить номер страницы
                self.page = meta.current_page.max(1);
                if let Some(params) = self.last_params.as_mut() {
                    params.page = self.page;
                }
                self.meta = meta;
                self.rows = result.items;
                let ids = self.rows.iter().map(|row| self.identity.id_of(row)).collect();
                let selection_changed = self.selection.retain_page(ids);
                self.status = LoadStatus::Idle;
                ReceiveOutcome::Applied { selection_changed }
            }
        }
    }

    /// Размонтирование: ответы на уже отправленные запросы будут отброшены
    pub fn cancel_pending(&mut self) {
        self.in_flight = None;
        if self.status == LoadStatus::Loading {
            self.status = LoadStatus::Idle;
        }
    }

    fn request_fetch(&mut self, force: bool) -> Transition {
        let params = self.current_params();
        if !force && self.last_params.as_ref() == Some(&params) {
            return Transition::default();
        }
        self.next_seq += 1;
        let request = FetchRequest {
            seq: self.next_seq,
            params: params.clone(),
        };
        self.last_params = Some(params);
        self.in_flight = Some(request.clone());
        self.status = LoadStatus::Loading;
        Transition {
            fetch: Some(request),
            selection_changed: false,
        }
    }

    pub fn current_params(&self) -> FetchParams {
        build_params(
            self.page,
            self.items_per_page,
            self.sort.current(),
            &self.search_input,
        )
    }

    pub fn columns(&self) -> &ColumnRegistry {
        &self.columns
    }

    pub fn sort(&self) -> &SortState {
        self.sort.current()
    }

    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn items_per_page(&self) -> usize {
        self.items_per_page
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == LoadStatus::Loading
    }

    pub fn identity(&self) -> &RowIdentity {
        &self.identity
    }

    pub fn row_id(&self, row: &Row) -> RowId {
        self.identity.id_of(row)
    }

    pub fn selection(&self) -> SelectionState {
        self.selection.state()
    }

    pub fn is_selected(&self, id: &RowId) -> bool {
        self.selection.is_selected(id)
    }

    pub fn selected_rows(&self) -> Vec<Row> {
        self.selection.selected_rows(&self.rows, &self.identity)
    }
}
