//! Таблица с серверной пагинацией, сортировкой, поиском, выбором строк и экспортом.
//!
//! Данные запрашиваются через [`DataFetcher`]; вся логика переходов живёт в
//! [`TableState`], компонент только отправляет действия и запускает загрузки.
//!
//! # Пример
//!
//! ```ignore
//! <DataTable
//!     title="Записи"
//!     columns=vec![
//!         ColumnDefinition::new("Название", "name").sortable().searchable().into(),
//!         ColumnDefinition::new("Статус", "status").into(),
//!     ]
//!     fetch_data=DataFetcher::new(api::fetch_records)
//!     on_delete_selected=Callback::new(move |rows| delete(rows))
//! />
//! ```

mod bulk_actions;
mod column_menu;
mod export_dialog;
mod row_actions;

pub use row_actions::RowAction;

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;

use contracts::shared::data_table::{FetchParams, PageResult, Row};
use leptos::prelude::*;
use leptos::task::spawn_local;
use thaw::*;
use uuid::Uuid;
use wasm_bindgen::JsCast;

use crate::shared::components::pagination_controls::PaginationControls;
use crate::shared::components::table::{
    SortableHeaderCell, TableCellCheckbox, TableHeaderCheckbox,
};
use crate::shared::data_table::export::cell_text;
use crate::shared::data_table::menu::{self, MenuPlacement};
use crate::shared::data_table::{
    ColumnDefinition, DataTableConfig, ExportRequest, FetchRequest, LoadStatus, MenuMetrics,
    ReceiveOutcome, Rect, RowId, RowIdentity, TableAction, TableState, Viewport,
};
use crate::shared::icons::icon;
use crate::shared::list_utils::SearchInput;
use bulk_actions::BulkActions;
use column_menu::ColumnMenu;
use export_dialog::ExportDialog;
use row_actions::RowActionMenu;

pub type FetchFuture = Pin<Box<dyn Future<Output = Result<PageResult, String>>>>;

/// Источник данных таблицы: по параметрам возвращает страницу
#[derive(Clone)]
pub struct DataFetcher(Rc<dyn Fn(FetchParams) -> FetchFuture>);

impl DataFetcher {
    pub fn new<F, Fut>(fetch: F) -> Self
    where
        F: Fn(FetchParams) -> Fut + 'static,
        Fut: Future<Output = Result<PageResult, String>> + 'static,
    {
        Self(Rc::new(move |params| Box::pin(fetch(params))))
    }

    pub fn fetch(&self, params: FetchParams) -> FetchFuture {
        (self.0)(params)
    }
}

pub type CellRenderer = Arc<dyn Fn(&Row) -> AnyView + Send + Sync>;

/// Колонка таблицы: описание плюс необязательный рендер ячейки
#[derive(Clone)]
pub struct TableColumn {
    pub definition: ColumnDefinition,
    pub render: Option<CellRenderer>,
}

impl TableColumn {
    pub fn render(mut self, render: impl Fn(&Row) -> AnyView + Send + Sync + 'static) -> Self {
        self.render = Some(Arc::new(render));
        self
    }
}

impl From<ColumnDefinition> for TableColumn {
    fn from(definition: ColumnDefinition) -> Self {
        Self {
            definition,
            render: None,
        }
    }
}

/// Позиция выпадающего меню под кнопкой, по которой кликнули
pub(crate) fn anchor_placement(
    ev: &leptos::ev::MouseEvent,
    item_count: usize,
    metrics: &MenuMetrics,
) -> Option<MenuPlacement> {
    let trigger = ev.current_target()?.dyn_into::<web_sys::Element>().ok()?;
    let rect = trigger.get_bounding_client_rect();
    let window = web_sys::window()?;
    let viewport = Viewport {
        width: window.inner_width().ok()?.as_f64()?,
        height: window.inner_height().ok()?.as_f64()?,
    };
    let trigger = Rect {
        top: rect.top(),
        left: rect.left(),
        bottom: rect.bottom(),
        right: rect.right(),
    };
    Some(menu::position(&trigger, item_count, &viewport, metrics))
}

#[component]
pub fn DataTable(
    /// Заголовок: используется в печатной форме и как имя файла по умолчанию
    #[prop(into)]
    title: String,
    columns: Vec<TableColumn>,
    fetch_data: DataFetcher,
    #[prop(optional)]
    row_identity: Option<RowIdentity>,
    #[prop(optional)]
    config: Option<DataTableConfig>,
    #[prop(optional)]
    row_actions: Vec<RowAction>,
    #[prop(optional)]
    on_selection_change: Option<Callback<Vec<Row>>>,
    /// Вызывается после подтверждения; сама таблица ничего не удаляет
    #[prop(optional)]
    on_delete_selected: Option<Callback<Vec<Row>>>,
    /// Если задан, экспорт целиком отдаётся вызывающему коду
    #[prop(optional)]
    on_export_data: Option<Callback<ExportRequest>>,
    /// Каждое изменение значения перезагружает текущую страницу
    #[prop(optional, into)]
    refresh: Option<Signal<u32>>,
) -> impl IntoView {
    let config = config.unwrap_or_default();
    let definitions = columns.iter().map(|c| c.definition.clone()).collect();
    let initial = match TableState::new(definitions, &config) {
        Ok(state) => state.with_identity(row_identity.unwrap_or_default()),
        Err(e) => {
            log::error!("DataTable '{}': неверная конфигурация колонок: {}", title, e);
            return view! {
                <div class="alert alert--error" role="alert">
                    {format!("Ошибка конфигурации таблицы: {}", e)}
                </div>
            }
            .into_any();
        }
    };

    let renderers: HashMap<String, CellRenderer> = columns
        .into_iter()
        .filter_map(|c| c.render.map(|render| (c.definition.accessor, render)))
        .collect();
    let renderers = StoredValue::new(renderers);
    let has_actions = !row_actions.is_empty();
    let row_actions = StoredValue::new(row_actions);
    let table_id = format!("dt-{}", Uuid::new_v4().simple());
    let menu_prefix = StoredValue::new(table_id.clone());
    let title = StoredValue::new(title);
    let menu_metrics = config.menu;

    let state = RwSignal::new(initial);
    let fetcher = StoredValue::new_local(fetch_data);
    let export_open = RwSignal::new(false);

    let notify_selection = move || {
        if let Some(callback) = on_selection_change {
            callback.run(state.with_untracked(|s| s.selected_rows()));
        }
    };

    let run_fetch = move |request: FetchRequest| {
        log::debug!("Загрузка #{}: {:?}", request.seq, request.params);
        let future = fetcher.with_value(|f| f.fetch(request.params.clone()));
        spawn_local(async move {
            let result = future.await;
            let error = result.as_ref().err().cloned();
            // таблица могла быть размонтирована, пока шёл запрос
            let Some(outcome) = state.try_update(|s| s.receive(request.seq, result)) else {
                return;
            };
            match outcome {
                ReceiveOutcome::Applied { selection_changed } => {
                    if selection_changed {
                        notify_selection();
                    }
                }
                ReceiveOutcome::Stale => {
                    log::debug!("Ответ #{} устарел и отброшен", request.seq);
                }
                ReceiveOutcome::Failed => {
                    log::error!(
                        "Не удалось загрузить страницу {}: {}",
                        request.params.page,
                        error.unwrap_or_default()
                    );
                }
            }
        });
    };

    let dispatch = move |action: TableAction| {
        let Some(transition) = state.try_update(|s| s.dispatch(action)) else {
            return;
        };
        if transition.selection_changed {
            notify_selection();
        }
        if let Some(request) = transition.fetch {
            run_fetch(request);
        }
    };
    let on_action = Callback::new(dispatch);

    Effect::new(move |_| untrack(|| dispatch(TableAction::Load)));

    if let Some(refresh) = refresh {
        Effect::new(move |previous: Option<u32>| {
            let current = refresh.get();
            if previous.is_some_and(|p| p != current) {
                untrack(|| dispatch(TableAction::Refresh));
            }
            current
        });
    }

    on_cleanup(move || {
        state.try_update(|s| s.cancel_pending());
    });

    let visible_columns = Memo::new(move |_| state.with(|s| s.columns().visible_columns()));
    let all_columns = Memo::new(move |_| state.with(|s| s.columns().columns().to_vec()));
    let visible_accessors = Memo::new(move |_| state.with(|s| s.columns().visible_accessors()));
    let selection = Memo::new(move |_| state.with(|s| s.selection()));
    let page_rows = Memo::new(move |_| {
        state.with(|s| {
            s.rows()
                .iter()
                .map(|row| (s.row_id(row), row.clone()))
                .collect::<Vec<(RowId, Row)>>()
        })
    });
    let sort = Signal::derive(move || state.with(|s| s.sort().clone()));
    let meta = Signal::derive(move || state.with(|s| *s.meta()));
    let is_loading = Signal::derive(move || state.with(|s| s.is_loading()));
    let load_error = Memo::new(move |_| {
        state.with(|s| match s.status() {
            LoadStatus::Failed { page, message } => Some((*page, message.clone())),
            _ => None,
        })
    });

    let delete_selected = on_delete_selected.map(|callback| {
        Callback::new(move |_: ()| {
            let rows = state.with_untracked(|s| s.selected_rows());
            if rows.is_empty() {
                return;
            }
            let confirmed = web_sys::window()
                .and_then(|w| {
                    w.confirm_with_message(&format!("Удалить выбранные записи ({})?", rows.len()))
                        .ok()
                })
                .unwrap_or(false);
            if confirmed {
                log::info!("Удаление {} выбранных записей", rows.len());
                callback.run(rows);
            }
        })
    });

    let render_row = move |(index, (id, row)): (usize, (RowId, Row))| {
        let checked_id = id.clone();
        let row_for_cells = row.clone();
        let menu_id = menu_prefix.with_value(|prefix| menu::row_menu_id(prefix, index));

        view! {
            <TableRow>
                <TableCellCheckbox
                    checked=Signal::derive(move || selection.with(|s| s.selected.contains(&checked_id)))
                    on_toggle=Callback::new(move |_| dispatch(TableAction::ToggleRow(id.clone())))
                />
                {move || {
                    visible_columns
                        .get()
                        .into_iter()
                        .map(|column| {
                            let content = renderers
                                .with_value(|r| r.get(&column.accessor).map(|render| render(&row_for_cells)))
                                .unwrap_or_else(|| cell_text(row_for_cells.get(&column.accessor)).into_any());
                            view! {
                                <TableCell>
                                    <TableCellLayout truncate=true>{content}</TableCellLayout>
                                </TableCell>
                            }
                        })
                        .collect_view()
                }}
                {has_actions.then(|| view! {
                    <TableCell>
                        <RowActionMenu
                            menu_id=menu_id
                            row=row
                            actions=row_actions.get_value()
                            metrics=menu_metrics
                        />
                    </TableCell>
                })}
            </TableRow>
        }
    };

    let page_size_options = config.page_size_options.clone();
    let search_debounce_ms = config.search_debounce_ms;
    let export_batch_size = config.export_batch_size;
    let export_row_limit = config.export_row_limit;

    view! {
        <div class="data-table" id=table_id.clone()>
            <div class="data-table__toolbar">
                <SearchInput
                    value=Signal::derive(move || state.with(|s| s.search_input().to_string()))
                    on_change=Callback::new(move |term| dispatch(TableAction::Search(term)))
                    debounce_ms=search_debounce_ms
                />
                <div class="data-table__toolbar-right">
                    <ColumnMenu
                        menu_id=format!("{}-columns", table_id)
                        columns=all_columns
                        visible=visible_accessors
                        on_action=on_action
                        metrics=menu_metrics
                    />
                    <Button
                        appearance=ButtonAppearance::Secondary
                        on_click=move |_| export_open.set(true)
                    >
                        {icon("download")}
                        " Экспорт"
                    </Button>
                    <Button
                        appearance=ButtonAppearance::Secondary
                        on_click=move |_| dispatch(TableAction::Refresh)
                        disabled=is_loading
                    >
                        {icon("refresh")}
                        {move || if is_loading.get() { " Загрузка..." } else { " Обновить" }}
                    </Button>
                </div>
            </div>

            <BulkActions
                count=Signal::derive(move || selection.with(|s| s.count()))
                on_clear=Callback::new(move |_| dispatch(TableAction::ClearSelection))
                on_delete=delete_selected
            />

            {move || load_error.get().map(|(page, message)| view! {
                <div class="alert alert--error" role="alert">
                    {icon("alert")}
                    <span>{format!("Не удалось загрузить страницу {}: {}", page, message)}</span>
                    <Button
                        appearance=ButtonAppearance::Secondary
                        on_click=move |_| dispatch(TableAction::Retry)
                    >
                        "Повторить"
                    </Button>
                </div>
            })}

            <div class="table-wrapper" aria-busy=move || is_loading.get().to_string()>
                <Table attr:style="width: 100%;">
                    <TableHeader>
                        <TableRow>
                            <TableHeaderCheckbox
                                selection=selection
                                disabled=Signal::derive(move || page_rows.with(|rows| rows.is_empty()))
                                on_toggle=Callback::new(move |_| dispatch(TableAction::ToggleAllRows))
                            />
                            {move || {
                                visible_columns
                                    .get()
                                    .into_iter()
                                    .map(|column| {
                                        if column.sortable {
                                            view! {
                                                <SortableHeaderCell
                                                    label=column.header
                                                    sort_field=column.accessor
                                                    sort=sort
                                                    on_sort=Callback::new(move |field| dispatch(TableAction::Sort(field)))
                                                />
                                            }
                                            .into_any()
                                        } else {
                                            view! {
                                                <TableHeaderCell resizable=false>{column.header}</TableHeaderCell>
                                            }
                                            .into_any()
                                        }
                                    })
                                    .collect_view()
                            }}
                            {has_actions.then(|| view! {
                                <TableHeaderCell resizable=false min_width=48.0></TableHeaderCell>
                            })}
                        </TableRow>
                    </TableHeader>
                    <TableBody>
                        {move || page_rows.get().into_iter().enumerate().map(render_row).collect_view()}
                        <Show when=move || page_rows.with(|rows| rows.is_empty()) && !is_loading.get()>
                            <TableRow>
                                <TableCell>
                                    <TableCellLayout>
                                        <span class="data-table__empty">"Нет данных"</span>
                                    </TableCellLayout>
                                </TableCell>
                            </TableRow>
                        </Show>
                    </TableBody>
                </Table>
            </div>

            <PaginationControls
                meta=meta
                page_size=Signal::derive(move || state.with(|s| s.items_per_page()))
                disabled=is_loading
                on_page_change=Callback::new(move |page| dispatch(TableAction::GoToPage(page)))
                on_page_size_change=Callback::new(move |size| dispatch(TableAction::SetPageSize(size)))
                page_size_options=page_size_options
            />

            <Show when=move || export_open.get()>
                <ExportDialog
                    title=title.get_value()
                    state=state
                    fetcher=fetcher
                    batch_size=export_batch_size
                    row_limit=export_row_limit
                    on_export_data=on_export_data
                    on_close=Callback::new(move |_| export_open.set(false))
                />
            </Show>
        </div>
    }
    .into_any()
}
