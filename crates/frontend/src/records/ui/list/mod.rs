use contracts::records::record_id;
use contracts::shared::data_table::Row;
use leptos::prelude::*;
use leptos::task::spawn_local;
use serde_json::Value;
use thaw::*;

use crate::records::api;
use crate::shared::components::data_table::{DataFetcher, DataTable, RowAction, TableColumn};
use crate::shared::data_table::ColumnDefinition;

fn status_badge(row: &Row) -> AnyView {
    let status = row.get("status").and_then(Value::as_str).unwrap_or_default().to_string();
    let class = match status.as_str() {
        "active" => "badge badge--success",
        "archived" => "badge badge--neutral",
        _ => "badge badge--warning",
    };
    view! { <span class=class>{status}</span> }.into_any()
}

fn record_columns() -> Vec<TableColumn> {
    vec![
        ColumnDefinition::new("ID", "id").sortable().into(),
        ColumnDefinition::new("Название", "name").sortable().searchable().into(),
        ColumnDefinition::new("Категория", "category").sortable().searchable().into(),
        TableColumn::from(ColumnDefinition::new("Статус", "status").sortable()).render(status_badge),
        ColumnDefinition::new("Сумма", "amount").sortable().into(),
        ColumnDefinition::new("Создано", "createdAt").sortable().into(),
        ColumnDefinition::new("Комментарий", "comment").searchable().hidden().into(),
    ]
}

#[component]
pub fn RecordsListPage() -> impl IntoView {
    let refresh = RwSignal::new(0u32);
    let (error, set_error) = signal::<Option<String>>(None);
    let (selected_count, set_selected_count) = signal(0usize);

    let delete_rows = move |rows: Vec<Row>| {
        let ids: Vec<String> = rows.iter().filter_map(record_id).collect();
        if ids.is_empty() {
            return;
        }
        set_error.set(None);
        spawn_local(async move {
            match api::delete_records(ids).await {
                Ok(deleted) => {
                    log::info!("Удалено записей: {}", deleted);
                    refresh.update(|n| *n += 1);
                }
                Err(e) => {
                    log::error!("Не удалось удалить записи: {}", e);
                    set_error.set(Some(format!("Не удалось удалить записи: {}", e)));
                }
            }
        });
    };

    let row_actions = vec![
        RowAction::new("Копировать ID", move |row: Row| {
            let Some(id) = record_id(&row) else {
                return;
            };
            spawn_local(async move {
                if let Some(window) = web_sys::window() {
                    let clipboard = window.navigator().clipboard();
                    let _ = wasm_bindgen_futures::JsFuture::from(clipboard.write_text(&id)).await;
                }
            });
        }),
        RowAction::new("Удалить", move |row: Row| {
            let confirmed = web_sys::window()
                .and_then(|w| w.confirm_with_message("Удалить запись?").ok())
                .unwrap_or(false);
            if confirmed {
                delete_rows(vec![row]);
            }
        })
        .danger(),
    ];

    view! {
        <div class="page">
            <div class="page__header">
                <div class="page__header-left">
                    <h1 class="page__title">"Записи"</h1>
                    <Show when=move || { selected_count.get() > 0 }>
                        <Badge>{move || selected_count.get().to_string()}</Badge>
                    </Show>
                </div>
            </div>
            <div class="page__content">
                {move || error.get().map(|e| view! { <div class="alert alert--error">{e}</div> })}
                <DataTable
                    title="Записи"
                    columns=record_columns()
                    fetch_data=DataFetcher::new(api::fetch_records)
                    row_actions=row_actions
                    on_selection_change=Callback::new(move |rows: Vec<Row>| set_selected_count.set(rows.len()))
                    on_delete_selected=Callback::new(delete_rows)
                    refresh=refresh
                />
            </div>
        </div>
    }
}
