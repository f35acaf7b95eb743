use chrono::Local;
use contracts::shared::data_table::{FetchParams, Row};
use leptos::prelude::*;
use leptos::task::spawn_local;
use thaw::*;

use super::DataFetcher;
use crate::shared::data_table::export::{build_document, collect_rows, CollectedRows};
use crate::shared::data_table::{
    ColumnDefinition, ExportError, ExportFormat, ExportRequest, ExportScope, TableState,
};
use crate::shared::export::deliver_document;
use crate::shared::modal::Modal;

/// Включает или исключает колонку, сохраняя порядок колонок таблицы
fn toggle_export_column(chosen: &mut Vec<String>, accessor: &str, order: &[ColumnDefinition]) {
    if let Some(pos) = chosen.iter().position(|a| a == accessor) {
        chosen.remove(pos);
        return;
    }
    chosen.push(accessor.to_string());
    chosen.sort_by_key(|a| {
        order
            .iter()
            .position(|c| &c.accessor == a)
            .unwrap_or(usize::MAX)
    });
}

/// Имя файла по заголовку таблицы: пробелы и разделители пути заменяются на `_`
fn default_file_name(title: &str) -> String {
    let name: String = title
        .trim()
        .chars()
        .map(|c| {
            if c.is_whitespace() || matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') {
                '_'
            } else {
                c
            }
        })
        .collect();
    if name.is_empty() {
        "export".to_string()
    } else {
        name
    }
}

struct ExportJob {
    request: ExportRequest,
    title: String,
    available: Vec<ColumnDefinition>,
    current_rows: Vec<Row>,
    base: FetchParams,
}

/// Собирает строки, формирует документ и отдаёт его браузеру.
/// Возвращает выгруженные строки и признак усечения.
/// После отмены файл не отдаётся.
async fn run_export(
    job: ExportJob,
    fetcher: DataFetcher,
    batch_size: usize,
    row_limit: usize,
    is_cancelled: impl Fn() -> bool,
) -> Result<CollectedRows, ExportError> {
    let collected = match job.request.scope {
        ExportScope::Current => CollectedRows {
            rows: job.current_rows,
            truncated: false,
        },
        ExportScope::All => {
            collect_rows(
                |params| fetcher.fetch(params),
                &job.base,
                batch_size,
                row_limit,
                &is_cancelled,
            )
            .await?
        }
    };
    let document = build_document(
        &job.request,
        &job.available,
        &collected.rows,
        &job.title,
        Local::now(),
    )?;
    if is_cancelled() {
        return Err(ExportError::Cancelled);
    }
    deliver_document(&document)?;
    Ok(collected)
}

#[component]
pub(super) fn ExportDialog(
    title: String,
    state: RwSignal<TableState>,
    fetcher: StoredValue<DataFetcher, LocalStorage>,
    batch_size: usize,
    row_limit: usize,
    on_export_data: Option<Callback<ExportRequest>>,
    on_close: Callback<()>,
) -> impl IntoView {
    let columns = StoredValue::new(state.with_untracked(|s| s.columns().columns().to_vec()));
    let format = RwSignal::new(ExportFormat::Csv);
    let scope = RwSignal::new(ExportScope::Current);
    let chosen = RwSignal::new(state.with_untracked(|s| s.columns().visible_accessors()));
    let file_name = RwSignal::new(default_file_name(&title));
    let title = StoredValue::new(title);
    let busy = RwSignal::new(false);
    let error = RwSignal::new(None::<String>);
    let notice = RwSignal::new(None::<String>);

    let start_export = move || {
        let mut request = ExportRequest::new(format.get_untracked(), chosen.get_untracked());
        request.scope = scope.get_untracked();
        request.file_name = file_name.get_untracked();

        if let Some(callback) = on_export_data {
            callback.run(request);
            on_close.run(());
            return;
        }

        let job = state.with_untracked(|s| ExportJob {
            request,
            title: title.get_value(),
            available: columns.get_value(),
            current_rows: s.rows().to_vec(),
            base: s.current_params(),
        });
        let format_label = job.request.format.label();
        busy.set(true);
        error.set(None);
        notice.set(None);

        let fetcher = fetcher.get_value();
        spawn_local(async move {
            // закрытие диалога освобождает его сигналы
            let closed = move || busy.try_get_untracked().is_none();
            let result = run_export(job, fetcher, batch_size, row_limit, closed).await;
            // диалог мог быть закрыт во время выгрузки
            if busy.try_set(false).is_some() {
                log::debug!("Экспорт {} прерван: диалог закрыт", format_label);
                return;
            }
            match result {
                Ok(collected) if collected.truncated => {
                    log::warn!("Экспорт {} усечён до {} строк", format_label, collected.rows.len());
                    notice.set(Some(format!(
                        "Выгружены первые {} строк: набор больше лимита",
                        collected.rows.len()
                    )));
                }
                Ok(collected) => {
                    log::info!("Экспорт {}: {} строк", format_label, collected.rows.len());
                    on_close.run(());
                }
                Err(ExportError::NothingToExport) => {
                    error.set(Some("Нет данных для экспорта".to_string()));
                }
                Err(e) => {
                    log::error!("Ошибка экспорта {}: {}", format_label, e);
                    error.set(Some(e.to_string()));
                }
            }
        });
    };

    view! {
        <Modal title="Экспорт данных" on_close=on_close>
            <div class="export-dialog">
                <fieldset class="export-dialog__group">
                    <legend>"Формат"</legend>
                    {ExportFormat::ALL
                        .into_iter()
                        .map(|option| view! {
                            <label class="export-dialog__option">
                                <input
                                    type="radio"
                                    name="export-format"
                                    prop:checked=move || format.get() == option
                                    on:change=move |_| format.set(option)
                                />
                                {option.label()}
                            </label>
                        })
                        .collect_view()}
                </fieldset>

                <fieldset class="export-dialog__group">
                    <legend>"Строки"</legend>
                    <label class="export-dialog__option">
                        <input
                            type="radio"
                            name="export-scope"
                            prop:checked=move || scope.get() == ExportScope::Current
                            on:change=move |_| scope.set(ExportScope::Current)
                        />
                        "Текущая страница"
                    </label>
                    <label class="export-dialog__option">
                        <input
                            type="radio"
                            name="export-scope"
                            prop:checked=move || scope.get() == ExportScope::All
                            on:change=move |_| scope.set(ExportScope::All)
                        />
                        {format!("Все строки (не более {})", row_limit)}
                    </label>
                </fieldset>

                <fieldset class="export-dialog__group">
                    <legend>"Колонки"</legend>
                    {columns
                        .get_value()
                        .into_iter()
                        .map(|column| {
                            let accessor = column.accessor.clone();
                            let checked_accessor = column.accessor;
                            view! {
                                <label class="export-dialog__option">
                                    <input
                                        type="checkbox"
                                        prop:checked=move || chosen.with(|c| c.contains(&checked_accessor))
                                        on:change=move |_| {
                                            columns.with_value(|order| {
                                                chosen.update(|c| toggle_export_column(c, &accessor, order));
                                            });
                                        }
                                    />
                                    {column.header}
                                </label>
                            }
                        })
                        .collect_view()}
                </fieldset>

                <label class="export-dialog__file-name">
                    "Имя файла"
                    <input
                        type="text"
                        prop:value=move || file_name.get()
                        on:input=move |ev| file_name.set(event_target_value(&ev))
                    />
                </label>

                {move || error.get().map(|e| view! { <div class="alert alert--error" role="alert">{e}</div> })}
                {move || notice.get().map(|n| view! { <div class="alert alert--warning" role="status">{n}</div> })}

                <div class="export-dialog__actions">
                    <Button
                        appearance=ButtonAppearance::Secondary
                        on_click=move |_| on_close.run(())
                    >
                        "Отмена"
                    </Button>
                    <Button
                        appearance=ButtonAppearance::Primary
                        on_click=move |_| start_export()
                        disabled=Signal::derive(move || busy.get() || chosen.with(|c| c.is_empty()))
                    >
                        {move || if busy.get() { "Выгрузка..." } else { "Экспортировать" }}
                    </Button>
                </div>
            </div>
        </Modal>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("ID", "id"),
            ColumnDefinition::new("Название", "name"),
            ColumnDefinition::new("Статус", "status"),
        ]
    }

    #[test]
    fn test_toggle_export_column_keeps_table_order() {
        let mut chosen = vec!["status".to_string()];
        toggle_export_column(&mut chosen, "id", &order());
        assert_eq!(chosen, vec!["id", "status"]);
        toggle_export_column(&mut chosen, "name", &order());
        assert_eq!(chosen, vec!["id", "name", "status"]);
    }

    #[test]
    fn test_toggle_export_column_removes_selected() {
        let mut chosen = vec!["id".to_string(), "name".to_string()];
        toggle_export_column(&mut chosen, "id", &order());
        assert_eq!(chosen, vec!["name"]);
    }

    #[test]
    fn test_default_file_name() {
        assert_eq!(default_file_name("Список записей"), "Список_записей");
        assert_eq!(default_file_name("a/b:c"), "a_b_c");
        assert_eq!(default_file_name("   "), "export");
    }

    #[tokio::test]
    async fn test_export_is_not_delivered_after_close() {
        let row = serde_json::json!({"id": 1, "name": "a"})
            .as_object()
            .cloned()
            .unwrap();
        let job = ExportJob {
            request: ExportRequest::new(ExportFormat::Csv, vec!["id".to_string()]),
            title: "Записи".to_string(),
            available: order(),
            current_rows: vec![row],
            base: FetchParams::default(),
        };
        let fetcher = DataFetcher::new(|_params| async { Err::<_, String>("unused".into()) });

        let result = run_export(job, fetcher, 100, 1000, || true).await;
        assert!(matches!(result, Err(ExportError::Cancelled)));
    }
}
