//! Выгрузка данных таблицы: CSV, JSON, печатная форма (PDF через печать браузера) и XLSX.
//!
//! Здесь только формирование документа. Скачивание и открытие окна печати
//! находятся в `shared::export`.

use chrono::{DateTime, Local};
use contracts::shared::data_table::{FetchParams, PageResult, Row};
use rust_xlsxwriter::{Format, Workbook};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use thiserror::Error;

use super::columns::ColumnDefinition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
    Pdf,
    Xlsx,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [
        ExportFormat::Csv,
        ExportFormat::Json,
        ExportFormat::Pdf,
        ExportFormat::Xlsx,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv;charset=utf-8",
            ExportFormat::Json => "application/json;charset=utf-8",
            ExportFormat::Pdf => "text/html;charset=utf-8",
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Json => "JSON",
            ExportFormat::Pdf => "PDF (печать)",
            ExportFormat::Xlsx => "Excel (XLSX)",
        }
    }

    pub fn from_extension(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.extension() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportScope {
    /// Только строки текущей страницы
    #[default]
    Current,
    /// Весь набор с учётом поиска и сортировки
    All,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub format: ExportFormat,
    pub scope: ExportScope,
    /// accessor выбранных колонок в порядке вывода
    pub columns: Vec<String>,
    pub file_name: String,
}

impl ExportRequest {
    pub fn new(format: ExportFormat, columns: Vec<String>) -> Self {
        Self {
            format,
            scope: ExportScope::Current,
            columns,
            file_name: "export".to_string(),
        }
    }

    /// Имя файла с расширением формата
    pub fn file_name_with_extension(&self) -> String {
        let base = self.file_name.trim();
        let base = if base.is_empty() { "export" } else { base };
        let ext = self.format.extension();
        if base
            .rsplit_once('.')
            .map(|(_, current)| current.eq_ignore_ascii_case(ext))
            .unwrap_or(false)
        {
            base.to_string()
        } else {
            format!("{base}.{ext}")
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Нет данных для экспорта")]
    NothingToExport,
    #[error("Не выбрано ни одной колонки")]
    NoColumns,
    #[error("Неизвестная колонка: {0}")]
    UnknownColumn(String),
    #[error("Не удалось загрузить данные для экспорта: {0}")]
    Fetch(String),
    #[error("Экспорт отменён")]
    Cancelled,
    #[error("CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("XLSX: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error("{0}")]
    Browser(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportContent {
    /// Файл для скачивания
    File(Vec<u8>),
    /// HTML-документ, который открывается в новом окне и сразу отправляется на печать
    Print(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDocument {
    pub file_name: String,
    pub mime_type: &'static str,
    pub content: ExportContent,
}

/// Строки, собранные для выгрузки всего набора
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectedRows {
    pub rows: Vec<Row>,
    /// Набор больше лимита и выгружен не полностью
    pub truncated: bool,
}

/// Текстовое представление значения ячейки. Для `null` и отсутствующего поля пустая строка.
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Сопоставляет выбранные accessor с описаниями колонок
pub fn resolve_columns(
    available: &[ColumnDefinition],
    selected: &[String],
) -> Result<Vec<ColumnDefinition>, ExportError> {
    if selected.is_empty() {
        return Err(ExportError::NoColumns);
    }
    selected
        .iter()
        .map(|accessor| {
            available
                .iter()
                .find(|c| &c.accessor == accessor)
                .cloned()
                .ok_or_else(|| ExportError::UnknownColumn(accessor.clone()))
        })
        .collect()
}

/// Первая строка: заголовки через запятую, далее каждое значение в двойных кавычках
pub fn render_csv(columns: &[ColumnDefinition], rows: &[Row]) -> Result<String, ExportError> {
    let mut header = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(Vec::new());
    header.write_record(columns.iter().map(|c| c.header.as_str()))?;
    let buffer = header
        .into_inner()
        .map_err(|e| ExportError::Csv(e.into_error().into()))?;

    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(buffer);
    for row in rows {
        writer.write_record(columns.iter().map(|c| cell_text(row.get(&c.accessor))))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Csv(e.into_error().into()))?;

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Массив объектов только с выбранными колонками
pub fn render_json(columns: &[ColumnDefinition], rows: &[Row]) -> Result<String, ExportError> {
    let items: Vec<Row> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|c| {
                    let value = row.get(&c.accessor).cloned().unwrap_or(Value::Null);
                    (c.accessor.clone(), value)
                })
                .collect()
        })
        .collect();
    Ok(serde_json::to_string_pretty(&items)?)
}

/// Самодостаточный HTML для печати: заголовок, время формирования, счётчики и таблица
pub fn render_print_html(
    title: &str,
    columns: &[ColumnDefinition],
    rows: &[Row],
    generated_at: DateTime<Local>,
) -> String {
    let title = ammonia::clean_text(title);
    let head: String = columns
        .iter()
        .map(|c| format!("<th>{}</th>", ammonia::clean_text(&c.header)))
        .collect();
    let body: String = rows
        .iter()
        .map(|row| {
            let cells: String = columns
                .iter()
                .map(|c| {
                    format!(
                        "<td>{}</td>",
                        ammonia::clean_text(&cell_text(row.get(&c.accessor)))
                    )
                })
                .collect();
            format!("<tr>{cells}</tr>")
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="ru">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
body {{ font-family: Arial, sans-serif; font-size: 12px; margin: 16px; }}
h1 {{ font-size: 18px; margin: 0 0 4px 0; }}
.meta {{ color: #555; margin-bottom: 12px; }}
table {{ border-collapse: collapse; width: 100%; }}
th, td {{ border: 1px solid #ccc; padding: 4px 6px; text-align: left; }}
th {{ background: #f3f3f3; }}
@media print {{ tr {{ page-break-inside: avoid; }} }}
</style>
<script>window.onload = function () {{ window.print(); }};</script>
</head>
<body>
<h1>{title}</h1>
<div class="meta">Сформировано: {generated}. Строк: {row_count}, колонок: {column_count}</div>
<table>
<thead><tr>{head}</tr></thead>
<tbody>{body}</tbody>
</table>
</body>
</html>
"#,
        generated = generated_at.format("%d.%m.%Y %H:%M:%S"),
        row_count = rows.len(),
        column_count = columns.len(),
    )
}

/// Книга Excel с одним листом. Числа и логические значения пишутся типизированно.
pub fn render_xlsx(columns: &[ColumnDefinition], rows: &[Row]) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Данные")?;

    for (col, column) in columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, column.header.as_str(), &header_format)?;
    }

    for (index, row) in rows.iter().enumerate() {
        let excel_row = index as u32 + 1;
        for (col, column) in columns.iter().enumerate() {
            let col = col as u16;
            match row.get(&column.accessor) {
                None | Some(Value::Null) => {}
                Some(Value::Bool(b)) => {
                    worksheet.write_boolean(excel_row, col, *b)?;
                }
                Some(Value::Number(n)) => match n.as_f64() {
                    Some(number) => {
                        worksheet.write_number(excel_row, col, number)?;
                    }
                    None => {
                        worksheet.write_string(excel_row, col, n.to_string())?;
                    }
                },
                Some(other) => {
                    worksheet.write_string(excel_row, col, cell_text(Some(other)))?;
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// Формирует документ по запросу.
///
/// `available` содержит все колонки таблицы: выбор колонок для выгрузки не ограничен видимыми.
pub fn build_document(
    request: &ExportRequest,
    available: &[ColumnDefinition],
    rows: &[Row],
    title: &str,
    generated_at: DateTime<Local>,
) -> Result<ExportDocument, ExportError> {
    let columns = resolve_columns(available, &request.columns)?;
    if rows.is_empty() {
        return Err(ExportError::NothingToExport);
    }

    let content = match request.format {
        ExportFormat::Csv => ExportContent::File(render_csv(&columns, rows)?.into_bytes()),
        ExportFormat::Json => ExportContent::File(render_json(&columns, rows)?.into_bytes()),
        ExportFormat::Pdf => {
            ExportContent::Print(render_print_html(title, &columns, rows, generated_at))
        }
        ExportFormat::Xlsx => ExportContent::File(render_xlsx(&columns, rows)?),
    };

    Ok(ExportDocument {
        file_name: request.file_name_with_extension(),
        mime_type: request.format.mime_type(),
        content,
    })
}

/// Постранично читает весь набор через тот же источник, что и таблица.
///
/// Поиск и сортировка берутся из `base`. Чтение прекращается на последней
/// странице или по достижении `row_limit`. `is_cancelled` проверяется до и
/// после каждой пачки, после отмены запросы больше не отправляются.
pub async fn collect_rows<F, Fut, C>(
    fetch: F,
    base: &FetchParams,
    batch_size: usize,
    row_limit: usize,
    is_cancelled: C,
) -> Result<CollectedRows, ExportError>
where
    F: Fn(FetchParams) -> Fut,
    Fut: Future<Output = Result<PageResult, String>>,
    C: Fn() -> bool,
{
    let mut rows: Vec<Row> = Vec::new();
    let mut page = 1;

    loop {
        let params = FetchParams {
            page,
            items_per_page: batch_size.max(1),
            ..base.clone()
        };
        if is_cancelled() {
            return Err(ExportError::Cancelled);
        }
        let result = fetch(params.clone()).await.map_err(ExportError::Fetch)?;
        if is_cancelled() {
            return Err(ExportError::Cancelled);
        }
        let meta = result.meta_or_derived(&params);
        // источник вернул другую страницу: дальше данных нет
        if meta.current_page != page || result.items.is_empty() {
            break;
        }

        rows.extend(result.items);
        if rows.len() >= row_limit {
            let truncated = rows.len() > row_limit || meta.has_next;
            rows.truncate(row_limit);
            return Ok(CollectedRows { rows, truncated });
        }
        if !meta.has_next {
            break;
        }
        page += 1;
    }

    Ok(CollectedRows {
        rows,
        truncated: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use contracts::shared::data_table::Meta;
    use serde_json::json;
    use std::cell::Cell;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    fn columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("Name", "name"),
            ColumnDefinition::new("Code", "code"),
            ColumnDefinition::new("Note", "note").hidden(),
        ]
    }

    fn selected(accessors: &[&str]) -> Vec<ColumnDefinition> {
        resolve_columns(
            &columns(),
            &accessors.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
        )
        .unwrap()
    }

    #[test]
    fn test_csv_layout() {
        let rows = vec![row(json!({"name": "Acme", "code": 42, "note": null}))];
        let csv = render_csv(&selected(&["name", "code", "note"]), &rows).unwrap();
        assert_eq!(csv, "Name,Code,Note\n\"Acme\",\"42\",\"\"\n");
    }

    #[test]
    fn test_csv_round_trip_with_comma_and_quotes() {
        let original = r#"A, "B""#;
        let rows = vec![row(json!({"name": original, "code": "x"}))];
        let csv = render_csv(&selected(&["name", "code"]), &rows).unwrap();
        assert!(csv.contains(r#""A, ""B""""#));

        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), vec!["Name", "Code"]);
        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(&record[0], original);
        assert_eq!(&record[1], "x");
    }

    #[test]
    fn test_json_only_selected_columns() {
        let rows = vec![row(json!({"name": "Acme", "code": 1, "secret": "s"}))];
        let text = render_json(&selected(&["name", "note"]), &rows).unwrap();
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, json!([{"name": "Acme", "note": null}]));
    }

    #[test]
    fn test_print_document_is_escaped() {
        let rows = vec![row(json!({"name": "<b>x</b>", "code": 1}))];
        let generated_at = Local.with_ymd_and_hms(2024, 3, 15, 14, 2, 26).unwrap();
        let html = render_print_html("Отчёт", &selected(&["name", "code"]), &rows, generated_at);
        assert!(html.contains("window.print()"));
        assert!(html.contains("15.03.2024 14:02:26"));
        assert!(html.contains("Строк: 1, колонок: 2"));
        assert!(!html.contains("<b>x</b>"));
    }

    #[test]
    fn test_xlsx_is_zip_workbook() {
        let rows = vec![row(json!({"name": "Acme", "code": 7}))];
        let bytes = render_xlsx(&selected(&["name", "code"]), &rows).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_empty_rows_are_reported() {
        let request = ExportRequest::new(ExportFormat::Csv, vec!["name".into()]);
        let result = build_document(&request, &columns(), &[], "t", Local::now());
        assert!(matches!(result, Err(ExportError::NothingToExport)));

        let request = ExportRequest::new(ExportFormat::Csv, Vec::new());
        let rows = vec![row(json!({"name": "a"}))];
        let result = build_document(&request, &columns(), &rows, "t", Local::now());
        assert!(matches!(result, Err(ExportError::NoColumns)));
    }

    #[test]
    fn test_hidden_column_can_be_exported() {
        let request = ExportRequest::new(ExportFormat::Json, vec!["note".into()]);
        let rows = vec![row(json!({"note": "n"}))];
        let doc = build_document(&request, &columns(), &rows, "t", Local::now()).unwrap();
        assert_eq!(doc.file_name, "export.json");
        assert!(matches!(doc.content, ExportContent::File(_)));
    }

    #[test]
    fn test_file_name_extension() {
        let mut request = ExportRequest::new(ExportFormat::Xlsx, vec![]);
        request.file_name = "report.XLSX".into();
        assert_eq!(request.file_name_with_extension(), "report.XLSX");
        request.file_name = "report.csv".into();
        assert_eq!(request.file_name_with_extension(), "report.csv.xlsx");
        request.file_name = "  ".into();
        assert_eq!(request.file_name_with_extension(), "export.xlsx");
    }

    fn dataset(total: usize) -> Vec<Row> {
        (0..total).map(|i| row(json!({"id": i}))).collect()
    }

    async fn serve(data: Vec<Row>, params: FetchParams) -> Result<PageResult, String> {
        let meta = Meta::from_total(data.len(), params.page, params.items_per_page);
        let start = (meta.current_page - 1) * params.items_per_page;
        let end = (start + params.items_per_page).min(data.len());
        Ok(PageResult {
            items: data[start.min(end)..end].to_vec(),
            meta: Some(meta),
        })
    }

    #[tokio::test]
    async fn test_collect_all_pages() {
        let data = dataset(1234);
        let collected = collect_rows(
            |params| serve(data.clone(), params),
            &FetchParams::default(),
            500,
            10_000,
            || false,
        )
        .await
        .unwrap();
        assert_eq!(collected.rows.len(), 1234);
        assert!(!collected.truncated);
        assert_eq!(collected.rows[1233]["id"], 1233);
    }

    #[tokio::test]
    async fn test_collect_stops_at_limit() {
        let data = dataset(1234);
        let collected = collect_rows(
            |params| serve(data.clone(), params),
            &FetchParams::default(),
            500,
            1000,
            || false,
        )
        .await
        .unwrap();
        assert_eq!(collected.rows.len(), 1000);
        assert!(collected.truncated);
    }

    #[tokio::test]
    async fn test_collect_keeps_search_and_sort() {
        let base = FetchParams {
            search_term: "contains:ab".into(),
            sort_field: Some("name".into()),
            ..FetchParams::default()
        };
        let collected = collect_rows(
            |params: FetchParams| async move {
                assert_eq!(params.search_term, "contains:ab");
                assert_eq!(params.sort_field.as_deref(), Some("name"));
                Ok(PageResult::default())
            },
            &base,
            100,
            1000,
            || false,
        )
        .await
        .unwrap();
        assert!(collected.rows.is_empty());
    }

    #[tokio::test]
    async fn test_collect_propagates_failure() {
        let result = collect_rows(
            |_params| async { Err::<PageResult, String>("502".into()) },
            &FetchParams::default(),
            100,
            1000,
            || false,
        )
        .await;
        assert!(matches!(result, Err(ExportError::Fetch(msg)) if msg == "502"));
    }

    #[tokio::test]
    async fn test_collect_stops_after_cancel() {
        let data = dataset(1234);
        let fetched = Cell::new(0);
        let result = collect_rows(
            |params| {
                fetched.set(fetched.get() + 1);
                serve(data.clone(), params)
            },
            &FetchParams::default(),
            500,
            10_000,
            || fetched.get() >= 1,
        )
        .await;
        assert!(matches!(result, Err(ExportError::Cancelled)));
        assert_eq!(fetched.get(), 1);
    }
}
