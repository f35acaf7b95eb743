//! Выгрузка документа в браузере: скачивание файла или окно печати
use gloo_timers::callback::Timeout;
use wasm_bindgen::JsCast;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

use crate::shared::data_table::export::{ExportContent, ExportDocument, ExportError};

/// Через сколько освобождать URL окна печати: документ должен успеть загрузиться
const PRINT_URL_TTL_MS: u32 = 60_000;

/// Скачивает файл или открывает печатную форму в новом окне
pub fn deliver_document(document: &ExportDocument) -> Result<(), ExportError> {
    let delivered = match &document.content {
        ExportContent::File(bytes) => create_blob(bytes, document.mime_type)
            .and_then(|blob| download_blob(&blob, &document.file_name)),
        ExportContent::Print(html) => create_blob(html.as_bytes(), document.mime_type)
            .and_then(|blob| open_print_window(&blob)),
    };
    delivered.map_err(ExportError::Browser)
}

fn create_blob(bytes: &[u8], mime_type: &str) -> Result<Blob, String> {
    let array = js_sys::Array::new();
    array.push(&js_sys::Uint8Array::from(bytes));

    let properties = BlobPropertyBag::new();
    properties.set_type(mime_type);

    Blob::new_with_u8_array_sequence_and_options(&array, &properties)
        .map_err(|e| format!("Failed to create blob: {:?}", e))
}

/// Инициирует скачивание Blob через браузер
fn download_blob(blob: &Blob, filename: &str) -> Result<(), String> {
    let window = web_sys::window().ok_or("No window object")?;
    let document = window.document().ok_or("No document object")?;

    let url = Url::create_object_url_with_blob(blob)
        .map_err(|e| format!("Failed to create object URL: {:?}", e))?;

    let anchor = document
        .create_element("a")
        .map_err(|e| format!("Failed to create anchor: {:?}", e))?
        .dyn_into::<HtmlAnchorElement>()
        .map_err(|e| format!("Failed to cast to anchor: {:?}", e))?;

    anchor.set_href(&url);
    anchor.set_download(filename);
    anchor
        .style()
        .set_property("display", "none")
        .map_err(|e| format!("Failed to set style: {:?}", e))?;

    let body = document.body().ok_or("No body element")?;
    body.append_child(&anchor)
        .map_err(|e| format!("Failed to append anchor: {:?}", e))?;
    anchor.click();
    body.remove_child(&anchor)
        .map_err(|e| format!("Failed to remove anchor: {:?}", e))?;

    Url::revoke_object_url(&url).map_err(|e| format!("Failed to revoke URL: {:?}", e))?;

    Ok(())
}

/// Открывает печатную форму. Диалог печати вызывает сам документ в `onload`.
fn open_print_window(blob: &Blob) -> Result<(), String> {
    let window = web_sys::window().ok_or("No window object")?;
    let url = Url::create_object_url_with_blob(blob)
        .map_err(|e| format!("Failed to create object URL: {:?}", e))?;

    let opened = window
        .open_with_url_and_target(&url, "_blank")
        .map_err(|e| format!("Failed to open window: {:?}", e))?;
    if opened.is_none() {
        let _ = Url::revoke_object_url(&url);
        return Err("Браузер заблокировал окно печати".to_string());
    }

    Timeout::new(PRINT_URL_TTL_MS, move || {
        let _ = Url::revoke_object_url(&url);
    })
    .forget();

    Ok(())
}
