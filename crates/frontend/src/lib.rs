pub mod app;
pub mod records;
pub mod shared;

use wasm_bindgen::prelude::wasm_bindgen;

/// В отладочной сборке в консоль идут и debug-сообщения таблицы
fn log_level() -> log::Level {
    if cfg!(debug_assertions) {
        log::Level::Debug
    } else {
        log::Level::Info
    }
}

#[wasm_bindgen(start)]
pub fn start() {
    _ = console_log::init_with_level(log_level());
    console_error_panic_hook::set_once();

    leptos::mount::mount_to_body(app::App);
}
