//! Компонент чекбокса в ячейке таблицы для выбора отдельной строки

use leptos::prelude::*;
use thaw::*;

/// Компонент чекбокса в ячейке таблицы
///
/// Останавливает propagation клика, чтобы не вызывать клик на строке.
#[component]
pub fn TableCellCheckbox(
    #[prop(into)]
    checked: Signal<bool>,

    on_toggle: Callback<()>,
) -> impl IntoView {
    view! {
        <TableCell class="fixed-checkbox-column" on:click=|e| e.stop_propagation()>
            <input
                type="checkbox"
                class="table__checkbox"
                aria-label="Выбрать строку"
                prop:checked=move || checked.get()
                on:change=move |_| on_toggle.run(())
            />
        </TableCell>
    }
}
