//! Компонент чекбокса в заголовке таблицы для выбора всех строк страницы
//!
//! # Примеры
//!
//! ```ignore
//! <TableHeaderCheckbox
//!     selection=Signal::derive(move || state.with(|s| s.selection()))
//!     disabled=Signal::derive(move || state.with(|s| s.rows().is_empty()))
//!     on_toggle=Callback::new(move |_| dispatch(TableAction::ToggleAllRows))
//! />
//! ```

use crate::shared::data_table::SelectionState;
use leptos::prelude::*;
use thaw::*;
use wasm_bindgen::JsCast;

/// Компонент чекбокса в заголовке таблицы
///
/// Три состояния: unchecked, checked, indeterminate. Состояние целиком
/// берётся из [`SelectionState`], клик только сообщает о переключении.
#[component]
pub fn TableHeaderCheckbox(
    #[prop(into)]
    selection: Signal<SelectionState>,

    #[prop(optional, into)]
    disabled: Signal<bool>,

    on_toggle: Callback<()>,
) -> impl IntoView {
    let checkbox_ref = NodeRef::<leptos::html::Input>::new();

    // indeterminate нельзя выставить атрибутом, только через DOM
    Effect::new(move |_| {
        let indeterminate = selection.with(|s| s.indeterminate);
        if let Some(input) = checkbox_ref.get() {
            if let Some(input_el) = input.dyn_ref::<web_sys::HtmlInputElement>() {
                input_el.set_indeterminate(indeterminate);
            }
        }
    });

    view! {
        <TableHeaderCell resizable=false class="fixed-checkbox-column">
            <input
                node_ref=checkbox_ref
                type="checkbox"
                class="table__checkbox"
                aria-label="Выбрать все строки"
                disabled=move || disabled.get()
                prop:checked=move || selection.with(|s| s.all_selected)
                on:change=move |_| on_toggle.run(())
            />
        </TableHeaderCell>
    }
}
