//! Компонент сортируемой ячейки заголовка таблицы
//!
//! # Примеры
//!
//! ```ignore
//! <SortableHeaderCell
//!     label="Сумма"
//!     sort_field="amount"
//!     sort=Signal::derive(move || state.with(|s| s.sort().clone()))
//!     on_sort=Callback::new(move |field| dispatch(TableAction::Sort(field)))
//! />
//! ```

use crate::shared::data_table::SortState;
use crate::shared::list_utils::{get_sort_class, get_sort_indicator};
use leptos::prelude::*;
use thaw::*;

/// Компонент сортируемой ячейки заголовка таблицы
///
/// Автоматически:
/// - Добавляет индикатор сортировки (▲▼)
/// - Обрабатывает клики для изменения сортировки
#[component]
pub fn SortableHeaderCell(
    /// Текст заголовка
    #[prop(into)]
    label: String,

    /// Поле для сортировки
    #[prop(into)]
    sort_field: String,

    /// Текущая сортировка таблицы
    #[prop(into)]
    sort: Signal<SortState>,

    /// Callback при клике на заголовок
    on_sort: Callback<String>,

    /// Минимальная ширина колонки
    #[prop(optional, default = 100.0)]
    min_width: f64,
) -> impl IntoView {
    let sort_field_for_click = sort_field.clone();
    let sort_field_for_indicator = sort_field.clone();
    let sort_field_for_class = sort_field.clone();
    let sort_field_for_aria = sort_field;

    view! {
        <TableHeaderCell resizable=false min_width=min_width>
            <div
                class="table__sortable-header"
                style="cursor: pointer; padding-right: 12px;"
                role="button"
                aria-sort=move || {
                    let current = sort.get();
                    if !current.is_sorted_by(&sort_field_for_aria) {
                        "none"
                    } else if current.direction.is_ascending() {
                        "ascending"
                    } else {
                        "descending"
                    }
                }
                on:click=move |_| on_sort.run(sort_field_for_click.clone())
            >
                {label}
                <span class=move || get_sort_class(&sort.get(), &sort_field_for_class)>
                    {move || get_sort_indicator(&sort.get(), &sort_field_for_indicator)}
                </span>
            </div>
        </TableHeaderCell>
    }
}
