use leptos::prelude::*;

use super::anchor_placement;
use crate::shared::data_table::{ColumnDefinition, MenuMetrics, MenuPlacement, TableAction};
use crate::shared::icons::icon;
use crate::shared::overlay::use_overlay;

/// Меню видимости колонок.
///
/// Переключение колонки не закрывает меню; закрывается оно кликом снаружи или Escape.
#[component]
pub(super) fn ColumnMenu(
    menu_id: String,
    #[prop(into)]
    columns: Signal<Vec<ColumnDefinition>>,
    /// accessor видимых колонок
    #[prop(into)]
    visible: Signal<Vec<String>>,
    on_action: Callback<TableAction>,
    metrics: MenuMetrics,
) -> impl IntoView {
    let overlay = use_overlay();
    let menu_id = StoredValue::new(menu_id);
    let placement = RwSignal::new(None::<MenuPlacement>);
    let is_open = move || menu_id.with_value(|id| overlay.is_open(id));

    on_cleanup(move || {
        if let Some(id) = menu_id.try_get_value() {
            overlay.release(&id);
        }
    });

    view! {
        <div class="column-menu">
            <button
                class="button button--secondary"
                aria-haspopup="menu"
                aria-expanded=move || is_open().to_string()
                data-overlay=menu_id.get_value()
                on:click=move |ev| {
                    // строки колонок плюс строка групповых действий
                    let item_count = columns.with_untracked(|c| c.len()) + 1;
                    placement.set(anchor_placement(&ev, item_count, &metrics));
                    menu_id.with_value(|id| overlay.toggle(id));
                }
            >
                {icon("columns")}
                " Колонки"
            </button>
            <Show when=is_open>
                <div
                    class="dropdown-menu"
                    role="menu"
                    data-overlay=menu_id.get_value()
                    style=move || placement.get().map(|p| p.style()).unwrap_or_default()
                >
                    {move || {
                        columns
                            .get()
                            .into_iter()
                            .map(|column| {
                                let accessor = column.accessor.clone();
                                let checked_accessor = column.accessor;
                                view! {
                                    <label class="dropdown-menu__item" role="menuitemcheckbox">
                                        <input
                                            type="checkbox"
                                            prop:checked=move || visible.with(|v| v.contains(&checked_accessor))
                                            on:change=move |_| on_action.run(TableAction::ToggleColumn(accessor.clone()))
                                        />
                                        {column.header}
                                    </label>
                                }
                            })
                            .collect_view()
                    }}
                    <div class="dropdown-menu__actions">
                        <button class="button button--ghost" on:click=move |_| on_action.run(TableAction::ShowAllColumns)>
                            "Все"
                        </button>
                        <button class="button button--ghost" on:click=move |_| on_action.run(TableAction::HideAllColumns)>
                            "Ни одной"
                        </button>
                        <button class="button button--ghost" on:click=move |_| on_action.run(TableAction::RestoreColumns)>
                            "По умолчанию"
                        </button>
                    </div>
                </div>
            </Show>
        </div>
    }
}
