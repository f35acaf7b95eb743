use contracts::shared::data_table::Row;
use leptos::prelude::*;

use super::anchor_placement;
use crate::shared::data_table::{MenuMetrics, MenuPlacement, OverlayEvent};
use crate::shared::icons::icon;
use crate::shared::overlay::use_overlay;

/// Пункт контекстного меню строки
#[derive(Clone)]
pub struct RowAction {
    pub label: String,
    /// Опасное действие (удаление и т.п.) выделяется цветом
    pub danger: bool,
    pub on_select: Callback<Row>,
}

impl RowAction {
    pub fn new(label: impl Into<String>, on_select: impl Fn(Row) + Send + Sync + 'static) -> Self {
        Self {
            label: label.into(),
            danger: false,
            on_select: Callback::new(on_select),
        }
    }

    pub fn danger(mut self) -> Self {
        self.danger = true;
        self
    }
}

#[component]
pub(super) fn RowActionMenu(
    menu_id: String,
    row: Row,
    actions: Vec<RowAction>,
    metrics: MenuMetrics,
) -> impl IntoView {
    let overlay = use_overlay();
    let item_count = actions.len();
    let menu_id = StoredValue::new(menu_id);
    let row = StoredValue::new(row);
    let actions = StoredValue::new(actions);
    let placement = RwSignal::new(None::<MenuPlacement>);
    let is_open = move || menu_id.with_value(|id| overlay.is_open(id));

    on_cleanup(move || {
        if let Some(id) = menu_id.try_get_value() {
            overlay.release(&id);
        }
    });

    view! {
        <div class="row-actions">
            <button
                class="button button--icon"
                title="Действия"
                aria-haspopup="menu"
                aria-expanded=move || is_open().to_string()
                data-overlay=menu_id.get_value()
                on:click=move |ev| {
                    ev.stop_propagation();
                    placement.set(anchor_placement(&ev, item_count, &metrics));
                    menu_id.with_value(|id| overlay.toggle(id));
                }
            >
                {icon("more-vertical")}
            </button>
            <Show when=is_open>
                <div
                    class=move || {
                        if placement.get().is_some_and(|p| p.open_upward) {
                            "dropdown-menu dropdown-menu--up"
                        } else {
                            "dropdown-menu"
                        }
                    }
                    role="menu"
                    data-overlay=menu_id.get_value()
                    style=move || placement.get().map(|p| p.style()).unwrap_or_default()
                >
                    {actions
                        .get_value()
                        .into_iter()
                        .map(|action| {
                            let class = if action.danger {
                                "dropdown-menu__item dropdown-menu__item--danger"
                            } else {
                                "dropdown-menu__item"
                            };
                            let on_select = action.on_select;
                            view! {
                                <button
                                    class=class
                                    role="menuitem"
                                    on:click=move |_| {
                                        overlay.handle(OverlayEvent::ItemActivated);
                                        on_select.run(row.get_value());
                                    }
                                >
                                    {action.label}
                                </button>
                            }
                        })
                        .collect_view()}
                </div>
            </Show>
        </div>
    }
}
