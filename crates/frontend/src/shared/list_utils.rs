/// Утилиты для списков: поле поиска с debounce и индикаторы сортировки
use gloo_timers::callback::Timeout;
use leptos::prelude::*;

use crate::shared::data_table::SortState;
use contracts::shared::data_table::MIN_SEARCH_LEN;

/// Компонент поиска с debounce и кнопкой очистки
///
/// `on_change` вызывается только после паузы ввода `debounce_ms`.
/// Очистка применяется сразу.
#[component]
pub fn SearchInput(
    /// Значение, применённое таблицей
    #[prop(into)]
    value: Signal<String>,
    #[prop(into)]
    on_change: Callback<String>,
    #[prop(optional, into)]
    placeholder: String,
    #[prop(optional, default = 300)]
    debounce_ms: u32,
) -> impl IntoView {
    let placeholder = if placeholder.is_empty() {
        format!("Поиск (мин. {} символа)...", MIN_SEARCH_LEN)
    } else {
        placeholder
    };

    // Локальное состояние для input (до debounce)
    let input_value = RwSignal::new(value.get_untracked());
    let pending = StoredValue::new_local(None::<Timeout>);

    let handle_input_change = move |new_value: String| {
        input_value.set(new_value.clone());
        // Drop предыдущего Timeout отменяет его
        let timeout = Timeout::new(debounce_ms, move || {
            on_change.run(new_value);
        });
        pending.set_value(Some(timeout));
    };

    let clear_filter = move |_| {
        pending.set_value(None);
        input_value.set(String::new());
        on_change.run(String::new());
    };

    on_cleanup(move || {
        pending.try_update_value(|p| *p = None);
    });

    let is_filter_active = move || value.get().trim().chars().count() >= MIN_SEARCH_LEN;

    view! {
        <div class="search-input" style="position: relative; display: inline-flex; align-items: center;">
            <input
                type="text"
                placeholder=placeholder
                aria-label="Поиск"
                style=move || format!(
                    "width: 250px; padding: 6px 32px 6px 10px; border: 1px solid #ddd; border-radius: 4px; font-size: 15px; background: {};",
                    if is_filter_active() { "#fffbea" } else { "white" }
                )
                prop:value=move || input_value.get()
                on:input=move |ev| handle_input_change(event_target_value(&ev))
            />
            <Show when=move || !input_value.get().is_empty()>
                <button
                    style="position: absolute; right: 6px; background: none; border: none; cursor: pointer; padding: 4px; display: inline-flex; align-items: center; color: #666; line-height: 1;"
                    on:click=clear_filter
                    title="Очистить"
                >
                    {crate::shared::icons::icon("x")}
                </button>
            </Show>
        </div>
    }
}

/// Получить индикатор сортировки для заголовка
pub fn get_sort_indicator(sort: &SortState, field: &str) -> &'static str {
    if sort.is_sorted_by(field) {
        if sort.direction.is_ascending() {
            " ▲"
        } else {
            " ▼"
        }
    } else {
        " ⇅"
    }
}

pub fn get_sort_class(sort: &SortState, field: &str) -> &'static str {
    if sort.is_sorted_by(field) {
        "table__sort-indicator table__sort-indicator--active"
    } else {
        "table__sort-indicator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::shared::data_table::SortDirection;

    #[test]
    fn test_sort_indicator() {
        let sort = SortState {
            key: Some("name".to_string()),
            direction: SortDirection::Desc,
        };
        assert_eq!(get_sort_indicator(&sort, "name"), " ▼");
        assert_eq!(get_sort_indicator(&sort, "email"), " ⇅");
        assert_eq!(get_sort_indicator(&SortState::default(), "name"), " ⇅");
    }

    #[test]
    fn test_sort_class_marks_active_column() {
        let sort = SortState {
            key: Some("name".to_string()),
            direction: SortDirection::Asc,
        };
        assert!(get_sort_class(&sort, "name").ends_with("--active"));
        assert_eq!(get_sort_class(&sort, "email"), "table__sort-indicator");
    }
}
