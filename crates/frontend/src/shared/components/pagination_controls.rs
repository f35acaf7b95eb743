use crate::shared::icons::icon;
use contracts::shared::data_table::Meta;
use leptos::prelude::*;

/// Номера страниц для полосы пагинации (1-based).
///
/// Показывает окно вокруг текущей страницы; первая и последняя видны всегда,
/// разрывы обозначаются `None`.
pub fn page_window(current: usize, total: usize, radius: usize) -> Vec<Option<usize>> {
    let total = total.max(1);
    let current = current.clamp(1, total);
    let from = current.saturating_sub(radius).max(1);
    let to = (current + radius).min(total);

    let mut pages = Vec::new();
    if from > 1 {
        pages.push(Some(1));
        if from > 2 {
            pages.push(None);
        }
    }
    pages.extend((from..=to).map(Some));
    if to < total {
        if to + 1 < total {
            pages.push(None);
        }
        pages.push(Some(total));
    }
    pages
}

/// PaginationControls component - reusable pagination controls
///
/// Страницы нумеруются с 1, состояние берётся из [`Meta`] последнего ответа.
#[component]
pub fn PaginationControls(
    #[prop(into)]
    meta: Signal<Meta>,

    /// Current page size
    #[prop(into)]
    page_size: Signal<usize>,

    /// Пока идёт загрузка, навигация заблокирована
    #[prop(optional, into)]
    disabled: Signal<bool>,

    /// Callback when page changes
    on_page_change: Callback<usize>,

    /// Callback when page size changes
    on_page_size_change: Callback<usize>,

    page_size_options: Vec<usize>,
) -> impl IntoView {
    let fallback_size = page_size_options.first().copied().unwrap_or(10);
    let no_prev = move || disabled.get() || !meta.with(|m| m.has_prev);
    let no_next = move || disabled.get() || !meta.with(|m| m.has_next);

    view! {
        <nav class="pagination-controls" aria-label="Пагинация">
            <button
                class="pagination-btn"
                on:click=move |_| on_page_change.run(1)
                disabled=no_prev
                title="Первая страница"
            >
                {icon("chevrons-left")}
            </button>
            <button
                class="pagination-btn"
                on:click=move |_| {
                    let page = meta.with_untracked(|m| m.current_page);
                    on_page_change.run(page.saturating_sub(1).max(1));
                }
                disabled=no_prev
                title="Предыдущая страница"
            >
                {icon("chevron-left")}
            </button>
            {move || {
                let (current, total) = meta.with(|m| (m.current_page, m.total_pages));
                page_window(current, total, 2)
                    .into_iter()
                    .map(|page| match page {
                        Some(page) => view! {
                            <button
                                class=if page == current { "pagination-btn pagination-btn--active" } else { "pagination-btn" }
                                aria-current=if page == current { Some("page") } else { None }
                                disabled=move || disabled.get()
                                on:click=move |_| on_page_change.run(page)
                            >
                                {page.to_string()}
                            </button>
                        }.into_any(),
                        None => view! { <span class="pagination-gap">"…"</span> }.into_any(),
                    })
                    .collect_view()
            }}
            <button
                class="pagination-btn"
                on:click=move |_| {
                    let page = meta.with_untracked(|m| m.current_page);
                    on_page_change.run(page + 1);
                }
                disabled=no_next
                title="Следующая страница"
            >
                {icon("chevron-right")}
            </button>
            <button
                class="pagination-btn"
                on:click=move |_| on_page_change.run(meta.with_untracked(|m| m.total_pages))
                disabled=no_next
                title="Последняя страница"
            >
                {icon("chevrons-right")}
            </button>
            <span class="pagination-info">
                {move || meta.with(|m| format!("{} / {} ({})", m.current_page, m.total_pages.max(1), m.total_items))}
            </span>
            <select
                class="page-size-select"
                aria-label="Строк на странице"
                disabled=move || disabled.get()
                on:change=move |ev| {
                    let val = event_target_value(&ev).parse().unwrap_or(fallback_size);
                    on_page_size_change.run(val);
                }
                prop:value=move || page_size.get().to_string()
            >
                {page_size_options.iter().map(|&size| {
                    view! {
                        <option value=size.to_string() selected=move || page_size.get() == size>
                            {size.to_string()}
                        </option>
                    }
                }).collect_view()}
            </select>
        </nav>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_window_small_total() {
        assert_eq!(page_window(1, 3, 2), vec![Some(1), Some(2), Some(3)]);
        assert_eq!(page_window(1, 0, 2), vec![Some(1)]);
    }

    #[test]
    fn test_page_window_gaps() {
        assert_eq!(
            page_window(6, 20, 1),
            vec![Some(1), None, Some(5), Some(6), Some(7), None, Some(20)]
        );
        // соседняя с краем страница не даёт разрыва
        assert_eq!(
            page_window(3, 5, 1),
            vec![Some(1), Some(2), Some(3), Some(4), Some(5)]
        );
    }

    #[test]
    fn test_page_window_clamps_current() {
        assert_eq!(page_window(9, 4, 1), vec![Some(1), None, Some(3), Some(4)]);
    }
}
