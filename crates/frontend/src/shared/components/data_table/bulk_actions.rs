use leptos::prelude::*;
use thaw::*;

use crate::shared::icons::icon;

/// Панель групповых действий, видна только при непустом выборе
#[component]
pub(super) fn BulkActions(
    #[prop(into)]
    count: Signal<usize>,
    on_clear: Callback<()>,
    on_delete: Option<Callback<()>>,
) -> impl IntoView {
    view! {
        <Show when=move || { count.get() > 0 }>
            <div class="bulk-actions" role="region" aria-live="polite">
                <Badge>{move || format!("Выбрано: {}", count.get())}</Badge>
                {on_delete.map(|delete| view! {
                    <Button
                        appearance=ButtonAppearance::Secondary
                        on_click=move |_| delete.run(())
                    >
                        {icon("trash")}
                        " Удалить"
                    </Button>
                })}
                <Button
                    appearance=ButtonAppearance::Subtle
                    on_click=move |_| on_clear.run(())
                >
                    "Снять выбор"
                </Button>
            </div>
        </Show>
    }
}
