use crate::shared::icons::icon;
use leptos::ev;
use leptos::prelude::*;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::KeyboardEvent;

#[component]
pub fn Modal(
    /// Title of the modal
    #[prop(into)]
    title: String,
    /// Callback when modal should close
    on_close: Callback<()>,
    /// Modal content
    children: Children,
) -> impl IntoView {
    // Escape закрывает окно; слушатель снимается при размонтировании
    let keydown = Closure::wrap(Box::new(move |event: KeyboardEvent| {
        if event.key() == "Escape" {
            on_close.run(());
        }
    }) as Box<dyn FnMut(KeyboardEvent)>);
    if let Some(window) = web_sys::window() {
        let _ = window.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref());
    }
    let keydown = StoredValue::new_local(Some(keydown));

    on_cleanup(move || {
        let Some(Some(closure)) = keydown.try_update_value(|k| k.take()) else {
            return;
        };
        if let Some(window) = web_sys::window() {
            let _ = window
                .remove_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        }
    });

    // Prevent click propagation from modal content
    let stop_propagation = move |ev: ev::MouseEvent| {
        ev.stop_propagation();
    };

    view! {
        <div class="modal-overlay" on:click=move |_| on_close.run(())>
            <div class="modal" role="dialog" aria-modal="true" on:click=stop_propagation>
                <div class="modal-header">
                    <h2 class="modal-title">{title}</h2>
                    <div class="modal-header-actions">
                        <button
                            class="button button--icon modal__close"
                            aria-label="Закрыть"
                            on:click=move |_| on_close.run(())
                        >
                            {icon("x")}
                        </button>
                    </div>
                </div>
                <div class="modal-body">
                    {children()}
                </div>
            </div>
        </div>
    }
}
