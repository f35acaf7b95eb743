//! Единый на приложение менеджер всплывающих меню.
//!
//! Открыто не более одного меню. Слушатели `keydown`/`mousedown` на document
//! вешаются при открытии и снимаются при закрытии.
//!
//! Кнопка и само меню помечаются атрибутом `data-overlay="<id>"`: клик внутри
//! помеченных элементов не считается кликом снаружи.

use gloo_timers::callback::Timeout;
use leptos::prelude::*;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Element, KeyboardEvent, MouseEvent};

use crate::shared::data_table::menu::{is_inside_overlay, OverlayEvent, OverlayState};

struct DocumentListeners {
    keydown: Closure<dyn FnMut(KeyboardEvent)>,
    mousedown: Closure<dyn FnMut(MouseEvent)>,
}

#[derive(Clone, Copy)]
pub struct OverlayService {
    state: RwSignal<OverlayState>,
    listeners: StoredValue<Option<DocumentListeners>, LocalStorage>,
}

impl OverlayService {
    pub fn new() -> Self {
        Self {
            state: RwSignal::new(OverlayState::default()),
            listeners: StoredValue::new_local(None),
        }
    }

    pub fn is_open(&self, id: &str) -> bool {
        self.state.with(|s| s.is_open(id))
    }

    pub fn open(&self, id: &str) {
        self.state.update(|s| {
            s.open(id);
        });
        self.sync_listeners();
    }

    pub fn toggle(&self, id: &str) {
        self.state.update(|s| s.toggle(id));
        self.sync_listeners();
    }

    pub fn close(&self) {
        self.handle(OverlayEvent::ItemActivated);
    }

    /// Закрывает меню, только если открыто именно оно (при размонтировании владельца)
    pub fn release(&self, id: &str) {
        if self.state.with_untracked(|s| s.is_open(id)) {
            self.close();
        }
    }

    pub fn handle(&self, event: OverlayEvent) {
        if self.state.with_untracked(|s| s.active().is_none()) {
            return;
        }
        self.state.update(|s| {
            s.handle(event);
        });
        self.sync_listeners();
    }

    fn sync_listeners(&self) {
        let active = self.state.with_untracked(|s| s.active().is_some());
        let attached = self.listeners.with_value(|l| l.is_some());
        match (active, attached) {
            (true, false) => self.attach(),
            (false, true) => self.detach(),
            _ => {}
        }
    }

    fn attach(&self) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let svc = *self;

        let keydown = Closure::wrap(Box::new(move |event: KeyboardEvent| {
            if event.key() == "Escape" {
                svc.handle(OverlayEvent::Escape);
            }
        }) as Box<dyn FnMut(KeyboardEvent)>);

        let mousedown = Closure::wrap(Box::new(move |event: MouseEvent| {
            let Some(active) = svc.state.with_untracked(|s| s.active().map(str::to_string))
            else {
                return;
            };
            let target = event.target().and_then(|t| t.dyn_into::<Element>().ok());
            let markers = std::iter::successors(target, |el| el.parent_element())
                .map(|el| el.get_attribute("data-overlay"));
            let inside = is_inside_overlay(&active, markers);
            if !inside {
                svc.handle(OverlayEvent::OutsideClick);
            }
        }) as Box<dyn FnMut(MouseEvent)>);

        let _ = document
            .add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref());
        let _ = document
            .add_event_listener_with_callback("mousedown", mousedown.as_ref().unchecked_ref());

        self.listeners.set_value(Some(DocumentListeners { keydown, mousedown }));
    }

    fn detach(&self) {
        let mut taken = None;
        self.listeners.update_value(|l| taken = l.take());
        let Some(listeners) = taken else {
            return;
        };
        if let Some(document) = web_sys::window().and_then(|w| w.document()) {
            let _ = document.remove_event_listener_with_callback(
                "keydown",
                listeners.keydown.as_ref().unchecked_ref(),
            );
            let _ = document.remove_event_listener_with_callback(
                "mousedown",
                listeners.mousedown.as_ref().unchecked_ref(),
            );
        }
        // detach может вызываться из самого слушателя: освобождаем замыкания на следующем тике
        Timeout::new(0, move || drop(listeners)).forget();
    }
}

impl Default for OverlayService {
    fn default() -> Self {
        Self::new()
    }
}

pub fn use_overlay() -> OverlayService {
    use_context::<OverlayService>()
        .expect("OverlayService not provided in context (provide it in app root)")
}
