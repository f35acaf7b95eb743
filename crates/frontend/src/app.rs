use crate::records::ui::list::RecordsListPage;
use crate::shared::overlay::OverlayService;
use leptos::prelude::*;
use thaw::ConfigProvider;

#[component]
pub fn App() -> impl IntoView {
    // Одно всплывающее меню на всё приложение
    provide_context(OverlayService::new());

    view! {
        <ConfigProvider>
            <RecordsListPage />
        </ConfigProvider>
    }
}
