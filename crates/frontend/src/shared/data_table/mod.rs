//! Логика табличного контроллера без привязки к DOM.
//!
//! Компоненты из `shared::components::data_table` хранят [`TableState`] в сигнале
//! и меняют его только через [`TableState::dispatch`].

pub mod columns;
pub mod config;
pub mod export;
pub mod menu;
pub mod params;
pub mod selection;
pub mod sort;
pub mod state;

pub use columns::{ColumnConfigError, ColumnDefinition, ColumnRegistry};
pub use config::DataTableConfig;
pub use export::{ExportError, ExportFormat, ExportRequest, ExportScope};
pub use menu::{MenuMetrics, MenuPlacement, OverlayEvent, OverlayState, Rect, Viewport};
pub use selection::{RowId, RowIdentity, SelectionManager, SelectionState};
pub use sort::{SortController, SortState};
pub use state::{FetchRequest, LoadStatus, ReceiveOutcome, TableAction, TableState, Transition};
