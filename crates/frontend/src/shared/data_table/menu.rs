//! Размещение контекстного меню в пределах окна и его состояние

/// Прямоугольник в координатах окна (как у `getBoundingClientRect`)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

impl Rect {
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            bottom: top + height,
            right: left + width,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

/// Размеры меню, по которым оценивается его высота
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MenuMetrics {
    pub row_height: f64,
    pub padding: f64,
    pub width: f64,
    /// Отступ между кнопкой и меню
    pub gap: f64,
}

impl Default for MenuMetrics {
    fn default() -> Self {
        Self {
            row_height: 36.0,
            padding: 8.0,
            width: 200.0,
            gap: 4.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MenuPlacement {
    pub top: f64,
    pub left: f64,
    pub open_upward: bool,
}

impl MenuPlacement {
    pub fn style(&self) -> String {
        format!(
            "position: fixed; top: {}px; left: {}px;",
            self.top.round(),
            self.left.round()
        )
    }
}

pub fn estimated_height(item_count: usize, metrics: &MenuMetrics) -> f64 {
    item_count as f64 * metrics.row_height + metrics.padding
}

/// Вверх меню открывается, только если снизу не помещается меню вместе с отступом
/// и сверху места больше, чем снизу.
/// Правый край меню совпадает с правым краем кнопки, но не уходит левее 0.
pub fn position(
    trigger: &Rect,
    item_count: usize,
    viewport: &Viewport,
    metrics: &MenuMetrics,
) -> MenuPlacement {
    let height = estimated_height(item_count, metrics);
    let space_below = viewport.height - trigger.bottom;
    let space_above = trigger.top;
    let open_upward = space_below < height + metrics.gap && space_above > space_below;

    let top = if open_upward {
        (trigger.top - height - metrics.gap).max(0.0)
    } else {
        trigger.bottom + metrics.gap
    };
    let left = (trigger.right - metrics.width).max(0.0);

    MenuPlacement {
        top,
        left,
        open_upward,
    }
}

/// Id меню строки строится из позиции на странице, данные строки в него не попадают
pub fn row_menu_id(prefix: &str, index: usize) -> String {
    format!("{}-row-{}", prefix, index)
}

/// Клик внутри открытого меню: у цели или у одного из её предков
/// `data-overlay` равен id меню. Значения сравниваются как строки, без селекторов.
pub fn is_inside_overlay<I>(active: &str, markers: I) -> bool
where
    I: IntoIterator<Item = Option<String>>,
{
    markers
        .into_iter()
        .any(|marker| marker.as_deref() == Some(active))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayEvent {
    OutsideClick,
    Escape,
    ItemActivated,
}

/// Не более одного открытого всплывающего меню на всё приложение
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayState {
    active: Option<String>,
}

impl OverlayState {
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn is_open(&self, id: &str) -> bool {
        self.active.as_deref() == Some(id)
    }

    /// Открывает меню, закрывая предыдущее. Возвращает закрытое меню.
    pub fn open(&mut self, id: &str) -> Option<String> {
        let previous = self.active.take().filter(|prev| prev != id);
        self.active = Some(id.to_string());
        previous
    }

    /// Клик по кнопке меню: открыть или закрыть то же самое
    pub fn toggle(&mut self, id: &str) {
        if self.is_open(id) {
            self.active = None;
        } else {
            self.open(id);
        }
    }

    pub fn close(&mut self) -> Option<String> {
        self.active.take()
    }

    /// Любое из событий закрывает открытое меню
    pub fn handle(&mut self, event: OverlayEvent) -> Option<String> {
        match event {
            OverlayEvent::OutsideClick | OverlayEvent::Escape | OverlayEvent::ItemActivated => {
                self.close()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Viewport = Viewport {
        width: 1280.0,
        height: 800.0,
    };

    #[test]
    fn test_opens_downward_when_space_below() {
        let trigger = Rect::new(100.0, 900.0, 32.0, 32.0);
        let placement = position(&trigger, 4, &VIEWPORT, &MenuMetrics::default());
        assert!(!placement.open_upward);
        assert_eq!(placement.top, 136.0);
        assert_eq!(placement.left, 932.0 - 200.0);
    }

    #[test]
    fn test_opens_upward_near_bottom() {
        let trigger = Rect::new(760.0, 900.0, 32.0, 32.0);
        let placement = position(&trigger, 4, &VIEWPORT, &MenuMetrics::default());
        assert!(placement.open_upward);
        // 4 * 36 + 8 = 152
        assert_eq!(placement.top, 760.0 - 152.0 - 4.0);
    }

    #[test]
    fn test_stays_downward_when_above_is_smaller() {
        // снизу мало места, но сверху ещё меньше
        let viewport = Viewport {
            width: 800.0,
            height: 200.0,
        };
        let trigger = Rect::new(60.0, 10.0, 32.0, 32.0);
        let placement = position(&trigger, 5, &viewport, &MenuMetrics::default());
        assert!(!placement.open_upward);
    }

    #[test]
    fn test_gap_counts_towards_space_below() {
        // 152 для меню + 4 отступ: при 154 снизу меню не помещается
        let viewport = Viewport {
            width: 1280.0,
            height: 800.0,
        };
        let trigger = Rect::new(614.0, 900.0, 32.0, 32.0);
        let placement = position(&trigger, 4, &viewport, &MenuMetrics::default());
        assert!(placement.open_upward);

        let trigger = Rect::new(612.0, 900.0, 32.0, 32.0);
        let placement = position(&trigger, 4, &viewport, &MenuMetrics::default());
        assert!(!placement.open_upward);
        assert!(placement.top + 152.0 <= viewport.height);
    }

    #[test]
    fn test_left_is_clamped_at_zero() {
        let trigger = Rect::new(100.0, 10.0, 32.0, 32.0);
        let placement = position(&trigger, 2, &VIEWPORT, &MenuMetrics::default());
        assert_eq!(placement.left, 0.0);
    }

    #[test]
    fn test_inside_overlay_matches_exact_marker() {
        let active = r#"dt-1-row-{"name":"a \"b\""}"#;
        let chain = vec![None, Some("other".to_string()), Some(active.to_string()), None];
        assert!(is_inside_overlay(active, chain));

        let chain = vec![None, Some("dt-1-row-{".to_string())];
        assert!(!is_inside_overlay(active, chain));
        assert!(!is_inside_overlay(active, Vec::<Option<String>>::new()));
    }

    #[test]
    fn test_row_menu_id_uses_position() {
        assert_eq!(row_menu_id("dt-abc", 0), "dt-abc-row-0");
        assert_ne!(row_menu_id("dt-abc", 1), row_menu_id("dt-abc", 2));
    }

    #[test]
    fn test_only_one_menu_open() {
        let mut overlay = OverlayState::default();
        assert_eq!(overlay.open("row-1"), None);
        assert_eq!(overlay.open("columns"), Some("row-1".to_string()));
        assert!(overlay.is_open("columns"));
        assert!(!overlay.is_open("row-1"));
    }

    #[test]
    fn test_close_events() {
        for event in [
            OverlayEvent::OutsideClick,
            OverlayEvent::Escape,
            OverlayEvent::ItemActivated,
        ] {
            let mut overlay = OverlayState::default();
            overlay.open("row-1");
            assert_eq!(overlay.handle(event), Some("row-1".to_string()));
            assert_eq!(overlay.active(), None);
        }

        let mut overlay = OverlayState::default();
        overlay.toggle("row-1");
        overlay.toggle("row-1");
        assert_eq!(overlay.active(), None);
    }
}
