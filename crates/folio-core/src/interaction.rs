//! Pointer interaction states for the editor
//!
//! Only one interaction runs at a time:
//!
//! ```text
//! Idle ── begin_drag ──▶ Dragging ── drop / cancel ──▶ Idle
//! Idle ── begin_resize ─▶ Resizing ── pointer up ────▶ Idle
//! ```

use serde::{Deserialize, Serialize};

use crate::item_ref::ItemRef;
use crate::portfolio::ItemSize;
use crate::project::clamp_size;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pointer {
    pub x: f64,
    pub y: f64,
}

impl Pointer {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Which list a drag reorders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragList {
    Items,
    Stats,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Interaction {
    #[default]
    Idle,
    Dragging {
        list: DragList,
        source: usize,
        /// Index currently hovered, for drop indicators
        over: Option<usize>,
    },
    Resizing {
        item: ItemRef,
        start: Pointer,
        start_width: f64,
        start_height: f64,
    },
}

impl Interaction {
    pub fn is_idle(&self) -> bool {
        matches!(self, Interaction::Idle)
    }

    /// Size a resize should write for the given pointer position
    pub fn resize_target(&self, pointer: Pointer) -> Option<(ItemRef, ItemSize)> {
        match *self {
            Interaction::Resizing {
                item,
                start,
                start_width,
                start_height,
            } => {
                let size = ItemSize::new(
                    start_width + (pointer.x - start.x),
                    start_height + (pointer.y - start.y),
                );
                Some((item, clamp_size(item, size)))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::StatId;

    #[test]
    fn test_resize_target_applies_delta_and_floor() {
        let resizing = Interaction::Resizing {
            item: ItemRef::Repo(1),
            start: Pointer::new(100.0, 100.0),
            start_width: 300.0,
            start_height: 200.0,
        };

        let (_, grown) = resizing.resize_target(Pointer::new(150.0, 90.0)).unwrap();
        assert_eq!(grown, ItemSize::new(350.0, 190.0));

        let (_, collapsed) = resizing.resize_target(Pointer::new(-500.0, -500.0)).unwrap();
        assert_eq!(collapsed, ItemSize::new(150.0, 100.0));
    }

    #[test]
    fn test_stat_floor_is_smaller() {
        let resizing = Interaction::Resizing {
            item: ItemRef::Stat(StatId::Repos),
            start: Pointer::default(),
            start_width: 120.0,
            start_height: 90.0,
        };
        let (_, size) = resizing.resize_target(Pointer::new(-100.0, -100.0)).unwrap();
        assert_eq!(size, ItemSize::new(100.0, 80.0));
    }

    #[test]
    fn test_idle_has_no_target() {
        assert!(Interaction::Idle.resize_target(Pointer::default()).is_none());
        assert!(Interaction::default().is_idle());
    }
}
