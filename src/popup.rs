//! Floating panel placement.
//!
//! [`place`] is the pure layout function. [`ViewportWatcher`] and
//! [`PopupTracker`] wire it to resize / scroll notifications: a tracker holds
//! a subscription only while it is alive.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::config::{MOBILE_BREAKPOINT, POPUP_MARGIN};

/// Trigger rectangle relative to the visible viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub scroll_x: f64,
    #[serde(default)]
    pub scroll_y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Positioning {
    /// Relative to the viewport; used for the mobile sheet.
    Fixed,
    /// Relative to the document.
    Absolute,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    pub position: Positioning,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<f64>,
    pub max_width: f64,
    pub max_height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementOptions {
    pub margin: f64,
    pub mobile_breakpoint: f64,
}

impl Default for PlacementOptions {
    fn default() -> Self {
        Self {
            margin: POPUP_MARGIN,
            mobile_breakpoint: MOBILE_BREAKPOINT,
        }
    }
}

pub fn place(
    trigger: Option<BoundingBox>,
    desired: Size,
    viewport: Viewport,
    options: PlacementOptions,
) -> Placement {
    let margin = options.margin;
    let width = desired.width.min(viewport.width - 2.0 * margin).max(0.0);
    let height = desired.height.min(viewport.height - 2.0 * margin).max(0.0);

    if viewport.width < options.mobile_breakpoint {
        return Placement {
            position: Positioning::Fixed,
            top: Some(margin),
            left: Some(margin),
            right: Some(margin),
            bottom: Some(margin),
            max_width: (viewport.width - 2.0 * margin).max(0.0),
            max_height: (viewport.height - 2.0 * margin).max(0.0),
        };
    }

    let (top, left) = match trigger {
        Some(trigger) => {
            let top = anchor_vertical(&trigger, height, viewport.height, margin);
            let left = anchor_horizontal(&trigger, width, viewport.width, margin);
            (
                viewport.scroll_y + keep_inside(top, height, margin, viewport.height - margin),
                viewport.scroll_x + keep_inside(left, width, margin, viewport.width - margin),
            )
        }
        None => {
            let top = viewport.scroll_y + (viewport.height - height) / 2.0;
            let left = viewport.scroll_x + (viewport.width - width) / 2.0;
            (
                keep_inside(
                    top,
                    height,
                    viewport.scroll_y + margin,
                    viewport.scroll_y + viewport.height - margin,
                ),
                keep_inside(
                    left,
                    width,
                    viewport.scroll_x + margin,
                    viewport.scroll_x + viewport.width - margin,
                ),
            )
        }
    };

    Placement {
        position: Positioning::Absolute,
        top: Some(top),
        left: Some(left),
        right: None,
        bottom: None,
        max_width: width,
        max_height: height,
    }
}

// Below the trigger, then above it, then pinned to the top edge.
fn anchor_vertical(trigger: &BoundingBox, height: f64, viewport_height: f64, margin: f64) -> f64 {
    let space_below = viewport_height - trigger.bottom();
    let space_above = trigger.top;
    if space_below >= height + margin {
        trigger.bottom()
    } else if space_above >= height + margin {
        trigger.top - height
    } else {
        margin
    }
}

// Growing rightwards from the trigger, then ending at its right edge, then
// pinned to the left edge.
fn anchor_horizontal(trigger: &BoundingBox, width: f64, viewport_width: f64, margin: f64) -> f64 {
    let space_right = viewport_width - trigger.left;
    let space_left = trigger.right();
    if space_right >= width + margin {
        trigger.left
    } else if space_left >= width + margin {
        trigger.right() - width
    } else {
        margin
    }
}

/// Pulls a span back from the far edge, then forward from the near edge.
/// The near edge wins when both are violated.
fn keep_inside(start: f64, size: f64, near: f64, far: f64) -> f64 {
    let mut start = start;
    if start + size > far {
        start = far - size;
    }
    if start < near {
        start = near;
    }
    start
}

/// Publishes the current viewport to every open popup.
#[derive(Debug)]
pub struct ViewportWatcher {
    tx: watch::Sender<Viewport>,
}

impl ViewportWatcher {
    pub fn new(initial: Viewport) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Called on resize and scroll.
    pub fn update(&self, viewport: Viewport) {
        self.tx.send_replace(viewport);
    }

    pub fn current(&self) -> Viewport {
        *self.tx.borrow()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn track(
        &self,
        trigger: Option<BoundingBox>,
        desired: Size,
        options: PlacementOptions,
    ) -> PopupTracker {
        PopupTracker {
            rx: self.tx.subscribe(),
            trigger,
            desired,
            options,
        }
    }
}

/// An open popup. Recomputes its placement from the latest viewport and
/// unsubscribes when dropped.
#[derive(Debug)]
pub struct PopupTracker {
    rx: watch::Receiver<Viewport>,
    trigger: Option<BoundingBox>,
    desired: Size,
    options: PlacementOptions,
}

impl PopupTracker {
    pub fn placement(&mut self) -> Placement {
        let viewport = *self.rx.borrow_and_update();
        place(self.trigger, self.desired, viewport, self.options)
    }

    /// The trigger moves relative to the viewport when the page scrolls.
    pub fn set_trigger(&mut self, trigger: Option<BoundingBox>) {
        self.trigger = trigger;
    }

    /// Waits for the next viewport change. `None` once the watcher is gone.
    pub async fn next_placement(&mut self) -> Option<Placement> {
        self.rx.changed().await.ok()?;
        Some(self.placement())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desktop() -> Viewport {
        Viewport {
            width: 1280.0,
            height: 800.0,
            scroll_x: 0.0,
            scroll_y: 0.0,
        }
    }

    fn size(width: f64, height: f64) -> Size {
        Size { width, height }
    }

    fn trigger(top: f64, left: f64) -> BoundingBox {
        BoundingBox {
            top,
            left,
            width: 120.0,
            height: 32.0,
        }
    }

    fn assert_contained(placement: &Placement, viewport: Viewport, margin: f64) {
        let (origin_x, origin_y) = match placement.position {
            Positioning::Fixed => (viewport.scroll_x, viewport.scroll_y),
            Positioning::Absolute => (0.0, 0.0),
        };
        let top = origin_y + placement.top.unwrap();
        let left = origin_x + placement.left.unwrap();
        let eps = 1e-9;
        assert!(left >= viewport.scroll_x + margin - eps, "{placement:?}");
        assert!(top >= viewport.scroll_y + margin - eps, "{placement:?}");
        assert!(
            left + placement.max_width <= viewport.scroll_x + viewport.width - margin + eps,
            "{placement:?}"
        );
        assert!(
            top + placement.max_height <= viewport.scroll_y + viewport.height - margin + eps,
            "{placement:?}"
        );
    }

    #[test]
    fn mobile_ignores_trigger() {
        let viewport = Viewport {
            width: 375.0,
            height: 667.0,
            scroll_x: 0.0,
            scroll_y: 120.0,
        };
        let placement = place(
            Some(trigger(50.0, 50.0)),
            size(500.0, 300.0),
            viewport,
            PlacementOptions::default(),
        );
        assert_eq!(placement.position, Positioning::Fixed);
        assert_eq!(placement.top, Some(20.0));
        assert_eq!(placement.left, Some(20.0));
        assert_eq!(placement.right, Some(20.0));
        assert_eq!(placement.bottom, Some(20.0));
        assert_eq!(placement.max_width, 335.0);
        assert_eq!(placement.max_height, 627.0);
    }

    #[test]
    fn prefers_below_and_right_of_trigger() {
        let placement = place(
            Some(trigger(100.0, 200.0)),
            size(300.0, 200.0),
            desktop(),
            PlacementOptions::default(),
        );
        assert_eq!(placement.top, Some(132.0));
        assert_eq!(placement.left, Some(200.0));
    }

    #[test]
    fn flips_above_and_left_when_cramped() {
        let placement = place(
            Some(trigger(700.0, 1100.0)),
            size(300.0, 200.0),
            desktop(),
            PlacementOptions::default(),
        );
        assert_eq!(placement.top, Some(500.0));
        assert_eq!(placement.left, Some(920.0));
    }

    #[test]
    fn overflowing_trigger_is_pulled_back_inside() {
        let placement = place(
            Some(trigger(100.0, 1200.0)),
            size(300.0, 200.0),
            desktop(),
            PlacementOptions::default(),
        );
        assert_eq!(placement.left, Some(960.0));
    }

    #[test]
    fn pins_when_neither_side_fits() {
        let viewport = Viewport {
            width: 800.0,
            height: 400.0,
            scroll_x: 0.0,
            scroll_y: 0.0,
        };
        let placement = place(
            Some(trigger(150.0, 300.0)),
            size(700.0, 300.0),
            viewport,
            PlacementOptions::default(),
        );
        assert_eq!(placement.top, Some(20.0));
        assert_eq!(placement.left, Some(20.0));
        assert_eq!(placement.max_height, 300.0);
    }

    #[test]
    fn adds_scroll_offsets_for_document_position() {
        let viewport = Viewport {
            scroll_y: 1000.0,
            scroll_x: 10.0,
            ..desktop()
        };
        let placement = place(
            Some(trigger(100.0, 200.0)),
            size(300.0, 200.0),
            viewport,
            PlacementOptions::default(),
        );
        assert_eq!(placement.top, Some(1132.0));
        assert_eq!(placement.left, Some(210.0));
    }

    #[test]
    fn centers_in_visible_viewport_without_trigger() {
        let viewport = Viewport {
            scroll_y: 500.0,
            ..desktop()
        };
        let placement = place(None, size(400.0, 200.0), viewport, PlacementOptions::default());
        assert_eq!(placement.left, Some(440.0));
        assert_eq!(placement.top, Some(800.0));
        assert_contained(&placement, viewport, 20.0);
    }

    #[test]
    fn oversized_popup_is_clamped_to_viewport() {
        let placement = place(None, size(5000.0, 5000.0), desktop(), PlacementOptions::default());
        assert_eq!(placement.max_width, 1240.0);
        assert_eq!(placement.max_height, 760.0);
        assert_eq!(placement.left, Some(20.0));
        assert_eq!(placement.top, Some(20.0));
    }

    #[test]
    fn zero_viewport_gives_zero_placement() {
        let placement = place(
            None,
            size(300.0, 300.0),
            Viewport::default(),
            PlacementOptions {
                margin: 0.0,
                mobile_breakpoint: 0.0,
            },
        );
        assert_eq!(placement.max_width, 0.0);
        assert_eq!(placement.max_height, 0.0);
    }

    #[test]
    fn every_placement_stays_inside_the_margins() {
        let options = PlacementOptions::default();
        let viewports = [
            Viewport {
                width: 375.0,
                height: 640.0,
                scroll_x: 0.0,
                scroll_y: 300.0,
            },
            Viewport {
                width: 768.0,
                height: 400.0,
                scroll_x: 0.0,
                scroll_y: 0.0,
            },
            Viewport {
                width: 1440.0,
                height: 900.0,
                scroll_x: 35.0,
                scroll_y: 2400.0,
            },
        ];
        let sizes = [size(100.0, 80.0), size(480.0, 360.0), size(2000.0, 1200.0)];

        for viewport in viewports {
            for desired in sizes {
                assert_contained(&place(None, desired, viewport, options), viewport, 20.0);
                for top in [-200.0, 0.0, 180.0, viewport.height - 10.0, viewport.height + 50.0] {
                    for left in [-50.0, 0.0, 300.0, viewport.width - 40.0] {
                        let placement = place(Some(trigger(top, left)), desired, viewport, options);
                        assert_contained(&placement, viewport, 20.0);
                    }
                }
            }
        }
    }

    #[tokio::test]
    async fn tracker_follows_viewport_and_releases_on_drop() {
        let watcher = ViewportWatcher::new(desktop());
        let mut tracker = watcher.track(None, size(400.0, 200.0), PlacementOptions::default());
        assert_eq!(watcher.subscriber_count(), 1);
        assert_eq!(tracker.placement().top, Some(300.0));

        watcher.update(Viewport {
            scroll_y: 100.0,
            ..desktop()
        });
        let moved = tracker.next_placement().await.unwrap();
        assert_eq!(moved.top, Some(400.0));

        drop(tracker);
        assert_eq!(watcher.subscriber_count(), 0);
        assert_eq!(watcher.current().scroll_y, 100.0);
    }

    #[tokio::test]
    async fn tracker_follows_a_trigger_moved_by_scrolling() {
        let watcher = ViewportWatcher::new(desktop());
        let mut tracker = watcher.track(
            Some(trigger(100.0, 200.0)),
            size(300.0, 200.0),
            PlacementOptions::default(),
        );
        assert_eq!(tracker.placement().top, Some(132.0));

        watcher.update(Viewport {
            scroll_y: 60.0,
            ..desktop()
        });
        tracker.set_trigger(Some(trigger(40.0, 200.0)));
        let moved = tracker.next_placement().await.unwrap();
        // Same document position: the trigger moved up by the scrolled amount.
        assert_eq!(moved.top, Some(132.0));
        assert_eq!(moved.left, Some(200.0));

        tracker.set_trigger(None);
        assert_eq!(tracker.placement().top, Some(360.0));
    }

    #[tokio::test]
    async fn tracker_stops_when_watcher_is_gone() {
        let watcher = ViewportWatcher::new(desktop());
        let mut tracker = watcher.track(None, size(10.0, 10.0), PlacementOptions::default());
        drop(watcher);
        assert!(tracker.next_placement().await.is_none());
    }
}
