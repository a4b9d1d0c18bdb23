//! Pointer-driven move/resize state machine.
//!
//! [`DragResizeController`] turns pointer samples into geometry updates for exactly one window at
//! a time. Time is supplied by the caller in milliseconds so the controller stays deterministic.

use desktop_sync_contract::{
    Point, Size, WindowId, WindowPatch, MIN_WINDOW_HEIGHT, MIN_WINDOW_WIDTH,
};

use crate::model::PointerPosition;

/// Default minimum spacing between two geometry sends during one interaction.
pub const DEFAULT_MIN_SEND_INTERVAL_MS: u64 = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Current phase of the controller.
pub enum InteractionPhase {
    /// No pointer interaction in progress.
    Idle,
    /// A window header is being dragged.
    Dragging {
        /// Window being moved.
        window_id: WindowId,
        /// Pointer minus window top-left at press time.
        anchor: Point,
        /// Latest computed top-left corner.
        position: Point,
    },
    /// A window resize handle is being dragged.
    Resizing {
        /// Window being resized.
        window_id: WindowId,
        /// Pointer position at press time.
        pointer_start: PointerPosition,
        /// Window size at press time.
        start: Size,
        /// Latest computed (clamped) size.
        size: Size,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Geometry change produced by an interaction.
pub enum GeometryUpdate {
    /// New top-left corner.
    Move {
        /// Window being moved.
        window_id: WindowId,
        /// New position.
        position: Point,
    },
    /// New dimensions.
    Resize {
        /// Window being resized.
        window_id: WindowId,
        /// New size, already clamped to the minimum.
        size: Size,
    },
}

impl GeometryUpdate {
    /// Returns the target window.
    pub fn window_id(&self) -> &WindowId {
        match self {
            Self::Move { window_id, .. } | Self::Resize { window_id, .. } => window_id,
        }
    }

    /// Converts the update into a gateway patch carrying one complete geometry pair.
    pub fn into_patch(self) -> (WindowId, WindowPatch) {
        match self {
            Self::Move {
                window_id,
                position,
            } => (window_id, WindowPatch::position(position)),
            Self::Resize { window_id, size } => (window_id, WindowPatch::size(size)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Side effects requested by the controller.
pub enum InteractionEffect {
    /// Start listening for global pointer-move/pointer-release events.
    AcquirePointerListeners,
    /// Stop listening for global pointer events.
    ReleasePointerListeners,
    /// Deliver a geometry update to the gateway.
    Send(GeometryUpdate),
    /// Call [`DragResizeController::flush_due`] after `delay_ms` so a held sample is not stranded
    /// while the pointer rests.
    ScheduleFlush {
        /// Milliseconds until the held sample may be sent.
        delay_ms: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Exclusive pointer interaction state machine with send coalescing.
pub struct DragResizeController {
    phase: InteractionPhase,
    min_send_interval_ms: u64,
    last_sent_at_ms: Option<u64>,
    pending: Option<GeometryUpdate>,
}

impl Default for DragResizeController {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_SEND_INTERVAL_MS)
    }
}

impl DragResizeController {
    /// Creates an idle controller that sends at most once per `min_send_interval_ms`.
    pub fn new(min_send_interval_ms: u64) -> Self {
        Self {
            phase: InteractionPhase::Idle,
            min_send_interval_ms,
            last_sent_at_ms: None,
            pending: None,
        }
    }

    /// Returns the current phase.
    pub fn phase(&self) -> &InteractionPhase {
        &self.phase
    }

    /// Returns `true` when no interaction is in progress.
    pub fn is_idle(&self) -> bool {
        matches!(self.phase, InteractionPhase::Idle)
    }

    /// Returns the window currently being moved or resized.
    pub fn active_window(&self) -> Option<&WindowId> {
        match &self.phase {
            InteractionPhase::Idle => None,
            InteractionPhase::Dragging { window_id, .. }
            | InteractionPhase::Resizing { window_id, .. } => Some(window_id),
        }
    }

    /// Returns the locally computed position for the dragged window.
    pub fn optimistic_position(&self, window_id: &WindowId) -> Option<Point> {
        match &self.phase {
            InteractionPhase::Dragging {
                window_id: active,
                position,
                ..
            } if active == window_id => Some(*position),
            _ => None,
        }
    }

    /// Returns the locally computed size for the resized window.
    pub fn optimistic_size(&self, window_id: &WindowId) -> Option<Size> {
        match &self.phase {
            InteractionPhase::Resizing {
                window_id: active,
                size,
                ..
            } if active == window_id => Some(*size),
            _ => None,
        }
    }

    /// `Idle -> Dragging` on a header press. Ignored while another interaction is active.
    pub fn begin_move(
        &mut self,
        window_id: WindowId,
        pointer: PointerPosition,
        origin: Point,
    ) -> Vec<InteractionEffect> {
        if !self.is_idle() {
            return Vec::new();
        }
        self.reset_coalescing();
        self.phase = InteractionPhase::Dragging {
            window_id,
            anchor: Point {
                x: pointer.x.saturating_sub(origin.x),
                y: pointer.y.saturating_sub(origin.y),
            },
            position: origin,
        };
        vec![InteractionEffect::AcquirePointerListeners]
    }

    /// `Idle -> Resizing` on a resize-handle press. Ignored while another interaction is active.
    pub fn begin_resize(
        &mut self,
        window_id: WindowId,
        pointer: PointerPosition,
        start: Size,
    ) -> Vec<InteractionEffect> {
        if !self.is_idle() {
            return Vec::new();
        }
        self.reset_coalescing();
        self.phase = InteractionPhase::Resizing {
            window_id,
            pointer_start: pointer,
            start,
            size: start,
        };
        vec![InteractionEffect::AcquirePointerListeners]
    }

    /// Applies a pointer sample taken at `now_ms`.
    ///
    /// Returns a send when the coalescing interval has elapsed; otherwise the sample is held as
    /// pending and superseded by later samples. The first held sample also asks the host to
    /// schedule a trailing [`Self::flush_due`].
    pub fn pointer_move(
        &mut self,
        pointer: PointerPosition,
        now_ms: u64,
    ) -> Vec<InteractionEffect> {
        let update = match &mut self.phase {
            InteractionPhase::Idle => return Vec::new(),
            InteractionPhase::Dragging {
                window_id,
                anchor,
                position,
            } => {
                *position = Point {
                    x: pointer.x.saturating_sub(anchor.x),
                    y: pointer.y.saturating_sub(anchor.y),
                };
                GeometryUpdate::Move {
                    window_id: window_id.clone(),
                    position: *position,
                }
            }
            InteractionPhase::Resizing {
                window_id,
                pointer_start,
                start,
                size,
            } => {
                let dx = pointer.x.saturating_sub(pointer_start.x);
                let dy = pointer.y.saturating_sub(pointer_start.y);
                *size = Size {
                    width: start.width.saturating_add(dx).max(MIN_WINDOW_WIDTH),
                    height: start.height.saturating_add(dy).max(MIN_WINDOW_HEIGHT),
                };
                GeometryUpdate::Resize {
                    window_id: window_id.clone(),
                    size: *size,
                }
            }
        };

        if self.send_due(now_ms) {
            self.last_sent_at_ms = Some(now_ms);
            self.pending = None;
            vec![InteractionEffect::Send(update)]
        } else if self.pending.replace(update).is_none() {
            vec![self.schedule_flush(now_ms)]
        } else {
            Vec::new()
        }
    }

    /// Sends the held sample once the coalescing interval has elapsed.
    ///
    /// A timer that fires early gets a fresh [`InteractionEffect::ScheduleFlush`] for the rest of
    /// the interval.
    pub fn flush_due(&mut self, now_ms: u64) -> Vec<InteractionEffect> {
        if self.pending.is_none() {
            return Vec::new();
        }
        if !self.send_due(now_ms) {
            return vec![self.schedule_flush(now_ms)];
        }
        self.last_sent_at_ms = Some(now_ms);
        self.pending
            .take()
            .map(InteractionEffect::Send)
            .into_iter()
            .collect()
    }

    /// Ends the interaction: the held final sample is sent, then listeners are released.
    ///
    /// Releasing while idle still releases listeners so a stray release never leaks them.
    pub fn release(&mut self) -> Vec<InteractionEffect> {
        let mut effects: Vec<_> = self
            .pending
            .take()
            .map(InteractionEffect::Send)
            .into_iter()
            .collect();
        self.phase = InteractionPhase::Idle;
        self.last_sent_at_ms = None;
        effects.push(InteractionEffect::ReleasePointerListeners);
        effects
    }

    /// Aborts the interaction without sending the held sample.
    pub fn cancel(&mut self) -> Vec<InteractionEffect> {
        self.phase = InteractionPhase::Idle;
        self.reset_coalescing();
        vec![InteractionEffect::ReleasePointerListeners]
    }

    fn send_due(&self, now_ms: u64) -> bool {
        self.last_sent_at_ms
            .map_or(true, |last| now_ms.saturating_sub(last) >= self.min_send_interval_ms)
    }

    fn schedule_flush(&self, now_ms: u64) -> InteractionEffect {
        let due_at = self
            .last_sent_at_ms
            .map_or(now_ms, |last| last.saturating_add(self.min_send_interval_ms));
        InteractionEffect::ScheduleFlush {
            delay_ms: due_at.saturating_sub(now_ms),
        }
    }

    fn reset_coalescing(&mut self) {
        self.last_sent_at_ms = None;
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn window() -> WindowId {
        WindowId::new("window-1")
    }

    fn sends(effects: &[InteractionEffect]) -> Vec<GeometryUpdate> {
        effects
            .iter()
            .filter_map(|effect| match effect {
                InteractionEffect::Send(update) => Some(update.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn drag_positions_follow_pointer_minus_anchor() {
        let mut controller = DragResizeController::new(0);
        let effects = controller.begin_move(
            window(),
            PointerPosition { x: 130, y: 110 },
            Point { x: 100, y: 100 },
        );
        assert_eq!(effects, vec![InteractionEffect::AcquirePointerListeners]);

        let samples = [(150, 130), (90, 40), (400, 300)];
        for (step, (x, y)) in samples.into_iter().enumerate() {
            let effects = controller.pointer_move(PointerPosition { x, y }, step as u64);
            assert_eq!(
                sends(&effects),
                vec![GeometryUpdate::Move {
                    window_id: window(),
                    position: Point {
                        x: x - 30,
                        y: y - 10
                    },
                }]
            );
        }
    }

    #[test]
    fn resize_clamps_to_minimum_size() {
        let mut controller = DragResizeController::new(0);
        controller.begin_resize(
            window(),
            PointerPosition { x: 700, y: 500 },
            Size {
                width: 600,
                height: 400,
            },
        );

        let effects = controller.pointer_move(PointerPosition { x: -300, y: -500 }, 1);
        assert_eq!(
            sends(&effects),
            vec![GeometryUpdate::Resize {
                window_id: window(),
                size: Size {
                    width: 300,
                    height: 200
                },
            }]
        );
    }

    #[test]
    fn coalescing_holds_samples_and_release_flushes_the_last_one() {
        let mut controller = DragResizeController::default();
        controller.begin_move(
            window(),
            PointerPosition { x: 0, y: 0 },
            Point { x: 0, y: 0 },
        );

        assert_eq!(
            sends(&controller.pointer_move(PointerPosition { x: 1, y: 1 }, 100)).len(),
            1
        );
        assert_eq!(
            controller.pointer_move(PointerPosition { x: 2, y: 2 }, 105),
            vec![InteractionEffect::ScheduleFlush { delay_ms: 11 }]
        );
        assert!(controller
            .pointer_move(PointerPosition { x: 3, y: 3 }, 110)
            .is_empty());

        let effects = controller.release();
        assert_eq!(
            effects,
            vec![
                InteractionEffect::Send(GeometryUpdate::Move {
                    window_id: window(),
                    position: Point { x: 3, y: 3 },
                }),
                InteractionEffect::ReleasePointerListeners,
            ]
        );
        assert!(controller.is_idle());
    }

    #[test]
    fn flush_due_sends_held_sample_after_interval() {
        let mut controller = DragResizeController::new(16);
        controller.begin_move(
            window(),
            PointerPosition { x: 0, y: 0 },
            Point { x: 0, y: 0 },
        );
        controller.pointer_move(PointerPosition { x: 1, y: 1 }, 0);
        assert_eq!(
            controller.pointer_move(PointerPosition { x: 5, y: 5 }, 4),
            vec![InteractionEffect::ScheduleFlush { delay_ms: 12 }]
        );
        assert!(controller
            .pointer_move(PointerPosition { x: 7, y: 7 }, 6)
            .is_empty());

        // Early timer: reschedule for the remainder instead of dropping the sample.
        assert_eq!(
            controller.flush_due(10),
            vec![InteractionEffect::ScheduleFlush { delay_ms: 6 }]
        );
        assert_eq!(
            controller.flush_due(16),
            vec![InteractionEffect::Send(GeometryUpdate::Move {
                window_id: window(),
                position: Point { x: 7, y: 7 },
            })]
        );
        assert!(controller.flush_due(40).is_empty());
    }

    #[test]
    fn extreme_pointer_coordinates_saturate() {
        let mut controller = DragResizeController::new(0);
        controller.begin_move(
            window(),
            PointerPosition {
                x: i32::MIN,
                y: i32::MAX,
            },
            Point { x: 10, y: -10 },
        );
        let effects = controller.pointer_move(
            PointerPosition {
                x: i32::MAX,
                y: i32::MIN,
            },
            0,
        );
        assert_eq!(
            sends(&effects),
            vec![GeometryUpdate::Move {
                window_id: window(),
                position: Point {
                    x: i32::MAX,
                    y: i32::MIN,
                },
            }]
        );
        controller.release();

        controller.begin_resize(
            window(),
            PointerPosition {
                x: i32::MIN,
                y: i32::MIN,
            },
            Size {
                width: 600,
                height: 400,
            },
        );
        let effects = controller.pointer_move(
            PointerPosition {
                x: i32::MAX,
                y: i32::MAX,
            },
            1,
        );
        assert_eq!(
            sends(&effects),
            vec![GeometryUpdate::Resize {
                window_id: window(),
                size: Size {
                    width: i32::MAX,
                    height: i32::MAX,
                },
            }]
        );
    }

    #[test]
    fn press_during_active_interaction_is_ignored() {
        let mut controller = DragResizeController::default();
        controller.begin_move(
            window(),
            PointerPosition { x: 0, y: 0 },
            Point { x: 0, y: 0 },
        );
        let other = WindowId::new("window-2");

        assert!(controller
            .begin_resize(
                other.clone(),
                PointerPosition { x: 0, y: 0 },
                Size::default()
            )
            .is_empty());
        assert!(controller
            .begin_move(other, PointerPosition { x: 0, y: 0 }, Point::default())
            .is_empty());
        assert_eq!(controller.active_window(), Some(&window()));
    }

    #[test]
    fn cancel_releases_without_flushing() {
        let mut controller = DragResizeController::new(1_000);
        controller.begin_move(
            window(),
            PointerPosition { x: 0, y: 0 },
            Point { x: 0, y: 0 },
        );
        controller.pointer_move(PointerPosition { x: 1, y: 1 }, 0);
        controller.pointer_move(PointerPosition { x: 9, y: 9 }, 1);

        assert_eq!(
            controller.cancel(),
            vec![InteractionEffect::ReleasePointerListeners]
        );
        assert_eq!(controller.release(), vec![InteractionEffect::ReleasePointerListeners]);
    }

    #[test]
    fn optimistic_geometry_only_reported_for_active_window() {
        let mut controller = DragResizeController::new(0);
        controller.begin_move(
            window(),
            PointerPosition { x: 10, y: 10 },
            Point { x: 0, y: 0 },
        );
        controller.pointer_move(PointerPosition { x: 60, y: 20 }, 0);

        assert_eq!(
            controller.optimistic_position(&window()),
            Some(Point { x: 50, y: 10 })
        );
        assert_eq!(controller.optimistic_position(&WindowId::new("window-2")), None);
        assert_eq!(controller.optimistic_size(&window()), None);
    }
}
