//! Drag-to-adjust interaction for the allocation pie.
//!
//! Dragging a segment boundary is a zero-sum transfer between the two segments that share it.
//! The rest of the store is never touched, so an unbalanced total stays unbalanced until the
//! user asks for an auto-fill.
//!
//! While a drag is in progress the controller holds a [`ListenerGuard`] obtained from the
//! embedding [`PointerHost`]. The guard is dropped, releasing the host's global pointer-move and
//! pointer-up listeners, on every transition back to idle and when the controller itself is
//! dropped.

use std::fmt;

use tracing::debug;

use crate::config::EditorConfig;
use crate::geometry::{FULL_TURN, Point, mouse_angle, segment_at};
use crate::store::AllocationStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        index: usize,
    },
}

/// Which boundary of the dragged segment the pointer is closest to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragEdge {
    Start,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    pub edge: DragEdge,
    /// Earlier segment of the pair (clockwise order).
    pub first: usize,
    pub second: usize,
    pub first_percentage: u32,
    pub second_percentage: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// No drag in progress.
    Idle,
    /// The pointer position could not be turned into an angle.
    Ignored,
    /// The nearest edge is the outer edge of the first or last segment.
    NoNeighbor { edge: DragEdge },
    Transferred(Transfer),
}

/// Registration of global pointer listeners; dropping it releases them.
pub struct ListenerGuard {
    release: Option<Box<dyn FnOnce()>>,
}

impl ListenerGuard {
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// A guard with nothing to release, for hosts that deliver pointer events directly.
    pub fn detached() -> Self {
        Self { release: None }
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerGuard")
            .field("attached", &self.release.is_some())
            .finish()
    }
}

/// Whatever embeds the editor: attaches window-wide pointer listeners for the length of a drag.
pub trait PointerHost {
    fn capture_pointer(&mut self) -> ListenerGuard;
}

/// Host for callers that feed every pointer event in themselves (tests, replay, CLI).
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectHost;

impl PointerHost for DirectHost {
    fn capture_pointer(&mut self) -> ListenerGuard {
        ListenerGuard::detached()
    }
}

#[derive(Debug)]
pub struct DragController {
    state: DragState,
    center: Point,
    radius: f64,
    listeners: Option<ListenerGuard>,
}

impl DragController {
    pub fn new(center: Point, radius: f64) -> Self {
        Self {
            state: DragState::Idle,
            center,
            radius,
            listeners: None,
        }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(config.center(), config.radius)
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn active_index(&self) -> Option<usize> {
        match self.state {
            DragState::Idle => None,
            DragState::Dragging { index } => Some(index),
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.active_index().is_some()
    }

    /// Starts dragging segment `index`. Any drag already in progress is ended first. Returns
    /// `false` for an index outside the store.
    pub fn pointer_down(
        &mut self,
        index: usize,
        store: &AllocationStore,
        host: &mut dyn PointerHost,
    ) -> bool {
        if index >= store.len() {
            return false;
        }
        self.release();
        self.listeners = Some(host.capture_pointer());
        self.state = DragState::Dragging { index };
        debug!(index, "drag started");
        true
    }

    /// Hit-tests `pointer` against the drawn wedges and starts a drag on the one under it.
    pub fn pointer_down_at(
        &mut self,
        pointer: Point,
        store: &AllocationStore,
        host: &mut dyn PointerHost,
    ) -> Option<usize> {
        let index = segment_at(&store.angles(), pointer, self.center, self.radius)?;
        self.pointer_down(index, store, host).then_some(index)
    }

    pub fn pointer_move(&mut self, pointer: Point, store: &mut AllocationStore) -> MoveOutcome {
        let DragState::Dragging { index } = self.state else {
            return MoveOutcome::Idle;
        };
        if index >= store.len() {
            return MoveOutcome::Idle;
        }
        let angle = mouse_angle(pointer, self.center);
        if !angle.is_finite() {
            return MoveOutcome::Ignored;
        }

        let angles = store.angles();
        let current = angles[index];
        let edge = if (angle - current.start).abs() < (angle - current.end).abs() {
            DragEdge::Start
        } else {
            DragEdge::End
        };
        let (first, second) = match edge {
            DragEdge::Start if index > 0 => (index - 1, index),
            DragEdge::End if index + 1 < angles.len() => (index, index + 1),
            _ => return MoveOutcome::NoNeighbor { edge },
        };

        // The pair's combined arc does not move while the shared boundary is dragged. On an
        // over-allocated store that arc can exceed a full turn, so neither side may grow past 360.
        let lower = angles[first].start;
        let upper = angles[second].end;
        let boundary = angle
            .max(lower.max(upper - FULL_TURN))
            .min(upper.min(lower + FULL_TURN));
        let first_percentage = angle_to_percentage(boundary - lower);
        let second_percentage = angle_to_percentage(upper - boundary);
        store.commit_pair((first, first_percentage), (second, second_percentage));
        debug!(
            first,
            second,
            first_percentage,
            second_percentage,
            "drag transferred percentage"
        );

        MoveOutcome::Transferred(Transfer {
            edge,
            first,
            second,
            first_percentage,
            second_percentage,
        })
    }

    /// Ends the drag wherever the pointer is released. Returns whether a drag was in progress.
    pub fn pointer_up(&mut self) -> bool {
        let was_dragging = self.is_dragging();
        if was_dragging {
            debug!(index = ?self.active_index(), "drag ended");
        }
        self.release();
        was_dragging
    }

    fn release(&mut self) {
        self.state = DragState::Idle;
        self.listeners = None;
    }
}

fn angle_to_percentage(span: f64) -> u32 {
    debug_assert!(
        (-1e-9..=FULL_TURN + 1e-9).contains(&span),
        "span {span} outside a single turn"
    );
    (span / FULL_TURN * 100.0).round().max(0.0) as u32
}
