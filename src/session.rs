//! One editing session: the store, the drag controller and the configuration they render with.
//!
//! This is the surface renderer adapters (the CLI replay, the WASM wrapper) talk to. It owns
//! nothing beyond the session; dropping it tears down any drag in progress.

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::drag::{DirectHost, DragController, MoveOutcome, PointerHost};
use crate::geometry::Point;
use crate::layout::{EditorLayout, compute_layout};
use crate::normalize::ChartEntry;
use crate::payload::{PayloadError, parse_weights};
use crate::render::render_svg;
use crate::store::AllocationStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerEventKind {
    Down,
    Move,
    Up,
}

/// A recorded pointer event in editor coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    #[serde(rename = "type")]
    pub kind: PointerEventKind,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

impl PointerEvent {
    pub fn down(x: f64, y: f64) -> Self {
        Self {
            kind: PointerEventKind::Down,
            x,
            y,
        }
    }

    pub fn moved(x: f64, y: f64) -> Self {
        Self {
            kind: PointerEventKind::Move,
            x,
            y,
        }
    }

    pub fn up() -> Self {
        Self {
            kind: PointerEventKind::Up,
            x: 0.0,
            y: 0.0,
        }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[derive(Debug)]
pub struct EditorSession {
    store: AllocationStore,
    controller: DragController,
    config: Config,
}

impl EditorSession {
    pub fn new(store: AllocationStore, config: Config) -> Self {
        let controller = DragController::from_config(&config.editor);
        Self {
            store,
            controller,
            config,
        }
    }

    pub fn from_payload(input: &str, config: Config) -> Result<Self, PayloadError> {
        let entries = parse_weights(input)?;
        Ok(Self::new(AllocationStore::from_weights(&entries), config))
    }

    pub fn store(&self) -> &AllocationStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut AllocationStore {
        &mut self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn controller(&self) -> &DragController {
        &self.controller
    }

    /// Re-runs normalization for a refreshed payload, keeping this session's categories.
    pub fn reload(&mut self, input: &str) -> Result<(), PayloadError> {
        let entries = parse_weights(input)?;
        self.controller.pointer_up();
        self.store.import_weights(&entries);
        Ok(())
    }

    pub fn pointer_down(&mut self, pointer: Point, host: &mut dyn PointerHost) -> Option<usize> {
        self.controller.pointer_down_at(pointer, &self.store, host)
    }

    pub fn pointer_move(&mut self, pointer: Point) -> MoveOutcome {
        self.controller.pointer_move(pointer, &mut self.store)
    }

    pub fn pointer_up(&mut self) -> bool {
        self.controller.pointer_up()
    }

    /// Feeds recorded events through the controller. Returns how many moves transferred
    /// percentage between neighbours.
    pub fn replay(&mut self, events: &[PointerEvent]) -> usize {
        let mut host = DirectHost;
        let mut transfers = 0;
        for event in events {
            match event.kind {
                PointerEventKind::Down => {
                    self.pointer_down(event.point(), &mut host);
                }
                PointerEventKind::Move => {
                    if matches!(self.pointer_move(event.point()), MoveOutcome::Transferred(_)) {
                        transfers += 1;
                    }
                }
                PointerEventKind::Up => {
                    self.pointer_up();
                }
            }
        }
        transfers
    }

    pub fn auto_fill(&mut self) -> bool {
        self.store.auto_fill()
    }

    pub fn layout(&self) -> EditorLayout {
        compute_layout(
            &self.store,
            self.controller.active_index(),
            &self.config.theme,
            &self.config.editor,
        )
    }

    pub fn render_svg(&self) -> String {
        render_svg(&self.layout(), &self.config.theme, &self.config.editor)
    }

    pub fn chart_entries(&self) -> Vec<ChartEntry> {
        self.store.chart_entries()
    }
}
