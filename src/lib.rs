pub mod config;
pub mod drag;
pub mod geometry;
pub mod layout;
pub mod normalize;
pub mod payload;
pub mod render;
pub mod session;
pub mod store;
pub mod theme;

#[cfg(feature = "cli")]
pub mod cli;

pub use config::{Config, EditorConfig, load_config};
pub use drag::{DirectHost, DragController, DragState, ListenerGuard, MoveOutcome, PointerHost};
pub use layout::compute_layout;
pub use normalize::{ChartEntry, Resolution, normalize};
pub use payload::{PayloadError, WeightEntry, parse_weights};
pub use render::render_svg;
pub use session::{EditorSession, PointerEvent};
pub use store::{AllocationStore, Segment, StoreError};
pub use theme::Theme;

#[cfg(feature = "cli")]
pub use cli::run;
