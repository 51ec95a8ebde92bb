use pie_allocator::config::parse_config;
use pie_allocator::geometry::Point;
use pie_allocator::{AllocationStore, Config, EditorSession, ListenerGuard, MoveOutcome, PointerHost};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Result of one pointer move, handed back to the page as JSON.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MoveReport {
    changed: bool,
    percentages: Vec<u32>,
}

fn to_js(error: impl ToString) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn build_config(config_json: Option<String>) -> Result<Config, JsValue> {
    match config_json {
        Some(raw) => parse_config(&raw).map_err(to_js),
        None => Ok(Config::default()),
    }
}

/// Hands the page's listener teardown to the drag controller, which calls it when the drag ends
/// or the editor is freed.
struct PageHost {
    release: Option<js_sys::Function>,
}

impl PointerHost for PageHost {
    fn capture_pointer(&mut self) -> ListenerGuard {
        match self.release.take() {
            Some(release) => ListenerGuard::new(move || {
                let _ = release.call0(&JsValue::NULL);
            }),
            None => ListenerGuard::detached(),
        }
    }
}

/// Editor state owned by the page. Pointer coordinates are in SVG user units.
#[wasm_bindgen]
pub struct AllocationEditor {
    session: EditorSession,
}

#[wasm_bindgen]
impl AllocationEditor {
    /// Builds an editor from a weight payload, or the default goals when none is given.
    #[wasm_bindgen(constructor)]
    pub fn new(
        payload: Option<String>,
        config_json: Option<String>,
    ) -> Result<AllocationEditor, JsValue> {
        let config = build_config(config_json)?;
        let session = match payload {
            Some(raw) => EditorSession::from_payload(&raw, config).map_err(to_js)?,
            None => EditorSession::new(AllocationStore::default_goals(), config),
        };
        Ok(Self { session })
    }

    /// Returns the pressed segment index, or -1 when the press missed the pie.
    ///
    /// `release` detaches the window-wide move/up listeners the page attached for this drag. It
    /// runs exactly once: on pointer-up, when another drag starts, or when the editor is freed.
    /// On a miss it is dropped without being called.
    pub fn pointer_down(&mut self, x: f64, y: f64, release: Option<js_sys::Function>) -> i32 {
        let mut host = PageHost { release };
        self.session
            .pointer_down(Point::new(x, y), &mut host)
            .map(|index| index as i32)
            .unwrap_or(-1)
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> Result<String, JsValue> {
        let outcome = self.session.pointer_move(Point::new(x, y));
        let report = MoveReport {
            changed: matches!(outcome, MoveOutcome::Transferred(_)),
            percentages: self.session.store().percentages().collect(),
        };
        serde_json::to_string(&report).map_err(to_js)
    }

    pub fn pointer_up(&mut self) -> bool {
        self.session.pointer_up()
    }

    /// Applies a typed value from a percentage input. Returns the stored percentage.
    pub fn set_percentage(&mut self, index: usize, text: &str) -> Result<u32, JsValue> {
        self.session
            .store_mut()
            .set_percentage_from_input(index, text)
            .map_err(to_js)
    }

    pub fn auto_fill(&mut self) -> bool {
        self.session.auto_fill()
    }

    pub fn render_svg(&self) -> String {
        self.session.render_svg()
    }

    pub fn chart_json(&self) -> Result<String, JsValue> {
        pie_allocator::render::render_chart_json(&self.session.chart_entries()).map_err(to_js)
    }

    pub fn is_balanced(&self) -> bool {
        self.session.store().is_balanced()
    }

    pub fn total(&self) -> u32 {
        self.session.store().total()
    }
}
