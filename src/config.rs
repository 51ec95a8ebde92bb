use crate::geometry::Point;
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorConfig {
    pub width: f64,
    pub height: f64,
    pub radius: f64,
    pub center_x: f64,
    pub center_y: f64,
    pub label_radius_ratio: f64,
    pub label_font_size: f64,
    pub stroke_width: f64,
    pub active_stroke_width: f64,
    pub opacity: f64,
    pub active_opacity: f64,
    pub show_legend: bool,
    pub show_status: bool,
    pub legend_gap: f64,
    pub legend_width: f64,
    pub legend_row_height: f64,
    pub legend_chip_size: f64,
    pub zero_opacity: f64,
    pub status_height: f64,
}

impl EditorConfig {
    pub fn center(&self) -> Point {
        Point::new(self.center_x, self.center_y)
    }

    pub fn label_radius(&self) -> f64 {
        self.radius * self.label_radius_ratio
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 400.0,
            radius: 150.0,
            center_x: 200.0,
            center_y: 200.0,
            label_radius_ratio: 0.7,
            label_font_size: 14.0,
            stroke_width: 1.0,
            active_stroke_width: 3.0,
            opacity: 0.9,
            active_opacity: 1.0,
            show_legend: true,
            show_status: true,
            legend_gap: 32.0,
            legend_width: 250.0,
            legend_row_height: 36.0,
            legend_chip_size: 20.0,
            zero_opacity: 0.5,
            status_height: 56.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            background: "#FFFFFF".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub editor: EditorConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::dashboard();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            editor: EditorConfig::default(),
            render,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<NumberOrString>,
    background: Option<String>,
    panel_background: Option<String>,
    text_color: Option<String>,
    muted_text_color: Option<String>,
    label_color: Option<String>,
    slice_stroke: Option<String>,
    active_border: Option<String>,
    balanced_color: Option<String>,
    unbalanced_color: Option<String>,
    category_colors: Option<BTreeMap<String, String>>,
    palette: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    String(String),
}

impl NumberOrString {
    fn as_f64(&self) -> Option<f64> {
        match self {
            NumberOrString::Number(val) => Some(*val),
            NumberOrString::String(val) => val.trim().trim_end_matches("px").parse::<f64>().ok(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct EditorConfigFile {
    width: Option<f64>,
    height: Option<f64>,
    radius: Option<f64>,
    center_x: Option<f64>,
    center_y: Option<f64>,
    label_radius_ratio: Option<f64>,
    label_font_size: Option<NumberOrString>,
    stroke_width: Option<f64>,
    active_stroke_width: Option<f64>,
    opacity: Option<f64>,
    active_opacity: Option<f64>,
    show_legend: Option<bool>,
    show_status: Option<bool>,
    legend_gap: Option<f64>,
    legend_width: Option<f64>,
    legend_row_height: Option<f64>,
    legend_chip_size: Option<f64>,
    zero_opacity: Option<f64>,
    status_height: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    width: Option<f32>,
    height: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    editor: Option<EditorConfigFile>,
    render: Option<RenderConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Overlays a JSON (or JSON5) config document onto the defaults.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = match serde_json::from_str(contents) {
        Ok(parsed) => parsed,
        Err(err) => json5::from_str(contents).map_err(|_| err)?,
    };
    let mut config = Config::default();

    if let Some(theme_name) = parsed.theme.as_deref() {
        if theme_name == "light" {
            config.theme = Theme::light();
        } else if theme_name == "dashboard" || theme_name == "dark" || theme_name == "default" {
            config.theme = Theme::dashboard();
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size.and_then(|v| v.as_f64()) {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
        if let Some(v) = vars.panel_background {
            config.theme.panel_background = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.muted_text_color {
            config.theme.muted_text_color = v;
        }
        if let Some(v) = vars.label_color {
            config.theme.label_color = v;
        }
        if let Some(v) = vars.slice_stroke {
            config.theme.slice_stroke = v;
        }
        if let Some(v) = vars.active_border {
            config.theme.active_border = v;
        }
        if let Some(v) = vars.balanced_color {
            config.theme.balanced_color = v;
        }
        if let Some(v) = vars.unbalanced_color {
            config.theme.unbalanced_color = v;
        }
        if let Some(v) = vars.category_colors {
            config.theme.category_colors.extend(v);
        }
        if let Some(v) = vars.palette {
            if !v.is_empty() {
                config.theme.palette = v;
            }
        }
    }

    if let Some(editor) = parsed.editor {
        if let Some(v) = editor.width {
            config.editor.width = v;
        }
        if let Some(v) = editor.height {
            config.editor.height = v;
        }
        if let Some(v) = editor.radius {
            config.editor.radius = v;
        }
        if let Some(v) = editor.center_x {
            config.editor.center_x = v;
        }
        if let Some(v) = editor.center_y {
            config.editor.center_y = v;
        }
        if let Some(v) = editor.label_radius_ratio {
            config.editor.label_radius_ratio = v;
        }
        if let Some(v) = editor.label_font_size.and_then(|v| v.as_f64()) {
            config.editor.label_font_size = v;
        }
        if let Some(v) = editor.stroke_width {
            config.editor.stroke_width = v;
        }
        if let Some(v) = editor.active_stroke_width {
            config.editor.active_stroke_width = v;
        }
        if let Some(v) = editor.opacity {
            config.editor.opacity = v;
        }
        if let Some(v) = editor.active_opacity {
            config.editor.active_opacity = v;
        }
        if let Some(v) = editor.show_legend {
            config.editor.show_legend = v;
        }
        if let Some(v) = editor.show_status {
            config.editor.show_status = v;
        }
        if let Some(v) = editor.legend_gap {
            config.editor.legend_gap = v;
        }
        if let Some(v) = editor.legend_width {
            config.editor.legend_width = v;
        }
        if let Some(v) = editor.legend_row_height {
            config.editor.legend_row_height = v;
        }
        if let Some(v) = editor.legend_chip_size {
            config.editor.legend_chip_size = v;
        }
        if let Some(v) = editor.zero_opacity {
            config.editor.zero_opacity = v;
        }
        if let Some(v) = editor.status_height {
            config.editor.status_height = v;
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.width {
            config.render.width = v;
        }
        if let Some(v) = render.height {
            config.render.height = v;
        }
    }

    // Radius and center must describe a real circle before any geometry runs.
    config.editor.radius = config.editor.radius.max(1.0);
    config.editor.width = config.editor.width.max(1.0);
    config.editor.height = config.editor.height.max(1.0);
    config.render.background = config.theme.background.clone();

    Ok(config)
}
