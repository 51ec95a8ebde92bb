use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

const DASHBOARD_CATEGORY_COLORS: [(&str, &str); 7] = [
    ("Groceries", "#4cceac"),
    ("Travel", "#6870fa"),
    ("Entertainment", "#e91e63"),
    ("Shopping", "#ff9800"),
    ("Bills", "#db4f4a"),
    ("Eating Out", "#9c27b0"),
    ("Everything Else", "#666666"),
];

const CHART_PALETTE: [&str; 7] = [
    "#1C64F2", "#16BDCA", "#9061F9", "#FDBA8C", "#E74694", "#6366F1", "#34D399",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f64,
    pub background: String,
    pub panel_background: String,
    pub text_color: String,
    pub muted_text_color: String,
    pub label_color: String,
    pub slice_stroke: String,
    pub active_border: String,
    pub balanced_color: String,
    pub unbalanced_color: String,
    /// Fixed colours for known categories; anything else rotates through `palette`.
    pub category_colors: BTreeMap<String, String>,
    pub palette: Vec<String>,
}

impl Theme {
    pub fn dashboard() -> Self {
        Self {
            font_family: "Inter, Source Sans Pro, sans-serif".to_string(),
            font_size: 14.0,
            background: "#141b2d".to_string(),
            panel_background: "#1f2a40".to_string(),
            text_color: "#e0e0e0".to_string(),
            muted_text_color: "#a3a3a3".to_string(),
            label_color: "#ffffff".to_string(),
            slice_stroke: "#434957".to_string(),
            active_border: "#6870fa".to_string(),
            balanced_color: "#4cceac".to_string(),
            unbalanced_color: "#e2726e".to_string(),
            category_colors: category_map(&DASHBOARD_CATEGORY_COLORS),
            palette: CHART_PALETTE.iter().map(|color| color.to_string()).collect(),
        }
    }

    pub fn light() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            background: "#FFFFFF".to_string(),
            panel_background: "#F7FAFF".to_string(),
            text_color: "#1C2430".to_string(),
            muted_text_color: "#6B7280".to_string(),
            label_color: "#FFFFFF".to_string(),
            slice_stroke: "#FFFFFF".to_string(),
            active_border: "#1C64F2".to_string(),
            balanced_color: "#059669".to_string(),
            unbalanced_color: "#DC2626".to_string(),
            category_colors: BTreeMap::new(),
            palette: CHART_PALETTE.iter().map(|color| color.to_string()).collect(),
        }
    }

    pub fn color_for(&self, name: &str, index: usize) -> &str {
        if let Some(color) = self.category_colors.get(name) {
            return color;
        }
        if self.palette.is_empty() {
            return self.slice_stroke.as_str();
        }
        self.palette[index % self.palette.len()].as_str()
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dashboard()
    }
}

fn category_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(name, color)| (name.to_string(), color.to_string()))
        .collect()
}
