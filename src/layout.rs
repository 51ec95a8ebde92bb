//! Positions everything the renderer draws for one frame of the editor.

use serde::Serialize;

use crate::config::EditorConfig;
use crate::geometry::{AngleRange, Point, arc_path, label_position};
use crate::store::{AllocationStatus, AllocationStore};
use crate::theme::Theme;

#[derive(Debug, Clone, Serialize)]
pub struct SliceLayout {
    /// Position in the store; stays valid for hit-testing even though empty slices are skipped.
    pub index: usize,
    pub name: String,
    pub percentage: u32,
    pub range: AngleRange,
    pub path: String,
    pub label_position: Point,
    pub color: String,
    pub active: bool,
    pub stroke_width: f64,
    pub opacity: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LegendRow {
    pub index: usize,
    pub name: String,
    pub percentage: u32,
    pub color: String,
    pub x: f64,
    pub y: f64,
    pub active: bool,
    pub opacity: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusLayout {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub status: AllocationStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct EditorLayout {
    pub width: f64,
    pub height: f64,
    pub center: Point,
    pub radius: f64,
    pub slices: Vec<SliceLayout>,
    pub legend: Vec<LegendRow>,
    pub status: Option<StatusLayout>,
}

pub fn compute_layout(
    store: &AllocationStore,
    active: Option<usize>,
    theme: &Theme,
    config: &EditorConfig,
) -> EditorLayout {
    let center = config.center();
    let radius = config.radius;
    let angles = store.angles();

    let slices: Vec<SliceLayout> = store
        .segments()
        .iter()
        .zip(&angles)
        .enumerate()
        .filter(|(_, (segment, _))| segment.percentage > 0)
        .map(|(index, (segment, range))| {
            let is_active = active == Some(index);
            SliceLayout {
                index,
                name: segment.name.clone(),
                percentage: segment.percentage,
                range: *range,
                path: arc_path(range.start, range.end, radius, center),
                label_position: label_position(*range, config.label_radius(), center),
                color: theme.color_for(&segment.name, index).to_string(),
                active: is_active,
                stroke_width: if is_active {
                    config.active_stroke_width
                } else {
                    config.stroke_width
                },
                opacity: if is_active {
                    config.active_opacity
                } else {
                    config.opacity
                },
            }
        })
        .collect();

    let panel_x = config.width + config.legend_gap;
    let mut legend = Vec::new();
    let mut panel_bottom = 0.0;
    if config.show_legend {
        for (index, segment) in store.segments().iter().enumerate() {
            let y = config.legend_row_height * index as f64;
            legend.push(LegendRow {
                index,
                name: segment.name.clone(),
                percentage: segment.percentage,
                color: theme.color_for(&segment.name, index).to_string(),
                x: panel_x,
                y,
                active: active == Some(index),
                opacity: if segment.percentage == 0 {
                    config.zero_opacity
                } else {
                    1.0
                },
            });
            panel_bottom = y + config.legend_row_height;
        }
    }

    let status = config.show_status.then(|| StatusLayout {
        x: if config.show_legend { panel_x } else { 0.0 },
        y: if config.show_legend {
            panel_bottom + config.legend_row_height / 2.0
        } else {
            config.height
        },
        width: if config.show_legend {
            config.legend_width
        } else {
            config.width
        },
        height: config.status_height,
        status: store.status(),
    });

    let width = if config.show_legend {
        panel_x + config.legend_width
    } else {
        config.width
    };
    let content_bottom = status
        .as_ref()
        .map(|status| status.y + status.height)
        .unwrap_or(panel_bottom);

    EditorLayout {
        width,
        height: config.height.max(content_bottom),
        center,
        radius,
        slices,
        legend,
        status,
    }
}
