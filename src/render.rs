use crate::config::{EditorConfig, RenderConfig};
use crate::layout::{EditorLayout, LegendRow, StatusLayout};
use crate::normalize::ChartEntry;
use crate::theme::Theme;
use anyhow::Result;
use serde::Serialize;
use std::path::Path;

/// `{labels, series}` as consumed by pie/donut chart libraries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub series: Vec<f64>,
}

impl ChartSeries {
    pub fn from_entries(entries: &[ChartEntry]) -> Self {
        Self {
            labels: entries.iter().map(|entry| entry.label.clone()).collect(),
            series: entries.iter().map(|entry| round_hundredths(entry.value)).collect(),
        }
    }
}

pub fn render_chart_json(entries: &[ChartEntry]) -> Result<String> {
    Ok(serde_json::to_string_pretty(&ChartSeries::from_entries(entries))?)
}

pub fn render_svg(layout: &EditorLayout, theme: &Theme, config: &EditorConfig) -> String {
    let mut svg = String::new();
    let width = layout.width;
    let height = layout.height;

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));

    for slice in &layout.slices {
        svg.push_str(&format!(
            "<g data-segment=\"{}\" data-index=\"{}\">",
            escape_xml(&slice.name),
            slice.index
        ));
        svg.push_str(&format!(
            "<path d=\"{}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\" opacity=\"{}\"/>",
            slice.path, slice.color, theme.slice_stroke, slice.stroke_width, slice.opacity
        ));
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" dominant-baseline=\"middle\" font-family=\"{}\" font-size=\"{}\" font-weight=\"bold\" fill=\"{}\" pointer-events=\"none\">{}%</text>",
            slice.label_position.x,
            slice.label_position.y,
            escape_xml(&theme.font_family),
            config.label_font_size,
            theme.label_color,
            slice.percentage
        ));
        svg.push_str("</g>");
    }

    for row in &layout.legend {
        svg.push_str(&legend_row_svg(row, theme, config));
    }

    if let Some(status) = &layout.status {
        svg.push_str(&status_svg(status, theme));
    }

    svg.push_str("</svg>");
    svg
}

fn legend_row_svg(row: &LegendRow, theme: &Theme, config: &EditorConfig) -> String {
    let chip = config.legend_chip_size;
    let mid_y = row.y + config.legend_row_height / 2.0;
    let border = if row.active {
        format!(" stroke=\"{}\" stroke-width=\"2\"", theme.active_border)
    } else {
        String::new()
    };
    let mut out = String::new();
    out.push_str(&format!(
        "<g opacity=\"{}\"><rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"4\" fill=\"{}\"{border}/>",
        row.opacity,
        row.x,
        row.y + 2.0,
        config.legend_width,
        config.legend_row_height - 4.0,
        theme.panel_background,
    ));
    out.push_str(&format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{chip}\" height=\"{chip}\" rx=\"4\" fill=\"{}\"/>",
        row.x + 8.0,
        mid_y - chip / 2.0,
        row.color
    ));
    out.push_str(&format!(
        "<text x=\"{:.2}\" y=\"{mid_y:.2}\" dominant-baseline=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
        row.x + chip + 16.0,
        escape_xml(&theme.font_family),
        theme.font_size,
        theme.text_color,
        escape_xml(&row.name)
    ));
    out.push_str(&format!(
        "<text x=\"{:.2}\" y=\"{mid_y:.2}\" text-anchor=\"end\" dominant-baseline=\"middle\" font-family=\"{}\" font-size=\"{}\" font-weight=\"600\" fill=\"{}\">{}%</text>",
        row.x + config.legend_width - 10.0,
        escape_xml(&theme.font_family),
        theme.font_size,
        theme.text_color,
        row.percentage
    ));
    out.push_str("</g>");
    out
}

fn status_svg(layout: &StatusLayout, theme: &Theme) -> String {
    let status = layout.status;
    let accent = if status.balanced {
        theme.balanced_color.as_str()
    } else {
        theme.unbalanced_color.as_str()
    };
    let mut out = String::new();
    out.push_str(&format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"4\" fill=\"{}\"/>",
        layout.x, layout.y, layout.width, layout.height, theme.panel_background
    ));
    out.push_str(&format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"4\" height=\"{:.2}\" fill=\"{accent}\"/>",
        layout.x, layout.y, layout.height
    ));
    out.push_str(&format!(
        "<text x=\"{:.2}\" y=\"{:.2}\" font-family=\"{}\" font-size=\"{}\" font-weight=\"700\" fill=\"{accent}\">Total: {}%</text>",
        layout.x + 14.0,
        layout.y + layout.height * 0.4,
        escape_xml(&theme.font_family),
        theme.font_size + 2.0,
        status.total
    ));
    if !status.balanced {
        out.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">Total must equal 100%</text>",
            layout.x + 14.0,
            layout.y + layout.height * 0.8,
            escape_xml(&theme.font_family),
            theme.font_size,
            theme.muted_text_color
        ));
    }
    out
}

pub fn write_output(contents: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, contents)?;
        }
        None => {
            print!("{}", contents);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = "Inter".to_string();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .ok_or_else(|| anyhow::anyhow!("Invalid render size"))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;
    if let Some(color) = parse_hex_color(&render_cfg.background) {
        pixmap.fill(color);
    }

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _render_cfg: &RenderConfig) -> Result<()> {
    Err(anyhow::anyhow!(
        "PNG output requires the `png` feature"
    ))
}

#[cfg(feature = "png")]
fn parse_hex_color(value: &str) -> Option<resvg::tiny_skia::Color> {
    let hex = value.trim().strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some(resvg::tiny_skia::Color::from_rgba8(
        channel(0..2)?,
        channel(2..4)?,
        channel(4..6)?,
        255,
    ))
}

fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
