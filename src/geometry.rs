//! Angle and coordinate math for the allocation pie.
//!
//! Angles are in degrees, with 0° at 12 o'clock and increasing clockwise. Screen coordinates
//! follow SVG conventions (y grows downward).

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

pub const FULL_TURN: f64 = 360.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Angular extent of one segment. `start == end` for a collapsed (0%) segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleRange {
    pub start: f64,
    pub end: f64,
}

impl AngleRange {
    pub fn span(&self) -> f64 {
        self.end - self.start
    }

    pub fn mid(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    pub fn is_empty(&self) -> bool {
        self.span() <= 0.0
    }

    pub fn contains(&self, angle: f64) -> bool {
        !self.is_empty() && angle >= self.start && angle < self.end
    }
}

pub fn percentage_to_angle_span(percentage: f64) -> f64 {
    percentage / 100.0 * FULL_TURN
}

pub fn cumulative_angles<I>(percentages: I) -> Vec<AngleRange>
where
    I: IntoIterator<Item = f64>,
{
    let mut cumulative = 0.0;
    percentages
        .into_iter()
        .map(|percentage| {
            let start = cumulative;
            cumulative += percentage_to_angle_span(percentage);
            AngleRange {
                start,
                end: cumulative,
            }
        })
        .collect()
}

pub fn polar_to_cartesian(angle: f64, radius: f64, center: Point) -> Point {
    let radians = (angle - 90.0) * PI / 180.0;
    Point {
        x: center.x + radius * radians.cos(),
        y: center.y + radius * radians.sin(),
    }
}

/// Inverse of [`polar_to_cartesian`]: the clockwise angle from 12 o'clock, in `[0, 360)`.
pub fn mouse_angle(pointer: Point, center: Point) -> f64 {
    let delta_x = pointer.x - center.x;
    let delta_y = pointer.y - center.y;
    let angle = delta_y.atan2(delta_x) * (180.0 / PI) + 90.0;
    let angle = if angle < 0.0 { angle + FULL_TURN } else { angle };
    // -1e-15 + 360.0 rounds to 360.0
    if angle >= FULL_TURN { 0.0 } else { angle }
}

/// Closed wedge: center, line to the arc start, clockwise arc to the arc end, close.
///
/// A full-turn wedge would start and end on the same point, which SVG renders as nothing, so it
/// is emitted as two half arcs instead.
pub fn arc_path(start_angle: f64, end_angle: f64, radius: f64, center: Point) -> String {
    let span = end_angle - start_angle;
    let start = polar_to_cartesian(start_angle, radius, center);
    if span >= FULL_TURN {
        let half = polar_to_cartesian(start_angle + FULL_TURN / 2.0, radius, center);
        return format!(
            "M {} {} L {} {} A {r} {r} 0 1 1 {} {} A {r} {r} 0 1 1 {} {} Z",
            fmt_coord(center.x),
            fmt_coord(center.y),
            fmt_coord(start.x),
            fmt_coord(start.y),
            fmt_coord(half.x),
            fmt_coord(half.y),
            fmt_coord(start.x),
            fmt_coord(start.y),
            r = fmt_coord(radius),
        );
    }
    let end = polar_to_cartesian(end_angle, radius, center);
    let large_arc_flag = if span > 180.0 { 1 } else { 0 };
    [
        format!("M {} {}", fmt_coord(center.x), fmt_coord(center.y)),
        format!("L {} {}", fmt_coord(start.x), fmt_coord(start.y)),
        format!(
            "A {r} {r} 0 {large_arc_flag} 1 {} {}",
            fmt_coord(end.x),
            fmt_coord(end.y),
            r = fmt_coord(radius),
        ),
        "Z".to_string(),
    ]
    .join(" ")
}

/// Where a segment's percentage label sits: on the bisector, at `radius`.
pub fn label_position(range: AngleRange, radius: f64, center: Point) -> Point {
    polar_to_cartesian(range.mid(), radius, center)
}

/// Index of the non-empty wedge under `pointer`, if any.
pub fn segment_at(ranges: &[AngleRange], pointer: Point, center: Point, radius: f64) -> Option<usize> {
    if pointer.distance_to(center) > radius {
        return None;
    }
    let angle = mouse_angle(pointer, center);
    ranges.iter().position(|range| range.contains(angle))
}

fn fmt_coord(value: f64) -> String {
    // + 0.0 folds -0.0
    let rounded = (value * 100.0).round() / 100.0 + 0.0;
    if (rounded - rounded.round()).abs() < 1e-9 {
        format!("{:.0}", rounded)
    } else {
        format!("{:.2}", rounded)
    }
}
