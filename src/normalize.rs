//! Exact-sum normalization of arbitrary weights into percentages.
//!
//! Largest-remainder (Hamilton) apportionment over a fixed number of units: every share is
//! floored to the resolution, then the leftover units go one at a time to the shares with the
//! largest truncated fractions. Ties keep input order, so equal weights favour earlier entries.
//!
//! All arithmetic after the exact-share step is on integer units, so a positive total always
//! apportions to exactly 100 percent.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;
use tracing::warn;

use crate::payload::WeightEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resolution {
    /// Whole percentage points, as held by the allocation store.
    WholePercent,
    /// Hundredths of a percent, as handed to the chart renderer.
    #[default]
    Hundredths,
}

impl Resolution {
    pub fn units_per_percent(self) -> u64 {
        match self {
            Resolution::WholePercent => 1,
            Resolution::Hundredths => 100,
        }
    }

    pub fn total_units(self) -> u64 {
        100 * self.units_per_percent()
    }

    pub fn to_percent(self, units: u64) -> f64 {
        units as f64 / self.units_per_percent() as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Share {
    pub name: String,
    /// Apportioned units at the resolution that produced this share.
    pub units: u64,
    pub percentage: f64,
}

/// One `{label, value}` pair as consumed by the chart renderer; `value` is a percentage with
/// two-decimal precision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartEntry {
    pub label: String,
    pub value: f64,
}

impl From<Share> for ChartEntry {
    fn from(share: Share) -> Self {
        Self {
            label: share.name,
            value: share.percentage,
        }
    }
}

/// Sums weights of repeated names. Output order is first-seen order.
pub fn aggregate(entries: &[WeightEntry]) -> Vec<WeightEntry> {
    let mut order: Vec<WeightEntry> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();
    for entry in entries {
        let weight = sanitize_weight(entry.weight);
        match slots.get(entry.name.as_str()) {
            // Saturate so merged duplicates stay finite.
            Some(&slot) => order[slot].weight = (order[slot].weight + weight).min(f64::MAX),
            None => {
                slots.insert(entry.name.as_str(), order.len());
                order.push(WeightEntry {
                    name: entry.name.clone(),
                    weight,
                });
            }
        }
    }
    order
}

/// Aggregates `entries` by name and apportions 100% across them.
///
/// A zero total yields all-zero shares (summing to 0, not 100); callers detect it through the
/// total rather than an error.
pub fn normalize(entries: &[WeightEntry], resolution: Resolution) -> Vec<Share> {
    let aggregated = aggregate(entries);
    let weights: Vec<f64> = aggregated.iter().map(|entry| entry.weight).collect();
    let units = largest_remainder(&weights, resolution.total_units());
    aggregated
        .into_iter()
        .zip(units)
        .map(|(entry, units)| Share {
            name: entry.name,
            units,
            percentage: resolution.to_percent(units),
        })
        .collect()
}

/// Normalizes raw weights straight into renderer input at hundredths resolution.
pub fn chart_entries(entries: &[WeightEntry]) -> Vec<ChartEntry> {
    normalize(entries, Resolution::Hundredths)
        .into_iter()
        .map(ChartEntry::from)
        .collect()
}

/// Apportions `total_units` across `weights`. Non-finite and negative weights count as zero.
pub fn largest_remainder(weights: &[f64], total_units: u64) -> Vec<u64> {
    let mut weights: Vec<f64> = weights.iter().copied().map(sanitize_weight).collect();
    if weights.is_empty() {
        return Vec::new();
    }
    let mut total_weight: f64 = weights.iter().sum();
    if total_weight.is_infinite() {
        // Finite weights whose sum overflows: shrink them so the largest is 1.
        let largest = weights.iter().copied().fold(0.0, f64::max);
        for weight in &mut weights {
            *weight /= largest;
        }
        total_weight = weights.iter().sum();
    }
    if !(total_weight > 0.0) {
        warn!(count = weights.len(), "all weights are zero; leaving shares at zero");
        return vec![0; weights.len()];
    }

    let scale = total_units as f64;
    // Divide before scaling so huge weights cannot overflow.
    let exact: Vec<f64> = weights
        .iter()
        .map(|weight| weight / total_weight * scale)
        .collect();
    let mut units: Vec<u64> = exact.iter().map(|share| share.floor() as u64).collect();
    let fractions: Vec<f64> = exact
        .iter()
        .zip(&units)
        .map(|(share, floor)| share - *floor as f64)
        .collect();

    let floored: u64 = units.iter().sum();
    let remainder = total_units.saturating_sub(floored);

    let mut ranked: Vec<usize> = (0..units.len()).collect();
    ranked.sort_by(|&a, &b| {
        fractions[b]
            .partial_cmp(&fractions[a])
            .unwrap_or(Ordering::Equal)
    });
    for step in 0..remainder as usize {
        units[ranked[step % ranked.len()]] += 1;
    }

    settle_drift(&mut units, total_units);
    units
}

/// Splits `total_units` evenly across `count` slots; the indivisible remainder goes to slot 0.
pub fn equal_split(count: usize, total_units: u64) -> Vec<u64> {
    if count == 0 {
        return Vec::new();
    }
    let share = total_units / count as u64;
    let mut units = vec![share; count];
    units[0] += total_units - share * count as u64;
    units
}

// Any residual after distribution lands on the single largest share.
fn settle_drift(units: &mut [u64], total_units: u64) {
    let sum: u64 = units.iter().sum();
    if sum == total_units {
        return;
    }
    let Some(largest) = (0..units.len()).max_by(|&a, &b| units[a].cmp(&units[b]).then(b.cmp(&a)))
    else {
        return;
    };
    if sum < total_units {
        units[largest] += total_units - sum;
    } else {
        units[largest] = units[largest].saturating_sub(sum - total_units);
    }
}

fn sanitize_weight(weight: f64) -> f64 {
    if weight.is_finite() && weight > 0.0 {
        weight
    } else {
        0.0
    }
}
