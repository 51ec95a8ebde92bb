use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::geometry::{AngleRange, cumulative_angles};
use crate::normalize::{self, ChartEntry, Resolution};
use crate::payload::WeightEntry;

pub const MAX_PERCENTAGE: u32 = 100;

static LEADING_INT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*([+-]?\d+)").unwrap());

const DEFAULT_GOALS: [(&str, u32); 7] = [
    ("Groceries", 20),
    ("Travel", 15),
    ("Entertainment", 10),
    ("Shopping", 15),
    ("Bills", 20),
    ("Eating Out", 10),
    ("Everything Else", 10),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub name: String,
    pub percentage: u32,
}

impl Segment {
    pub fn new(name: impl Into<String>, percentage: u32) -> Self {
        Self {
            name: name.into(),
            percentage: percentage.min(MAX_PERCENTAGE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("segment index {index} is out of range for {len} segments")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("no segment named {0:?}")]
    UnknownName(String),
    #[error("segment name {0:?} appears more than once")]
    DuplicateName(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AllocationStatus {
    pub total: u32,
    pub balanced: bool,
    /// `100 - total`; negative when over-allocated.
    pub remaining: i64,
}

/// Ordered budget segments for one editing session.
///
/// Names and order are fixed at construction; only percentages change. The sum is allowed to
/// drift away from 100 while editing and is reported through [`AllocationStore::status`].
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationStore {
    segments: Vec<Segment>,
    slots: HashMap<String, usize>,
}

impl AllocationStore {
    pub fn new(segments: Vec<Segment>) -> Result<Self, StoreError> {
        let mut slots = HashMap::with_capacity(segments.len());
        let mut clamped = Vec::with_capacity(segments.len());
        for (index, segment) in segments.into_iter().enumerate() {
            if slots.insert(segment.name.clone(), index).is_some() {
                return Err(StoreError::DuplicateName(segment.name));
            }
            clamped.push(Segment::new(segment.name, segment.percentage));
        }
        Ok(Self {
            segments: clamped,
            slots,
        })
    }

    /// Seeds a store from server-supplied weights. Repeated names are merged, so construction
    /// cannot fail.
    pub fn from_weights(entries: &[WeightEntry]) -> Self {
        let shares = normalize::normalize(entries, Resolution::WholePercent);
        let segments: Vec<Segment> = shares
            .into_iter()
            .map(|share| Segment::new(share.name, share.units as u32))
            .collect();
        let slots = segments
            .iter()
            .enumerate()
            .map(|(index, segment)| (segment.name.clone(), index))
            .collect();
        Self { segments, slots }
    }

    /// The seven starter categories offered before any statement has been uploaded.
    pub fn default_goals() -> Self {
        let segments: Vec<Segment> = DEFAULT_GOALS
            .iter()
            .map(|(name, percentage)| Segment::new(*name, *percentage))
            .collect();
        let slots = segments
            .iter()
            .enumerate()
            .map(|(index, segment)| (segment.name.clone(), index))
            .collect();
        Self { segments, slots }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.slots.get(name).copied()
    }

    pub fn percentage_of(&self, name: &str) -> Option<u32> {
        self.index_of(name).map(|index| self.segments[index].percentage)
    }

    pub fn percentages(&self) -> impl Iterator<Item = u32> + '_ {
        self.segments.iter().map(|segment| segment.percentage)
    }

    /// Rounds `value` to the nearest integer, clamps it into `[0, 100]`, and stores it. Returns
    /// the stored value. Other segments are left alone.
    pub fn set_percentage(&mut self, index: usize, value: f64) -> Result<u32, StoreError> {
        let len = self.segments.len();
        let segment = self
            .segments
            .get_mut(index)
            .ok_or(StoreError::IndexOutOfRange { index, len })?;
        segment.percentage = clamp_percentage(value);
        Ok(segment.percentage)
    }

    pub fn set_percentage_by_name(&mut self, name: &str, value: f64) -> Result<u32, StoreError> {
        let index = self
            .index_of(name)
            .ok_or_else(|| StoreError::UnknownName(name.to_string()))?;
        self.set_percentage(index, value)
    }

    /// Manual entry from a text field: the leading integer is used (`"42%"` is 42), anything
    /// without one is 0.
    pub fn set_percentage_from_input(&mut self, index: usize, text: &str) -> Result<u32, StoreError> {
        let value = LEADING_INT_RE
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|digits| digits.as_str().parse::<f64>().ok())
            .unwrap_or(0.0);
        self.set_percentage(index, value)
    }

    pub fn total(&self) -> u32 {
        self.percentages().sum()
    }

    pub fn is_balanced(&self) -> bool {
        self.total() == MAX_PERCENTAGE
    }

    pub fn status(&self) -> AllocationStatus {
        let total = self.total();
        AllocationStatus {
            total,
            balanced: total == MAX_PERCENTAGE,
            remaining: i64::from(MAX_PERCENTAGE) - i64::from(total),
        }
    }

    pub fn angles(&self) -> Vec<AngleRange> {
        cumulative_angles(self.percentages().map(f64::from))
    }

    /// Rebalances to exactly 100 using the current percentages as weights, or an equal split
    /// (remainder on the first segment) when everything is zero. Returns `false` if the store
    /// was already balanced or is empty.
    pub fn auto_fill(&mut self) -> bool {
        if self.is_empty() || self.is_balanced() {
            return false;
        }
        let total_units = Resolution::WholePercent.total_units();
        let units = if self.total() == 0 {
            normalize::equal_split(self.len(), total_units)
        } else {
            let weights: Vec<f64> = self.percentages().map(f64::from).collect();
            normalize::largest_remainder(&weights, total_units)
        };
        debug!(before = self.total(), "auto-filling allocation to 100%");
        self.apply_units(&units);
        true
    }

    /// Re-seeds percentages from a fresh payload, keeping this store's names and order. Names the
    /// store does not know are ignored; names missing from the payload get 0.
    pub fn import_weights(&mut self, entries: &[WeightEntry]) {
        let mut incoming: HashMap<String, f64> = HashMap::new();
        for entry in normalize::aggregate(entries) {
            if self.slots.contains_key(&entry.name) {
                incoming.insert(entry.name, entry.weight);
            } else {
                debug!(name = %entry.name, "ignoring weight for unknown segment");
            }
        }
        let weights: Vec<f64> = self
            .segments
            .iter()
            .map(|segment| incoming.get(&segment.name).copied().unwrap_or(0.0))
            .collect();
        let units = normalize::largest_remainder(&weights, Resolution::WholePercent.total_units());
        self.apply_units(&units);
    }

    /// Renderer input in segment order, apportioned at hundredths so the values always sum to
    /// exactly 100 (or all 0). A balanced store passes through unchanged.
    pub fn chart_entries(&self) -> Vec<ChartEntry> {
        let entries: Vec<WeightEntry> = self
            .segments
            .iter()
            .map(|segment| WeightEntry::new(segment.name.clone(), f64::from(segment.percentage)))
            .collect();
        normalize::chart_entries(&entries)
    }

    /// Writes a neighbouring pair in one step. Both indices must be valid and both values already
    /// within `[0, 100]`.
    pub(crate) fn commit_pair(&mut self, first: (usize, u32), second: (usize, u32)) {
        debug_assert!(first.1 <= MAX_PERCENTAGE && second.1 <= MAX_PERCENTAGE);
        self.segments[first.0].percentage = first.1.min(MAX_PERCENTAGE);
        self.segments[second.0].percentage = second.1.min(MAX_PERCENTAGE);
    }

    fn apply_units(&mut self, units: &[u64]) {
        for (segment, units) in self.segments.iter_mut().zip(units) {
            segment.percentage = (*units).min(u64::from(MAX_PERCENTAGE)) as u32;
        }
    }
}

impl Default for AllocationStore {
    fn default() -> Self {
        Self::default_goals()
    }
}

fn clamp_percentage(value: f64) -> u32 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, f64::from(MAX_PERCENTAGE)) as u32
}
