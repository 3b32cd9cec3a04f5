//! Bounded rolling price history.

use crate::types::PricePoint;
use std::collections::VecDeque;

/// Append-only price history capped at `max_history` points.
///
/// Insertion order is chronological order. When a push would exceed the
/// capacity, the oldest points are evicted first.
#[derive(Debug, Clone)]
pub struct RollingSeries {
    points: VecDeque<PricePoint>,
    max_history: usize,
}

impl RollingSeries {
    /// Create an empty series holding at most `max_history` points.
    pub fn new(max_history: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(max_history.min(4096)),
            max_history,
        }
    }

    /// Append a value stamped with the current time.
    ///
    /// Returns `false` (and leaves the series untouched) for non-finite input.
    pub fn push(&mut self, value: f64) -> bool {
        self.push_at(value, crate::now_millis())
    }

    /// Append a value with an explicit timestamp in epoch milliseconds.
    pub fn push_at(&mut self, value: f64, timestamp: i64) -> bool {
        if !value.is_finite() {
            return false;
        }

        self.points.push_back(PricePoint::new(timestamp, value));
        self.evict();
        true
    }

    fn evict(&mut self) {
        while self.points.len() > self.max_history {
            self.points.pop_front();
        }
    }

    /// Most recent value.
    pub fn last(&self) -> Option<f64> {
        self.points.back().map(|p| p.value)
    }

    /// Oldest retained value.
    pub fn first(&self) -> Option<f64> {
        self.points.front().map(|p| p.value)
    }

    /// Most recent point.
    pub fn last_point(&self) -> Option<&PricePoint> {
        self.points.back()
    }

    /// Values ordered oldest to newest.
    pub fn as_array(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// The newest `n` values (fewer if the series is shorter), oldest first.
    pub fn tail(&self, n: usize) -> Vec<f64> {
        let skip = self.points.len().saturating_sub(n);
        self.points.iter().skip(skip).map(|p| p.value).collect()
    }

    /// Iterate over the stored points, oldest first.
    pub fn points(&self) -> impl Iterator<Item = &PricePoint> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    /// Drop every stored point.
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Rebuild a series from previously recorded points.
    ///
    /// Non-finite values are skipped; only the newest `max_history` points are kept.
    pub fn from_points(max_history: usize, points: impl IntoIterator<Item = PricePoint>) -> Self {
        let mut series = Self::new(max_history);
        for point in points {
            series.push_at(point.value, point.timestamp);
        }
        series
    }
}
