use std::collections::BTreeSet;

use crate::error::{KiremeError, Result};

/// Segments shorter than or equal to this are discarded during planning.
pub const MIN_SEGMENT_SECS: f64 = 0.5;

/// A contiguous time range of source media between two adjacent retained
/// cut boundaries. Always `end > start`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
}

impl Segment {
    pub fn length(&self) -> f64 {
        self.end - self.start
    }
}

/// Derive the ordered segment list from raw cut points and total duration.
///
/// Cut points are rounded to whole milliseconds before deduplication, so
/// near-duplicates from repeated interactive toggling collapse
/// deterministically instead of depending on exact float equality. Points
/// outside the open interval `(0, duration)` are ignored. Adjacent boundary
/// pairs with length <= 0.5s are dropped, not merged into neighbours.
pub fn plan_segments(cut_points: &[f64], duration: f64) -> Result<Vec<Segment>> {
    if duration <= 0.0 {
        return Err(KiremeError::Validation(format!(
            "Total duration must be positive, got {}",
            duration
        )));
    }

    let duration_ms = to_millis(duration);
    let mut boundaries: BTreeSet<u64> = BTreeSet::new();
    boundaries.insert(0);
    boundaries.insert(duration_ms);
    for &point in cut_points {
        let ms = to_millis(point);
        if ms > 0 && ms < duration_ms {
            boundaries.insert(ms);
        }
    }

    let min_length_ms = to_millis(MIN_SEGMENT_SECS);
    let ordered: Vec<u64> = boundaries.into_iter().collect();
    let segments: Vec<Segment> = ordered
        .windows(2)
        .filter(|pair| pair[1] - pair[0] > min_length_ms)
        .map(|pair| Segment {
            start: pair[0] as f64 / 1000.0,
            end: pair[1] as f64 / 1000.0,
        })
        .collect();

    if segments.is_empty() {
        return Err(KiremeError::Validation(
            "No usable segments: every candidate segment is shorter than the minimum length"
                .to_string(),
        ));
    }

    Ok(segments)
}

fn to_millis(seconds: f64) -> u64 {
    (seconds.max(0.0) * 1000.0).round() as u64
}
