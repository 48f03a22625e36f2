//! Labelled view-count intervals, one ordered set per module type.

use course_report_common::{CourseReportError, Result};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

pub const ZERO_LABEL: &str = "0 views";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BucketBounds {
    // seeded from enrolment, not from logs
    Zero,
    Single { value: u64 },
    Range { lower: u64, upper: u64 },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub(crate) label: String,
    pub(crate) bounds: BucketBounds,
}

impl Bucket {
    pub fn zero() -> Self {
        Self {
            label: ZERO_LABEL.into(),
            bounds: BucketBounds::Zero,
        }
    }

    pub fn single(value: u64) -> Self {
        let label = if value == 1 {
            "1 view".to_string()
        } else {
            format!("{value} views")
        };
        Self {
            label,
            bounds: BucketBounds::Single { value },
        }
    }

    pub fn spanning(lower: u64, upper: u64) -> Self {
        if lower == upper {
            return Self::single(lower);
        }
        Self {
            label: format!("{lower}-{upper} views"),
            bounds: BucketBounds::Range { lower, upper },
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn bounds(&self) -> BucketBounds {
        self.bounds
    }

    pub fn is_zero(&self) -> bool {
        self.bounds == BucketBounds::Zero
    }

    pub fn lower(&self) -> Option<u64> {
        match self.bounds {
            BucketBounds::Zero => None,
            BucketBounds::Single { value } => Some(value),
            BucketBounds::Range { lower, .. } => Some(lower),
        }
    }

    pub fn upper(&self) -> Option<u64> {
        match self.bounds {
            BucketBounds::Zero => None,
            BucketBounds::Single { value } => Some(value),
            BucketBounds::Range { upper, .. } => Some(upper),
        }
    }

    pub fn range(&self) -> Option<RangeInclusive<u64>> {
        Some(self.lower()?..=self.upper()?)
    }

    pub fn contains(&self, count: u64) -> bool {
        match self.bounds {
            BucketBounds::Zero => count == 0,
            BucketBounds::Single { value } => count == value,
            BucketBounds::Range { lower, upper } => lower <= count && count <= upper,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BucketSet {
    buckets: Vec<Bucket>,
}

impl BucketSet {
    pub fn zero_only() -> Self {
        Self {
            buckets: vec![Bucket::zero()],
        }
    }

    pub(crate) fn from_designed(buckets: Vec<Bucket>) -> Self {
        debug_assert!(Self::validate(&buckets).is_ok());
        Self { buckets }
    }

    /// Checks a caller-assembled layout: exactly one leading zero bucket,
    /// non-empty labels, no inverted ranges, strictly ascending and
    /// non-overlapping intervals.
    pub fn from_buckets(buckets: Vec<Bucket>) -> Result<Self> {
        Self::validate(&buckets)?;
        Ok(Self { buckets })
    }

    fn validate(buckets: &[Bucket]) -> Result<()> {
        let malformed = |msg: String| Err(CourseReportError::MalformedBuckets(msg));
        match buckets.first() {
            Some(b) if b.is_zero() => {}
            _ => return malformed("first bucket must be the zero bucket".into()),
        }
        let mut prev_upper: Option<u64> = None;
        for b in &buckets[1..] {
            if b.label.trim().is_empty() {
                return malformed("bucket with empty label".into());
            }
            let (lower, upper) = match b.bounds {
                BucketBounds::Zero => {
                    return malformed(format!("duplicate zero bucket '{}'", b.label))
                }
                BucketBounds::Single { value } => (value, value),
                BucketBounds::Range { lower, upper } => (lower, upper),
            };
            if lower == 0 {
                return malformed(format!("bucket '{}' overlaps the zero bucket", b.label));
            }
            if lower > upper {
                return malformed(format!("bucket '{}' has lower > upper", b.label));
            }
            if prev_upper.is_some_and(|p| lower <= p) {
                return malformed(format!(
                    "bucket '{}' overlaps or precedes the previous bucket",
                    b.label
                ));
            }
            prev_upper = Some(upper);
        }
        Ok(())
    }

    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    pub fn non_zero(&self) -> &[Bucket] {
        &self.buckets[1..]
    }

    pub fn labels(&self) -> Vec<&str> {
        self.buckets.iter().map(|b| b.label()).collect()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn position(&self, count: u64) -> Option<usize> {
        if count == 0 {
            return Some(0);
        }
        let rest = self.non_zero();
        // intervals are ascending, so the candidate is the last one starting at or below count
        let idx = rest.partition_point(|b| b.lower().is_some_and(|l| l <= count));
        let candidate = idx.checked_sub(1)?;
        rest[candidate].contains(count).then_some(candidate + 1)
    }

    pub fn find(&self, count: u64) -> Option<&Bucket> {
        self.position(count).map(|i| &self.buckets[i])
    }

    pub fn covered_range(&self) -> Option<RangeInclusive<u64>> {
        let first = self.non_zero().first()?.lower()?;
        let last = self.non_zero().last()?.upper()?;
        Some(first..=last)
    }
}
