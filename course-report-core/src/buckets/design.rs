use super::bucket::{Bucket, BucketSet};
use course_report_common::{CourseReportError, Result};

pub const MAX_INTERVALS: u64 = 10;

pub(crate) fn non_negative(count: i64) -> Result<u64> {
    u64::try_from(count).map_err(|_| CourseReportError::NegativeCount(count))
}

// floor(sqrt(span)) clamped to 1..=MAX_INTERVALS
fn interval_count(span: u64) -> u64 {
    (1..=MAX_INTERVALS)
        .take_while(|k| k * k <= span)
        .last()
        .unwrap_or(1)
}

/// Zero bucket first, then at most [`MAX_INTERVALS`] equal-width intervals over
/// the observed range, the last clamped to end on the maximum.
pub fn design_buckets(counts: &[i64]) -> Result<BucketSet> {
    let counts = counts
        .iter()
        .map(|&c| non_negative(c))
        .collect::<Result<Vec<u64>>>()?;

    let max = counts.iter().copied().max().unwrap_or(0);
    if max == 0 {
        return Ok(BucketSet::zero_only());
    }
    let min = counts.iter().copied().filter(|&c| c > 0).min().unwrap_or(max);

    let span = max - min + 1;
    let intervals = interval_count(span);
    let mut buckets = vec![Bucket::zero()];
    if intervals == 1 || max - min < intervals {
        buckets.push(Bucket::spanning(min, max));
    } else {
        let size = span.div_ceil(intervals);
        for i in 0..intervals {
            let lower = min + i * size;
            let upper = max.min(lower + size - 1);
            buckets.push(Bucket::spanning(lower, upper));
        }
    }
    Ok(BucketSet::from_designed(buckets))
}
