use super::bucket::BucketSet;
use super::design::non_negative;
use course_report_common::{CourseReportError, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistogramCell {
    pub label: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Histogram {
    pub cells: Vec<HistogramCell>,
    // positive counts no bucket covered
    pub unmatched: u64,
}

impl Histogram {
    pub fn get(&self, label: &str) -> Option<u64> {
        self.cells.iter().find(|c| c.label == label).map(|c| c.count)
    }

    pub fn zero_views(&self) -> u64 {
        self.cells.first().map(|c| c.count).unwrap_or(0)
    }

    pub fn counts(&self) -> Vec<u64> {
        self.cells.iter().map(|c| c.count).collect()
    }

    pub fn total(&self) -> u64 {
        self.cells.iter().map(|c| c.count).sum()
    }
}

/// Students absent from `counts` stay in the zero bucket. Uncovered counts still
/// leave it, so `total() + unmatched == total_students`.
pub fn classify(counts: &[i64], buckets: &BucketSet, total_students: u64) -> Result<Histogram> {
    let counts = counts
        .iter()
        .map(|&c| non_negative(c))
        .collect::<Result<Vec<u64>>>()?;

    let observed = counts.iter().filter(|&&c| c > 0).count() as u64;
    if observed > total_students {
        return Err(CourseReportError::MoreViewersThanStudents {
            observed,
            students: total_students,
        });
    }

    let mut cells: Vec<HistogramCell> = buckets
        .buckets()
        .iter()
        .map(|b| HistogramCell {
            label: b.label().to_string(),
            count: 0,
        })
        .collect();
    cells[0].count = total_students;
    let mut unmatched = 0;

    for count in counts.into_iter().filter(|&c| c > 0) {
        match buckets.position(count) {
            Some(idx) => cells[idx].count += 1,
            None => {
                warn!(count, buckets = ?buckets.labels(), "no bucket covers view count");
                unmatched += 1;
            }
        }
        cells[0].count -= 1;
    }

    Ok(Histogram { cells, unmatched })
}
