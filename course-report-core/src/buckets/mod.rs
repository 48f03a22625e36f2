pub mod bucket;
pub mod classify;
pub mod design;

pub use bucket::{Bucket, BucketBounds, BucketSet, ZERO_LABEL};
pub use classify::{classify, Histogram, HistogramCell};
pub use design::{design_buckets, MAX_INTERVALS};
