pub mod buckets;
pub mod export;
pub mod report;
pub mod snapshot;

pub use buckets::{classify, design_buckets, Bucket, BucketBounds, BucketSet, Histogram};
pub use course_report_common::{CourseReportError, Result};
pub use export::{
    export_json, export_views_csv, write_completion_chart, write_completion_table,
    write_posts_report, write_views_csv, write_views_report,
};
pub use report::{
    build_completion_chart, build_completion_table, build_course_report, build_posts_report,
    build_views_report, CourseReport, ReportContext,
};
pub use snapshot::CourseSnapshot;
