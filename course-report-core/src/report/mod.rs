pub mod completion;
pub mod posts;
pub mod views;

pub use completion::{
    build_completion_chart, build_completion_table, ChartSeries, CompletionChart, CompletionCell,
    CompletionEntry, CompletionRow, CompletionTable,
};
pub use posts::{build_posts_report, PostsReport, PostsRow, PostsTable};
pub use views::{build_views_report, ViewsReport, ViewsRow, ViewsTable};

use crate::snapshot::CourseSnapshot;
use course_report_common::{CourseReportError, ReportConfig, Result};
use serde::Serialize;
use std::collections::BTreeSet;

/// Inputs shared by every report: the snapshot, the report settings and the
/// resolved set of qualifying students.
pub struct ReportContext<'a> {
    pub snapshot: &'a CourseSnapshot,
    pub config: &'a ReportConfig,
    pub students: BTreeSet<i64>,
}

impl<'a> ReportContext<'a> {
    /// Fails when activity completion is off for the course; none of the
    /// reports are shown in that case.
    pub fn new(snapshot: &'a CourseSnapshot, config: &'a ReportConfig) -> Result<Self> {
        if !snapshot.course.completion_enabled {
            return Err(CourseReportError::CompletionDisabled(snapshot.course.id));
        }
        let students = snapshot.qualifying_students(&config.student_role);
        Ok(Self {
            snapshot,
            config,
            students,
        })
    }

    pub fn student_count(&self) -> u64 {
        self.students.len() as u64
    }
}

/// All four reports for one course.
#[derive(Debug, Clone, Serialize)]
pub struct CourseReport {
    pub course_id: i64,
    pub course_name: String,
    pub student_count: u64,
    pub completion_table: CompletionTable,
    pub completion_chart: CompletionChart,
    pub views: ViewsReport,
    pub posts: PostsReport,
}

pub fn build_course_report(snapshot: &CourseSnapshot, config: &ReportConfig) -> Result<CourseReport> {
    let ctx = ReportContext::new(snapshot, config)?;
    Ok(CourseReport {
        course_id: snapshot.course.id,
        course_name: snapshot.course.full_name.clone(),
        student_count: ctx.student_count(),
        completion_table: build_completion_table(&ctx),
        completion_chart: build_completion_chart(&ctx),
        views: build_views_report(&ctx)?,
        posts: build_posts_report(&ctx),
    })
}
