use super::ReportContext;
use serde::Serialize;
use tracing::debug;

pub const CHART_TITLE: &str = "Course activity completion bar chart";

#[derive(Debug, Clone, Serialize)]
pub struct CompletionEntry {
    pub module_name: String,
    pub completed: u64,
    pub percentage: u64, // rounded share of qualifying students
}

/// Completion-tracked modules of one type within one section.
#[derive(Debug, Clone, Serialize, Default)]
pub struct CompletionCell {
    pub entries: Vec<CompletionEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletionRow {
    pub section: String,
    pub cells: Vec<CompletionCell>, // aligned with CompletionTable::activity_types
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletionTable {
    pub student_count: u64,
    pub activity_types: Vec<String>,
    pub rows: Vec<CompletionRow>,
}

impl CompletionTable {
    pub fn no_students(&self) -> bool {
        self.student_count == 0
    }
}

fn percentage(completed: u64, students: u64) -> u64 {
    if students == 0 {
        return 0;
    }
    (completed as f64 / students as f64 * 100.0).round() as u64
}

/// Section × activity-type table of completion counts. Only visible sections
/// and completion-tracked modules take part; no rows are built when the
/// course has no qualifying students.
pub fn build_completion_table(ctx: &ReportContext) -> CompletionTable {
    let snapshot = ctx.snapshot;
    let student_count = ctx.student_count();
    let activity_types = snapshot.module_types(true);
    if student_count == 0 {
        return CompletionTable {
            student_count,
            activity_types,
            rows: Vec::new(),
        };
    }

    let rows = snapshot
        .sections_in_order()
        .into_iter()
        .filter(|s| s.visible)
        .map(|section| {
            let cells = activity_types
                .iter()
                .map(|t| {
                    let entries = snapshot
                        .modules_of_type(t)
                        .into_iter()
                        .filter(|m| m.section_id == section.id && m.completion_enabled)
                        .map(|m| {
                            let completed = snapshot.completion_count(m, &ctx.students);
                            CompletionEntry {
                                module_name: m.instance_name.clone(),
                                completed,
                                percentage: percentage(completed, student_count),
                            }
                        })
                        .collect();
                    CompletionCell { entries }
                })
                .collect();
            CompletionRow {
                section: section.display_name(),
                cells,
            }
        })
        .collect::<Vec<_>>();
    debug!(rows = rows.len(), types = activity_types.len(), "built completion table");
    CompletionTable {
        student_count,
        activity_types,
        rows,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartSeries {
    pub name: String,
    pub values: Vec<u64>, // one per label
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletionChart {
    pub title: String,
    pub student_count: u64,
    pub labels: Vec<String>,
    pub series: Vec<ChartSeries>,
}

/// Bar-chart data: x-axis is every section in course order, one series per
/// completion-tracked activity type.
pub fn build_completion_chart(ctx: &ReportContext) -> CompletionChart {
    let snapshot = ctx.snapshot;
    let sections = snapshot.sections_in_order();
    let labels = sections.iter().map(|s| s.display_name()).collect();
    let series = snapshot
        .module_types(true)
        .into_iter()
        .map(|t| {
            let modules = snapshot.modules_of_type(&t);
            let values = sections
                .iter()
                .map(|section| {
                    modules
                        .iter()
                        .filter(|m| m.section_id == section.id)
                        .map(|m| snapshot.completion_count(m, &ctx.students))
                        .sum::<u64>()
                })
                .collect();
            ChartSeries { name: t, values }
        })
        .collect();
    CompletionChart {
        title: CHART_TITLE.to_string(),
        student_count: ctx.student_count(),
        labels,
        series,
    }
}
