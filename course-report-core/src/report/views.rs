use super::ReportContext;
use crate::buckets::{classify, design_buckets, BucketSet, Histogram};
use crate::snapshot::CourseModule;
use course_report_common::Result;
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Serialize)]
pub struct ViewsRow {
    pub module_id: i64,
    pub module_name: String,
    pub section: String,
    pub total_views: u64, // raw sum over users, not derived from the histogram
    pub histogram: Histogram,
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewsTable {
    pub module_type: String,
    pub buckets: BucketSet,
    pub rows: Vec<ViewsRow>,
}

impl ViewsTable {
    /// Fixed columns followed by one per bucket.
    pub fn headers(&self) -> Vec<String> {
        let mut head = vec![
            "Module name".to_string(),
            "Course section".to_string(),
            "Total number of views".to_string(),
        ];
        head.extend(self.buckets.labels().into_iter().map(String::from));
        head
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewsReport {
    pub student_count: u64,
    pub tables: Vec<ViewsTable>,
}

fn instance_counts<'a>(
    ctx: &ReportContext,
    modules: Vec<&'a CourseModule>,
) -> Vec<(&'a CourseModule, Vec<i64>)> {
    modules
        .into_iter()
        .map(|m| {
            let counts = ctx
                .snapshot
                .view_counts(m, &ctx.config.view_action, &ctx.students)
                .into_values()
                .collect();
            (m, counts)
        })
        .collect()
}

/// Buckets come from the counts of every instance of the type so that all
/// rows share the same columns.
fn build_views_table(ctx: &ReportContext, module_type: &str) -> Result<ViewsTable> {
    let per_instance = instance_counts(ctx, ctx.snapshot.modules_of_type(module_type));

    let all: Vec<i64> = per_instance.iter().flat_map(|(_, c)| c.iter().copied()).collect();
    let buckets = design_buckets(&all)?;

    let rows = per_instance
        .into_iter()
        .map(|(m, counts)| {
            let histogram = classify(&counts, &buckets, ctx.student_count())?;
            Ok(ViewsRow {
                module_id: m.id,
                module_name: m.instance_name.clone(),
                section: ctx.snapshot.section_name(m.section_id),
                total_views: counts.iter().map(|&c| c as u64).sum(),
                histogram,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    debug!(module_type, buckets = buckets.len(), rows = rows.len(), "built views table");
    Ok(ViewsTable {
        module_type: module_type.to_string(),
        buckets,
        rows,
    })
}

/// One table per module type in the course, excluded types skipped. Types
/// share nothing and are built in parallel; table order stays sorted by type.
pub fn build_views_report(ctx: &ReportContext) -> Result<ViewsReport> {
    let types: Vec<String> = ctx
        .snapshot
        .module_types(false)
        .into_iter()
        .filter(|t| !ctx.config.is_excluded(t))
        .collect();
    let tables = types
        .par_iter()
        .map(|t| build_views_table(ctx, t))
        .collect::<Result<Vec<_>>>()?;
    Ok(ViewsReport {
        student_count: ctx.student_count(),
        tables,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{CourseSnapshot, Enrolment, LogEntry};
    use course_report_common::ReportConfig;

    fn view(user_id: i64, module_id: i64, times: usize) -> Vec<LogEntry> {
        (0..times)
            .map(|_| LogEntry {
                user_id,
                module_id,
                action: "viewed".into(),
                component: "mod_page".into(),
            })
            .collect()
    }

    fn snapshot() -> CourseSnapshot {
        let mut s = CourseSnapshot::from_json(
            r#"{
            "course": { "id": 1, "full_name": "History" },
            "sections": [{ "id": 1, "section": 0 }, { "id": 2, "section": 1, "name": "Rome" }],
            "modules": [
                { "id": 10, "module_type": "page", "instance_name": "Reading", "section_id": 2 },
                { "id": 11, "module_type": "page", "instance_name": "Map", "section_id": 1 },
                { "id": 12, "module_type": "label", "instance_name": "Banner", "section_id": 1 },
                { "id": 13, "module_type": "url", "instance_name": "Link", "section_id": 2 }
            ]
        }"#,
        )
        .unwrap();
        s.enrolments = (1..=6)
            .map(|user_id| Enrolment {
                user_id,
                role: "student".into(),
            })
            .collect();
        s.enrolments.push(Enrolment {
            user_id: 99,
            role: "teacher".into(),
        });
        // Reading: 1,2,3 and 10 views; Map: one student once; teacher views ignored
        s.log.extend(view(1, 10, 1));
        s.log.extend(view(2, 10, 2));
        s.log.extend(view(3, 10, 3));
        s.log.extend(view(4, 10, 10));
        s.log.extend(view(5, 11, 1));
        s.log.extend(view(99, 10, 40));
        s
    }

    #[test]
    fn tables_per_type_with_shared_buckets() {
        let s = snapshot();
        let config = ReportConfig::default();
        let ctx = ReportContext::new(&s, &config).unwrap();
        let report = build_views_report(&ctx).unwrap();
        assert_eq!(report.student_count, 6);

        let types: Vec<&str> = report.tables.iter().map(|t| t.module_type.as_str()).collect();
        assert_eq!(types, vec!["page", "url"]);

        let page = &report.tables[0];
        assert_eq!(
            page.buckets.labels(),
            vec!["0 views", "1-4 views", "5-8 views", "9-10 views"]
        );
        assert_eq!(page.headers().len(), 7);

        // Map sits in section 0 and so comes first
        assert_eq!(page.rows[0].module_name, "Map");
        assert_eq!(page.rows[0].section, "General");
        assert_eq!(page.rows[0].total_views, 1);
        assert_eq!(page.rows[0].histogram.counts(), vec![5, 1, 0, 0]);

        let reading = &page.rows[1];
        assert_eq!(reading.section, "Rome");
        assert_eq!(reading.total_views, 16);
        assert_eq!(reading.histogram.counts(), vec![2, 3, 0, 1]);
        assert_eq!(reading.histogram.total(), 6);
    }

    #[test]
    fn type_without_views_gets_zero_bucket_only() {
        let s = snapshot();
        let config = ReportConfig::default();
        let ctx = ReportContext::new(&s, &config).unwrap();
        let report = build_views_report(&ctx).unwrap();
        let url = &report.tables[1];
        assert_eq!(url.buckets.labels(), vec!["0 views"]);
        assert_eq!(url.rows[0].total_views, 0);
        assert_eq!(url.rows[0].histogram.counts(), vec![6]);
    }

    #[test]
    fn excluded_types_follow_config() {
        let s = snapshot();
        let config = ReportConfig {
            excluded_module_types: vec!["url".into()],
            ..ReportConfig::default()
        };
        let ctx = ReportContext::new(&s, &config).unwrap();
        let report = build_views_report(&ctx).unwrap();
        let types: Vec<&str> = report.tables.iter().map(|t| t.module_type.as_str()).collect();
        assert_eq!(types, vec!["label", "page"]);
    }
}
