use super::ReportContext;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Serialize)]
pub struct PostsRow {
    pub module_id: i64,
    pub module_name: String,
    pub section: String,
    pub total_posts: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostsTable {
    pub module_type: String,
    pub rows: Vec<PostsRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostsReport {
    pub student_count: u64,
    pub tables: Vec<PostsTable>,
}

/// Post actions (created, submitted, updated, uploaded by default) by
/// qualifying students, one table per module type that has any. Modules
/// without posts are left out of their table.
pub fn build_posts_report(ctx: &ReportContext) -> PostsReport {
    let snapshot = ctx.snapshot;
    let tables: Vec<PostsTable> = snapshot
        .module_types(false)
        .into_iter()
        .filter(|t| !ctx.config.is_excluded(t))
        .filter_map(|t| {
            let rows: Vec<PostsRow> = snapshot
                .modules_of_type(&t)
                .into_iter()
                .filter_map(|m| {
                    let total_posts = snapshot.post_count(m, ctx.config, &ctx.students);
                    (total_posts > 0).then(|| PostsRow {
                        module_id: m.id,
                        module_name: m.instance_name.clone(),
                        section: snapshot.section_name(m.section_id),
                        total_posts,
                    })
                })
                .collect();
            (!rows.is_empty()).then_some(PostsTable {
                module_type: t,
                rows,
            })
        })
        .collect();
    debug!(tables = tables.len(), "built posts report");
    PostsReport {
        student_count: ctx.student_count(),
        tables,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::CourseSnapshot;
    use course_report_common::ReportConfig;

    const DOC: &str = r#"{
        "course": { "id": 4, "full_name": "Art" },
        "enrolments": [
            { "user_id": 1, "role": "student" },
            { "user_id": 2, "role": "student" },
            { "user_id": 8, "role": "teacher" }
        ],
        "sections": [{ "id": 1, "section": 0 }, { "id": 2, "section": 1 }],
        "modules": [
            { "id": 10, "module_type": "forum", "instance_name": "Chat", "section_id": 2 },
            { "id": 11, "module_type": "forum", "instance_name": "Quiet", "section_id": 2 },
            { "id": 12, "module_type": "assign", "instance_name": "Sketch", "section_id": 1 },
            { "id": 13, "module_type": "label", "instance_name": "Note", "section_id": 1 },
            { "id": 14, "module_type": "page", "instance_name": "Read", "section_id": 1 }
        ],
        "log": [
            { "user_id": 1, "module_id": 10, "action": "created", "component": "mod_forum" },
            { "user_id": 2, "module_id": 10, "action": "updated", "component": "mod_forum" },
            { "user_id": 2, "module_id": 10, "action": "viewed", "component": "mod_forum" },
            { "user_id": 8, "module_id": 11, "action": "created", "component": "mod_forum" },
            { "user_id": 1, "module_id": 12, "action": "submitted", "component": "mod_assign" },
            { "user_id": 1, "module_id": 12, "action": "uploaded", "component": "assignsubmission_file" },
            { "user_id": 1, "module_id": 13, "action": "created", "component": "mod_label" },
            { "user_id": 2, "module_id": 14, "action": "viewed", "component": "mod_page" }
        ]
    }"#;

    #[test]
    fn tables_only_for_types_with_posts() {
        let snapshot = CourseSnapshot::from_json(DOC).unwrap();
        let config = ReportConfig::default();
        let ctx = ReportContext::new(&snapshot, &config).unwrap();
        let report = build_posts_report(&ctx);
        assert_eq!(report.student_count, 2);

        let types: Vec<&str> = report.tables.iter().map(|t| t.module_type.as_str()).collect();
        assert_eq!(types, vec!["assign", "forum"]);

        let assign = &report.tables[0];
        assert_eq!(assign.rows[0].total_posts, 2);
        assert_eq!(assign.rows[0].section, "General");

        // teacher-only posts on "Quiet" do not count
        let forum = &report.tables[1];
        assert_eq!(forum.rows.len(), 1);
        assert_eq!(forum.rows[0].module_name, "Chat");
        assert_eq!(forum.rows[0].total_posts, 2);
        assert_eq!(forum.rows[0].section, "Topic 1");
    }

    #[test]
    fn custom_post_actions() {
        let snapshot = CourseSnapshot::from_json(DOC).unwrap();
        let config = ReportConfig {
            post_actions: vec!["uploaded".into()],
            ..ReportConfig::default()
        };
        let ctx = ReportContext::new(&snapshot, &config).unwrap();
        let report = build_posts_report(&ctx);
        assert_eq!(report.tables.len(), 1);
        assert_eq!(report.tables[0].module_type, "assign");
        assert_eq!(report.tables[0].rows[0].total_posts, 1);
    }
}
