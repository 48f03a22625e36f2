use course_report_common::{CourseReportError, ReportConfig, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

fn enabled() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub full_name: String,
    #[serde(default = "enabled")]
    pub completion_enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrolment {
    pub user_id: i64,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub id: i64,
    pub section: u32, // ordinal within the course, 0 is the general section
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "enabled")]
    pub visible: bool,
}

impl Section {
    pub fn display_name(&self) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ if self.section == 0 => "General".to_string(),
            _ => format!("Topic {}", self.section),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseModule {
    pub id: i64,
    pub module_type: String,
    pub instance_name: String,
    pub section_id: i64,
    #[serde(default)]
    pub completion_enabled: bool,
}

impl CourseModule {
    pub fn component(&self) -> String {
        format!("mod_{}", self.module_type)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionState {
    Incomplete,
    Complete,
    CompletePass,
    CompleteFail,
}

impl CompletionState {
    pub fn is_complete(self) -> bool {
        matches!(self, Self::Complete | Self::CompletePass)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    pub module_id: i64,
    pub user_id: i64,
    pub state: CompletionState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub user_id: i64,
    pub module_id: i64,
    pub action: String,
    pub component: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseSnapshot {
    pub course: Course,
    #[serde(default)]
    pub enrolments: Vec<Enrolment>,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub modules: Vec<CourseModule>,
    #[serde(default)]
    pub completions: Vec<Completion>,
    #[serde(default)]
    pub log: Vec<LogEntry>,
}

impl CourseSnapshot {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let snapshot: Self = serde_json::from_str(content)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    pub fn validate(&self) -> Result<()> {
        let ids: BTreeSet<i64> = self.sections.iter().map(|s| s.id).collect();
        match self.modules.iter().find(|m| !ids.contains(&m.section_id)) {
            Some(m) => Err(CourseReportError::UnknownSection {
                module_id: m.id,
                section_id: m.section_id,
            }),
            None => Ok(()),
        }
    }

    pub fn qualifying_students(&self, role: &str) -> BTreeSet<i64> {
        self.enrolments
            .iter()
            .filter(|e| e.role == role)
            .map(|e| e.user_id)
            .collect()
    }

    pub fn section(&self, id: i64) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn section_name(&self, id: i64) -> String {
        self.section(id)
            .map(Section::display_name)
            .unwrap_or_else(|| format!("Section {id}"))
    }

    pub fn sections_in_order(&self) -> Vec<&Section> {
        let mut sections: Vec<&Section> = self.sections.iter().collect();
        sections.sort_by_key(|s| (s.section, s.id));
        sections
    }

    pub fn module_types(&self, completion_only: bool) -> Vec<String> {
        self.modules
            .iter()
            .filter(|m| !completion_only || m.completion_enabled)
            .map(|m| m.module_type.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    // section ordinal, then id
    pub fn modules_of_type(&self, module_type: &str) -> Vec<&CourseModule> {
        let ordinal: HashMap<i64, u32> = self.sections.iter().map(|s| (s.id, s.section)).collect();
        let mut modules: Vec<&CourseModule> = self
            .modules
            .iter()
            .filter(|m| m.module_type == module_type)
            .collect();
        modules.sort_by_key(|m| (ordinal.get(&m.section_id).copied().unwrap_or(u32::MAX), m.id));
        modules
    }

    pub fn completion_count(&self, module: &CourseModule, students: &BTreeSet<i64>) -> u64 {
        self.completions
            .iter()
            .filter(|c| c.module_id == module.id && c.state.is_complete())
            .filter(|c| students.contains(&c.user_id))
            .map(|c| c.user_id)
            .collect::<BTreeSet<_>>()
            .len() as u64
    }

    /// Users who never viewed `module` are absent from the map.
    pub fn view_counts(
        &self,
        module: &CourseModule,
        view_action: &str,
        students: &BTreeSet<i64>,
    ) -> BTreeMap<i64, i64> {
        let component = module.component();
        let mut counts = BTreeMap::new();
        for entry in self.log.iter().filter(|l| {
            l.module_id == module.id
                && l.action == view_action
                && l.component == component
                && students.contains(&l.user_id)
        }) {
            *counts.entry(entry.user_id).or_insert(0) += 1;
        }
        counts
    }

    pub fn post_count(
        &self,
        module: &CourseModule,
        config: &ReportConfig,
        students: &BTreeSet<i64>,
    ) -> u64 {
        self.log
            .iter()
            .filter(|l| l.module_id == module.id && students.contains(&l.user_id))
            .filter(|l| config.is_post_action(&l.action))
            .count() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "course": { "id": 7, "full_name": "Intro" },
        "enrolments": [
            { "user_id": 1, "role": "student" },
            { "user_id": 2, "role": "student" },
            { "user_id": 2, "role": "student" },
            { "user_id": 9, "role": "editingteacher" }
        ],
        "sections": [
            { "id": 20, "section": 1 },
            { "id": 10, "section": 0 },
            { "id": 30, "section": 2, "name": "Week two", "visible": false }
        ],
        "modules": [
            { "id": 101, "module_type": "quiz", "instance_name": "Q1", "section_id": 20, "completion_enabled": true },
            { "id": 100, "module_type": "quiz", "instance_name": "Q0", "section_id": 10 },
            { "id": 102, "module_type": "page", "instance_name": "P", "section_id": 30 }
        ],
        "completions": [
            { "module_id": 101, "user_id": 1, "state": "complete_pass" },
            { "module_id": 101, "user_id": 2, "state": "complete_fail" },
            { "module_id": 101, "user_id": 9, "state": "complete" }
        ],
        "log": [
            { "user_id": 1, "module_id": 101, "action": "viewed", "component": "mod_quiz" },
            { "user_id": 1, "module_id": 101, "action": "viewed", "component": "mod_quiz" },
            { "user_id": 2, "module_id": 101, "action": "viewed", "component": "mod_quiz" },
            { "user_id": 9, "module_id": 101, "action": "viewed", "component": "mod_quiz" },
            { "user_id": 2, "module_id": 101, "action": "viewed", "component": "core" },
            { "user_id": 2, "module_id": 101, "action": "submitted", "component": "mod_quiz" },
            { "user_id": 9, "module_id": 101, "action": "submitted", "component": "mod_quiz" }
        ]
    }"#;

    fn snapshot() -> CourseSnapshot {
        CourseSnapshot::from_json(DOC).unwrap()
    }

    #[test]
    fn defaults_and_students() {
        let s = snapshot();
        assert!(s.course.completion_enabled);
        assert_eq!(s.qualifying_students("student").into_iter().collect::<Vec<_>>(), vec![1, 2]);
        assert!(s.qualifying_students("guest").is_empty());
    }

    #[test]
    fn section_names_and_order() {
        let s = snapshot();
        assert_eq!(s.section_name(10), "General");
        assert_eq!(s.section_name(20), "Topic 1");
        assert_eq!(s.section_name(30), "Week two");
        let order: Vec<i64> = s.sections_in_order().iter().map(|s| s.id).collect();
        assert_eq!(order, vec![10, 20, 30]);
    }

    #[test]
    fn module_types_and_order() {
        let s = snapshot();
        assert_eq!(s.module_types(false), vec!["page", "quiz"]);
        assert_eq!(s.module_types(true), vec!["quiz"]);
        let ids: Vec<i64> = s.modules_of_type("quiz").iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![100, 101]);
    }

    #[test]
    fn counts_only_qualifying_students() {
        let s = snapshot();
        let students = s.qualifying_students("student");
        let quiz = s.modules.iter().find(|m| m.id == 101).unwrap();
        assert_eq!(s.completion_count(quiz, &students), 1);

        let views = s.view_counts(quiz, "viewed", &students);
        assert_eq!(views.into_iter().collect::<Vec<_>>(), vec![(1, 2), (2, 1)]);

        let config = ReportConfig {
            post_actions: vec!["submitted".to_string()],
            ..ReportConfig::default()
        };
        assert_eq!(s.post_count(quiz, &config, &students), 1);
    }

    #[test]
    fn module_in_unknown_section_is_rejected() {
        let doc = r#"{
            "course": { "id": 1, "full_name": "X" },
            "sections": [{ "id": 1, "section": 0 }],
            "modules": [{ "id": 5, "module_type": "page", "instance_name": "P", "section_id": 2 }]
        }"#;
        let err = CourseSnapshot::from_json(doc).unwrap_err();
        assert!(matches!(
            err,
            CourseReportError::UnknownSection { module_id: 5, section_id: 2 }
        ));
    }

    #[test]
    fn invalid_json_is_json_error() {
        assert!(matches!(
            CourseSnapshot::from_json("{ nope").unwrap_err(),
            CourseReportError::Json(_)
        ));
    }
}
