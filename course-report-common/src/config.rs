use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_student_role")]
    pub student_role: String,
    #[serde(default = "default_excluded_types")]
    pub excluded_module_types: Vec<String>,
    #[serde(default = "default_post_actions")]
    pub post_actions: Vec<String>,
    #[serde(default = "default_view_action")]
    pub view_action: String,
}

fn default_student_role() -> String {
    "student".into()
}
fn default_excluded_types() -> Vec<String> {
    vec!["label".into()] // text and media areas have no views of their own
}
fn default_post_actions() -> Vec<String> {
    ["created", "submitted", "updated", "uploaded"]
        .iter()
        .map(|a| a.to_string())
        .collect()
}
fn default_view_action() -> String {
    "viewed".into()
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            student_role: default_student_role(),
            excluded_module_types: default_excluded_types(),
            post_actions: default_post_actions(),
            view_action: default_view_action(),
        }
    }
}

impl ReportConfig {
    pub fn is_excluded(&self, module_type: &str) -> bool {
        self.excluded_module_types.iter().any(|t| t == module_type)
    }

    pub fn is_post_action(&self, action: &str) -> bool {
        self.post_actions.iter().any(|a| a == action)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_label_width")]
    pub max_label_width: usize,
}

fn default_label_width() -> usize {
    32
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            max_label_width: default_label_width(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

fn default_format() -> String {
    "json".into()
}
fn default_output_dir() -> String {
    ".".into()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            output_dir: default_output_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

impl Config {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("course-report")
            .join("config.toml")
    }

    /// Path used by `load` and `save`: `$COURSE_REPORT_CONFIG` if set, else `config_path()`.
    pub fn resolved_path() -> PathBuf {
        match std::env::var("COURSE_REPORT_CONFIG") {
            Ok(env_path) => PathBuf::from(env_path),
            Err(_) => Self::config_path(),
        }
    }

    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::resolved_path())
    }

    pub fn load_from(path: &std::path::Path) -> crate::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::CourseReportError::Config(e.to_string()))
    }

    pub fn save(&self) -> crate::Result<()> {
        self.save_to(&Self::resolved_path())
    }

    pub fn save_to(&self, path: &std::path::Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::CourseReportError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
