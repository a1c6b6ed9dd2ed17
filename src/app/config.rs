//! # Configuration
//!
//! The JSON configuration shared by every entry point. The file is read once
//! by the outermost command and turned into an immutable [`Config`] that is
//! handed to each component.
//!
//! Two loading modes exist: [`ConfigStore::load_interactive`] asks the
//! operator for missing values and persists them, while
//! [`ConfigStore::load_strict`] refuses to run with an incomplete file and
//! never blocks on input, which is what scheduled runs need.

use log::info;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "scc_config.json";

const DEFAULT_LANGUAGE: &str = "Dart";
const DEFAULT_SCC_TARGET: &str = "lib/";
const DEFAULT_SCC_BINARY: &str = "scc";
const TRUTHY: [&str; 5] = ["true", "1", "yes", "oui", "y"];

/// Whether a free-form answer counts as "yes".
pub fn is_truthy(answer: &str) -> bool {
    let answer = answer.trim().to_lowercase();
    TRUTHY.contains(&answer.as_str())
}

/// The keys the operator is asked about when they are missing or empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    RepoUrl,
    Branch,
    ReportDir,
    GraphDir,
    WebhookUrl,
    AutoGenerateGraphs,
}

impl ConfigKey {
    pub const REQUIRED: [ConfigKey; 6] = [
        ConfigKey::RepoUrl,
        ConfigKey::Branch,
        ConfigKey::ReportDir,
        ConfigKey::GraphDir,
        ConfigKey::WebhookUrl,
        ConfigKey::AutoGenerateGraphs,
    ];

    /// Name of the key in the JSON file
    pub fn name(self) -> &'static str {
        match self {
            ConfigKey::RepoUrl => "REPO_URL",
            ConfigKey::Branch => "BRANCH",
            ConfigKey::ReportDir => "REPORT_DIR",
            ConfigKey::GraphDir => "GRAPH_DIR",
            ConfigKey::WebhookUrl => "DISCORD_WEBHOOK_URL",
            ConfigKey::AutoGenerateGraphs => "AUTO_GENERATE_GRAPHS",
        }
    }

    fn question(self) -> &'static str {
        match self {
            ConfigKey::RepoUrl => "URL of the Git repository to analyse",
            ConfigKey::Branch => "Branch to analyse",
            ConfigKey::ReportDir => "Output directory for scc reports",
            ConfigKey::GraphDir => "Output directory for graphs",
            ConfigKey::WebhookUrl => "Discord webhook URL (leave empty if unused)",
            ConfigKey::AutoGenerateGraphs => "Generate graphs automatically? (true/false)",
        }
    }

    fn default_answer(self) -> &'static str {
        match self {
            ConfigKey::AutoGenerateGraphs => "true",
            _ => "",
        }
    }
}

/// The configuration file as stored on disk. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawConfig {
    #[serde(rename = "REPO_URL", default, skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,
    #[serde(rename = "BRANCH", default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(rename = "REPORT_DIR", default, skip_serializing_if = "Option::is_none")]
    pub report_dir: Option<String>,
    #[serde(rename = "GRAPH_DIR", default, skip_serializing_if = "Option::is_none")]
    pub graph_dir: Option<String>,
    #[serde(
        rename = "DISCORD_WEBHOOK_URL",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub webhook_url: Option<String>,
    #[serde(
        rename = "AUTO_GENERATE_GRAPHS",
        default,
        deserialize_with = "deserialize_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub auto_generate_graphs: Option<bool>,
    #[serde(
        rename = "TARGET_LANGUAGE",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub target_language: Option<String>,
    #[serde(rename = "SCC_TARGET_DIR", default, skip_serializing_if = "Option::is_none")]
    pub scc_target_dir: Option<String>,
    #[serde(rename = "SCC_BINARY", default, skip_serializing_if = "Option::is_none")]
    pub scc_binary: Option<String>,
    /// Keys this tool does not know about, kept so rewrites do not lose them
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Accepts `true`/`false` as well as hand-written strings like `"yes"`.
fn deserialize_flag<'de, D>(deserializer: D) -> std::result::Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(flag)) => Some(flag),
        Some(Value::String(text)) if !text.trim().is_empty() => Some(is_truthy(&text)),
        Some(Value::Number(n)) => Some(n.as_i64() == Some(1)),
        _ => None,
    })
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl RawConfig {
    /// Whether a key is absent or blank.
    pub fn is_missing(&self, key: ConfigKey) -> bool {
        match key {
            ConfigKey::RepoUrl => non_empty(&self.repo_url).is_none(),
            ConfigKey::Branch => non_empty(&self.branch).is_none(),
            ConfigKey::ReportDir => non_empty(&self.report_dir).is_none(),
            ConfigKey::GraphDir => non_empty(&self.graph_dir).is_none(),
            ConfigKey::WebhookUrl => non_empty(&self.webhook_url).is_none(),
            ConfigKey::AutoGenerateGraphs => self.auto_generate_graphs.is_none(),
        }
    }

    /// Store an operator answer for a key.
    pub fn fill(&mut self, key: ConfigKey, answer: String) {
        match key {
            ConfigKey::RepoUrl => self.repo_url = Some(answer),
            ConfigKey::Branch => self.branch = Some(answer),
            ConfigKey::ReportDir => self.report_dir = Some(answer),
            ConfigKey::GraphDir => self.graph_dir = Some(answer),
            ConfigKey::WebhookUrl => self.webhook_url = Some(answer),
            ConfigKey::AutoGenerateGraphs => self.auto_generate_graphs = Some(is_truthy(&answer)),
        }
    }
}

/// Validated configuration handed to every component.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub repo_url: String,
    pub branch: String,
    pub report_dir: PathBuf,
    pub graph_dir: PathBuf,
    pub webhook_url: Option<String>,
    pub auto_generate_graphs: bool,
    /// scc language whose counts are tracked
    pub target_language: String,
    /// Directory, relative to the repository root, that scc analyses
    pub scc_target_dir: String,
    /// Counting tool executable
    pub scc_binary: String,
}

impl Config {
    /// Validate a raw configuration. Relative directories are resolved
    /// against `base_dir`.
    pub fn from_raw(raw: &RawConfig, base_dir: &Path) -> Result<Self> {
        let required = |key: ConfigKey, value: &Option<String>| {
            non_empty(value)
                .map(str::to_string)
                .ok_or(Error::ConfigIncomplete(key.name()))
        };

        let repo_url = required(ConfigKey::RepoUrl, &raw.repo_url)?;
        let branch = required(ConfigKey::Branch, &raw.branch)?;
        let report_dir = base_dir.join(required(ConfigKey::ReportDir, &raw.report_dir)?);
        let graph_dir = base_dir.join(required(ConfigKey::GraphDir, &raw.graph_dir)?);
        let auto_generate_graphs = raw
            .auto_generate_graphs
            .ok_or(Error::ConfigIncomplete(ConfigKey::AutoGenerateGraphs.name()))?;

        Ok(Self {
            repo_url,
            branch,
            report_dir,
            graph_dir,
            webhook_url: non_empty(&raw.webhook_url).map(str::to_string),
            auto_generate_graphs,
            target_language: non_empty(&raw.target_language)
                .unwrap_or(DEFAULT_LANGUAGE)
                .to_string(),
            scc_target_dir: non_empty(&raw.scc_target_dir)
                .unwrap_or(DEFAULT_SCC_TARGET)
                .to_string(),
            scc_binary: non_empty(&raw.scc_binary)
                .unwrap_or(DEFAULT_SCC_BINARY)
                .to_string(),
        })
    }
}

/// Source of answers for missing configuration values.
pub trait Prompter {
    /// Ask a question; an empty answer yields `default`.
    fn ask(&mut self, question: &str, default: &str) -> io::Result<String>;
}

/// Reads answers from the terminal.
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn ask(&mut self, question: &str, default: &str) -> io::Result<String> {
        let mut stdout = io::stdout();
        write!(stdout, "{question} [{default}]: ")?;
        stdout.flush()?;

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        let answer = line.trim();
        Ok(if answer.is_empty() {
            default.to_string()
        } else {
            answer.to_string()
        })
    }
}

/// Reads and writes the configuration file.
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the file as stored, `None` if it does not exist yet.
    pub fn read_raw(&self) -> Result<Option<RawConfig>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&self.path)?;
        let raw = serde_json::from_str(&text).map_err(|source| Error::ConfigParse {
            path: self.path.clone(),
            source,
        })?;
        Ok(Some(raw))
    }

    /// Rewrite the whole file.
    pub fn save(&self, raw: &RawConfig) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut text = serde_json::to_string_pretty(raw)?;
        text.push('\n');
        fs::write(&self.path, text)?;
        Ok(())
    }

    /// Load the configuration, asking for every missing or blank key. The
    /// file is rewritten only when at least one answer was collected.
    pub fn load_interactive(&self, prompter: &mut dyn Prompter) -> Result<Config> {
        let mut raw = self.read_raw()?.unwrap_or_default();
        let mut changed = false;

        for key in ConfigKey::REQUIRED {
            if raw.is_missing(key) {
                let answer = prompter.ask(key.question(), key.default_answer())?;
                raw.fill(key, answer);
                changed = true;
            }
        }

        if changed {
            self.save(&raw)?;
            info!("Configuration saved to {}", self.path.display());
        }

        Config::from_raw(&raw, &std::env::current_dir()?)
    }

    /// Load the configuration without any interaction. A missing file or a
    /// missing required key is an error.
    pub fn load_strict(&self) -> Result<Config> {
        let raw = self
            .read_raw()?
            .ok_or_else(|| Error::ConfigMissing(self.path.clone()))?;
        Config::from_raw(&raw, &std::env::current_dir()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    /// Answers questions from a fixed list and records what was asked.
    struct ScriptedPrompter {
        answers: Vec<&'static str>,
        asked: Vec<String>,
    }

    impl ScriptedPrompter {
        fn new(answers: Vec<&'static str>) -> Self {
            Self {
                answers,
                asked: Vec::new(),
            }
        }
    }

    impl Prompter for ScriptedPrompter {
        fn ask(&mut self, question: &str, default: &str) -> io::Result<String> {
            self.asked.push(question.to_string());
            let answer = if self.answers.is_empty() {
                ""
            } else {
                self.answers.remove(0)
            };
            Ok(if answer.is_empty() {
                default.to_string()
            } else {
                answer.to_string()
            })
        }
    }

    const COMPLETE: &str = r#"{
  "REPO_URL": "https://example.com/app.git",
  "BRANCH": "main",
  "REPORT_DIR": "/tmp/scc_reports",
  "GRAPH_DIR": "/tmp/scc_graphs",
  "DISCORD_WEBHOOK_URL": "https://discord.com/api/webhooks/1/abc",
  "AUTO_GENERATE_GRAPHS": false
}"#;

    #[test]
    fn test_complete_config_needs_no_prompt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scc_config.json");
        fs::write(&path, COMPLETE).unwrap();

        let mut prompter = ScriptedPrompter::new(vec![]);
        let config = ConfigStore::new(&path)
            .load_interactive(&mut prompter)
            .unwrap();

        assert!(prompter.asked.is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), COMPLETE);
        assert_eq!(config.branch, "main");
        assert_eq!(config.report_dir, PathBuf::from("/tmp/scc_reports"));
        assert!(!config.auto_generate_graphs);
        assert_eq!(config.target_language, "Dart");
        assert_eq!(config.scc_target_dir, "lib/");
    }

    #[test]
    fn test_missing_keys_are_prompted_and_saved() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scc_config.json");
        fs::write(&path, r#"{"REPO_URL": "https://example.com/app.git", "BRANCH": ""}"#).unwrap();

        let mut prompter = ScriptedPrompter::new(vec!["develop", "/tmp/r", "/tmp/g", "", "Oui"]);
        let store = ConfigStore::new(&path);
        let config = store.load_interactive(&mut prompter).unwrap();

        assert_eq!(prompter.asked.len(), 5);
        assert_eq!(config.branch, "develop");
        assert_eq!(config.webhook_url, None);
        assert!(config.auto_generate_graphs);

        let saved = store.read_raw().unwrap().unwrap();
        assert_eq!(saved.repo_url.as_deref(), Some("https://example.com/app.git"));
        assert_eq!(saved.branch.as_deref(), Some("develop"));
        assert_eq!(saved.webhook_url.as_deref(), Some(""));
        assert_eq!(saved.auto_generate_graphs, Some(true));
    }

    #[test]
    fn test_auto_graph_default_is_true() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scc_config.json");

        let mut prompter = ScriptedPrompter::new(vec!["repo", "main", "r", "g", "hook"]);
        let config = ConfigStore::new(&path)
            .load_interactive(&mut prompter)
            .unwrap();

        assert!(config.auto_generate_graphs);
        assert!(path.exists());
    }

    #[test]
    fn test_invalid_json_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scc_config.json");
        fs::write(&path, "{ not json").unwrap();

        let mut prompter = ScriptedPrompter::new(vec![]);
        let result = ConfigStore::new(&path).load_interactive(&mut prompter);
        assert!(matches!(result, Err(Error::ConfigParse { .. })));
        assert!(prompter.asked.is_empty());
    }

    #[test]
    fn test_strict_mode() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scc_config.json");

        let store = ConfigStore::new(&path);
        assert!(matches!(store.load_strict(), Err(Error::ConfigMissing(_))));

        fs::write(&path, r#"{"REPO_URL": "x", "BRANCH": "main", "REPORT_DIR": "r"}"#).unwrap();
        assert!(matches!(
            store.load_strict(),
            Err(Error::ConfigIncomplete("GRAPH_DIR"))
        ));

        // The webhook is optional for headless runs
        fs::write(
            &path,
            r#"{"REPO_URL": "x", "BRANCH": "main", "REPORT_DIR": "r", "GRAPH_DIR": "g", "AUTO_GENERATE_GRAPHS": "yes"}"#,
        )
        .unwrap();
        let config = store.load_strict().unwrap();
        assert_eq!(config.webhook_url, None);
        assert!(config.auto_generate_graphs);
        assert!(config.report_dir.is_absolute());
    }

    #[test]
    fn test_unknown_keys_survive_rewrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scc_config.json");
        fs::write(&path, r#"{"REPO_URL": "x", "NOTES": "keep me"}"#).unwrap();

        let mut prompter = ScriptedPrompter::new(vec!["main", "r", "g", "", "no"]);
        let store = ConfigStore::new(&path);
        store.load_interactive(&mut prompter).unwrap();

        let saved = store.read_raw().unwrap().unwrap();
        assert_eq!(saved.extra.get("NOTES"), Some(&Value::from("keep me")));
        assert_eq!(saved.auto_generate_graphs, Some(false));
    }

    #[test]
    fn test_truthy_tokens() {
        for answer in ["true", "1", "YES", "oui", "y", " True "] {
            assert!(is_truthy(answer), "{answer}");
        }
        for answer in ["false", "0", "no", "", "nope"] {
            assert!(!is_truthy(answer), "{answer}");
        }
    }
}
