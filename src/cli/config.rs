use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "form-pilot",
    version,
    about = "Automated filling and submission of multi-step quick-apply web forms"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: form-pilot.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Path to the Node.js bridge script
    #[arg(long, global = true)]
    pub bridge: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Walk a posting's application form, filling every step
    Apply {
        /// URL of the page carrying the application trigger
        #[arg(long)]
        url: String,

        /// YAML file with the profile and curated answers
        #[arg(long)]
        answers: Option<String>,

        /// Actually click submit on the review step (default: dry run)
        #[arg(long, default_value_t = false)]
        submit: bool,

        /// Maximum steps to walk before giving up
        #[arg(long)]
        max_steps: Option<usize>,

        /// Text of the button that opens the application dialog
        #[arg(long, default_value = "Easy Apply")]
        trigger: String,

        /// Append the session outcome to this JSONL journal
        #[arg(long)]
        journal: Option<String>,
    },

    /// Open the dialog and print the first step's classified fields
    Inspect {
        /// URL of the page carrying the application trigger
        #[arg(long)]
        url: String,

        /// Text of the button that opens the application dialog
        #[arg(long, default_value = "Easy Apply")]
        trigger: String,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `form-pilot.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub bridge: BridgeConfig,
    #[serde(default)]
    pub outcome: OutcomeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,

    /// Submission stays off unless explicitly enabled somewhere.
    #[serde(default)]
    pub allow_submit: bool,

    #[serde(default)]
    pub answers_file: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
            allow_submit: false,
            answers_file: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default = "default_bridge_script")]
    pub script: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            script: default_bridge_script(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutcomeConfig {
    pub journal: Option<String>,
}

// Serde default helpers
fn default_max_steps() -> usize {
    10
}
fn default_bridge_script() -> String {
    "node/form_bridge.js".to_string()
}

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or("form-pilot.yaml");
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_default(),
        Err(_) => AppConfig::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_safe() {
        let config = AppConfig::default();
        assert_eq!(config.session.max_steps, 10);
        assert!(!config.session.allow_submit);
    }

    #[test]
    fn partial_yaml_fills_in_defaults() {
        let config: AppConfig = serde_yaml::from_str("session:\n  max_steps: 4\n").unwrap();
        assert_eq!(config.session.max_steps, 4);
        assert!(!config.session.allow_submit);
        assert_eq!(config.bridge.script, "node/form_bridge.js");
    }
}
