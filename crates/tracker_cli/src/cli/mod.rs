use clap::{Parser, Subcommand};
use tracker_core::config::ConfigOverrides;
use tracker_core::error::AppError;
use tracker_core::filter::{PriorityFilter, SortKey, StatusFilter};

#[derive(Parser, Debug)]
#[command(name = "tracker", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new pending task
    ///
    /// Example: tracker add "Write report" --priority 2
    /// --start 2025-03-01T09:00:00Z --end 2025-03-01T17:00:00Z
    Add {
        title: Option<String>,
        /// Planned start (RFC3339)
        #[arg(long)]
        start: Option<String>,
        /// Planned end (RFC3339)
        #[arg(long)]
        end: Option<String>,
        /// 1 (highest) to 5 (lowest)
        #[arg(long, default_value_t = 3, allow_negative_numbers = true)]
        priority: i64,
    },
    /// List tasks through the status/priority filters
    ///
    /// Example: tracker list --status pending --priority 1 --sort endTime
    List {
        /// all, pending or finished
        #[arg(long)]
        status: Option<StatusFilter>,
        /// all or 1-5
        #[arg(long)]
        priority: Option<PriorityFilter>,
        /// startTime or endTime
        #[arg(long)]
        sort: Option<SortKey>,
    },
    /// Show details of a task
    ///
    /// Example: tracker show task-1
    Show { id: String },
    /// Mark a task as finished
    ///
    /// Example: tracker done task-1
    Done { id: String },
    /// Move a finished task back to pending
    ///
    /// Example: tracker reopen task-1
    Reopen { id: String },
    /// Show dashboard statistics
    ///
    /// Example: tracker stats
    Stats,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Theme,
    Status,
    Priority,
    Sort,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let (key_raw, value_raw) = raw
        .trim()
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let key = canonicalize_flag_name(key_raw)
        .ok_or_else(|| "override key cannot be empty".to_string())?;
    let target = match key.as_str() {
        "theme" => ConfigOverrideTarget::Theme,
        "status" | "default_status" => ConfigOverrideTarget::Status,
        "priority" | "default_priority" => ConfigOverrideTarget::Priority,
        "sort" | "default_sort" => ConfigOverrideTarget::Sort,
        other => return Err(format!("unknown config field '{other}'")),
    };

    Ok(ParsedConfigOverride {
        target,
        value: value_raw.trim().to_string(),
    })
}

/// Folds every `--config-override` argument into typed overrides; later entries win.
pub fn collect_config_overrides(raw: &[String]) -> Result<ConfigOverrides, AppError> {
    let mut overrides = ConfigOverrides::default();

    for entry in raw {
        let parsed = parse_config_override(entry).map_err(AppError::invalid_input)?;
        match parsed.target {
            ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
            ConfigOverrideTarget::Status => overrides.default_status = Some(parsed.value.parse()?),
            ConfigOverrideTarget::Priority => {
                overrides.default_priority = Some(parsed.value.parse()?)
            }
            ConfigOverrideTarget::Sort => overrides.default_sort = Some(parsed.value.parse()?),
        }
    }

    Ok(overrides)
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
