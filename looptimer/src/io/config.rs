//! Scenario configuration stored as TOML (default `looptimer.toml`).

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::types::Strategy;

pub const DEFAULT_CONFIG_PATH: &str = "looptimer.toml";

/// One loop iteration: a total budget and the steps run inside it, in order.
///
/// Missing top-level fields fall back to the built-in demo scenario.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Total loop budget in milliseconds.
    pub loop_budget_ms: u32,

    /// Stop running further steps once one reports `loop_timed_out`.
    pub abandon_on_loop_timeout: bool,

    pub steps: Vec<StepSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StepSpec {
    pub id: String,
    pub expected_duration_ms: u32,
    pub strategy: Strategy,
    /// Delay from step start until the simulated worker raises the event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_after_ms: Option<u32>,
}

impl StepSpec {
    pub fn new(id: &str, expected_duration_ms: u32, strategy: Strategy) -> Self {
        Self {
            id: id.to_string(),
            expected_duration_ms,
            strategy,
            event_after_ms: None,
        }
    }

    pub fn with_event_after(mut self, after_ms: u32) -> Self {
        self.event_after_ms = Some(after_ms);
        self
    }
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            loop_budget_ms: 7_000,
            abandon_on_loop_timeout: true,
            steps: vec![
                StepSpec::new("sensor", 2_500, Strategy::WaitEvent).with_event_after(2_000),
                StepSpec::new("actuate", 2_500, Strategy::WaitEventThenSettle)
                    .with_event_after(2_000),
                StepSpec::new("ack", 500, Strategy::WaitEvent).with_event_after(2_000),
                StepSpec::new("idle", 7_000, Strategy::SleepRemaining),
            ],
        }
    }
}

impl ScenarioConfig {
    pub fn validate(&self) -> Result<()> {
        if self.loop_budget_ms == 0 {
            return Err(anyhow!("loop_budget_ms must be > 0"));
        }
        if self.steps.is_empty() {
            return Err(anyhow!("steps must contain at least one step"));
        }
        let mut seen = HashSet::new();
        for step in &self.steps {
            if step.id.trim().is_empty() {
                return Err(anyhow!("step id must be non-empty"));
            }
            if !seen.insert(step.id.as_str()) {
                return Err(anyhow!("duplicate step id: {}", step.id));
            }
            if step.strategy.needs_event() && step.event_after_ms.is_none() {
                return Err(anyhow!(
                    "step {} uses {:?} and needs event_after_ms",
                    step.id,
                    step.strategy
                ));
            }
        }
        Ok(())
    }
}

/// Load a scenario from a TOML file.
///
/// If the file is missing, returns `ScenarioConfig::default()`.
pub fn load_config(path: &Path) -> Result<ScenarioConfig> {
    if !path.exists() {
        let cfg = ScenarioConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: ScenarioConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write a scenario to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &ScenarioConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize scenario toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}
