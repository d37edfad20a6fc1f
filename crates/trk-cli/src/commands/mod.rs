//! Command handlers for trk.
//!
//! Shared config and style resolution lives here; each subcommand that talks
//! to the backend has its own module.

pub mod fetch;
pub mod track;

use anyhow::{Context, Result};
use trk_config::{TrackerConfig, UnusedKeyPolicy};
use trk_timeline::Style;

use crate::SourceArgs;

/// Defaults or layered YAML, then environment, then command-line flags.
pub fn resolve_config(args: &SourceArgs) -> Result<TrackerConfig> {
    resolve_config_with(args, |k| std::env::var(k).ok())
}

/// [`resolve_config`] with an explicit environment lookup. Validation runs
/// once, after every override is applied.
fn resolve_config_with<F>(args: &SourceArgs, env: F) -> Result<TrackerConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut cfg = if args.config_paths.is_empty() {
        TrackerConfig::default()
    } else {
        let path_refs: Vec<&str> = args.config_paths.iter().map(|s| s.as_str()).collect();
        let loaded = trk_config::load_layered_yaml(&path_refs)?;
        trk_config::report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Warn)?;
        tracing::info!(config_hash = %loaded.config_hash, "config loaded");
        TrackerConfig::from_loaded(&loaded)?
    };

    cfg.apply_env_overrides(env);
    if let Some(url) = args.api_base_url.as_deref() {
        cfg.api.base_url = url.to_string();
    }
    if let Some(url) = args.push_url.as_deref() {
        cfg.push.url = url.to_string();
    }
    cfg.validate().context("config override rejected")?;
    Ok(cfg)
}

pub fn style_for(cfg: &TrackerConfig, args: &SourceArgs) -> Style {
    if cfg.display.ansi_colors && !args.no_color {
        Style::Ansi
    } else {
        Style::Plain
    }
}
