// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! File-backed tracing setup. The terminal belongs to the TUI, so log lines
//! go to a file instead of stderr.
//!
//! Filter priority, highest first:
//!
//! 1. `ROPPO_LOG`
//! 2. `RUST_LOG`
//! 3. `[log].level` from the config
//! 4. `warn`

use anyhow::{Context, Result, anyhow};
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use crate::config::DEFAULT_LOG_LEVEL;

pub const LOG_ENV: &str = "ROPPO_LOG";

pub fn init(log_path: &Path, config_level: &str) -> Result<()> {
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| {
            format!(
                "open log file {} -- set [log].path to a writable location",
                log_path.display()
            )
        })?;

    let filter = build_env_filter(
        std::env::var(LOG_ENV).ok().as_deref(),
        std::env::var("RUST_LOG").ok().as_deref(),
        config_level,
    );
    let fmt_layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_level(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|error| anyhow!("install log subscriber: {error}"))?;
    tracing::debug!(path = %log_path.display(), "logging initialized");
    Ok(())
}

/// Unparseable env values fall through to the next source rather than
/// failing startup.
fn build_env_filter(
    project: Option<&str>,
    rust_log: Option<&str>,
    config_level: &str,
) -> EnvFilter {
    [project, rust_log, Some(config_level)]
        .into_iter()
        .flatten()
        .filter(|directives| !directives.trim().is_empty())
        .find_map(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_LEVEL))
}
