// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result};
use config::Config;
use roppo_app::AppState;
use roppo_catalog::CatalogStore;
use roppo_notify::ReportSubmitter;
use roppo_viewer::ExternalViewer;
use runtime::CatalogRuntime;
use std::env;
use std::path::{Path, PathBuf};

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `roppo --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;
    logging::init(&config.log_path()?, config.log_level())?;

    let base_dir = env::current_dir().context("resolve current directory")?;
    let catalog_path = resolve_catalog_path(options.catalog_path.as_deref(), &config, &base_dir);
    let store = CatalogStore::load(&catalog_path).with_context(|| {
        format!(
            "load catalog {} -- pass --catalog, set [catalog].path or ROPPO_CATALOG_PATH",
            catalog_path.display()
        )
    })?;

    let viewer = ExternalViewer::new(
        config.viewer_opener()?,
        config.viewer_mode()?,
        config.pdf_viewer_base(),
        config.fetch_timeout()?,
    )
    .with_context(|| {
        format!(
            "invalid [viewer] config in {}; fix pdf_viewer_base/mode/command values",
            options.config_path.display()
        )
    })?;

    let reports = ReportSubmitter::sendgrid(
        config.report_settings(),
        config.report_base_url(),
        config.report_timeout()?,
    )
    .with_context(|| {
        format!(
            "invalid [report] config in {}; fix base_url/timeout values",
            options.config_path.display()
        )
    })?;
    if !reports.is_configured() {
        tracing::warn!(
            missing = ?reports.settings().missing(),
            "link reports are not configured"
        );
    }

    let content = config.panel_content()?;
    if options.check_only {
        return Ok(());
    }

    let mut runtime = CatalogRuntime::new(store, viewer, reports, content);
    roppo_tui::run_app(&mut AppState::default(), &mut runtime)
}

/// `--catalog` beats every config source; relative paths resolve against
/// the working directory.
fn resolve_catalog_path(flag: Option<&Path>, config: &Config, base_dir: &Path) -> PathBuf {
    match flag {
        Some(path) => base_dir.join(path),
        None => config.catalog_path(base_dir),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    catalog_path: Option<PathBuf>,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        catalog_path: None,
        print_config_path: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--catalog" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--catalog requires a CSV file path"))?;
                options.catalog_path = Some(PathBuf::from(value.as_ref()));
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("roppo: audit reference catalog browser");
    println!("  --config <path>          Use a specific config path");
    println!("  --catalog <path>         Read the catalog from this CSV file");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --check                  Validate config + catalog + startup dependencies");
    println!("  --help                   Show this help");
}
