//! # VANGUARD Runner
//!
//! Headless entry point for the fan site's effects and back office:
//!
//! ```text
//! vanguard [--config fx.toml] [--frames N] [--catalog catalog.toml] [--offline] [--check-backend]
//! ```
//!
//! 1. Loads the effects config (defaults when omitted)
//! 2. Runs N frames of every effect into a command recorder and logs stats
//! 3. Loads and summarizes the content catalog, if given
//! 4. Runs the admin screens against an in-memory backend, if asked
//! 5. Pings the hosted backend, if asked
//!
//! Exits non-zero on bad config or an unreachable backend.

mod cli;
mod demo;
mod logging;
mod offline;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use vanguard_admin::{BackendConfig, ServiceHandle};
use vanguard_content::{Catalog, Role};
use vanguard_fx::{EffectsConfig, Viewport};

use crate::cli::Args;

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init_logging(args.verbose);

    match run(&args) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<ExitCode> {
    let config = match &args.config {
        Some(path) => EffectsConfig::load(path)
            .with_context(|| format!("failed to load effects config {}", path.display()))?,
        None => EffectsConfig::default(),
    };

    let viewport = Viewport::new(args.width, args.height);
    let summary = demo::run_page(&config, viewport, args.frames, args.dt);
    let stats = summary.stats;
    tracing::info!(
        frames = stats.frames,
        worst_frame_us = u64::try_from(stats.worst_frame.as_micros()).unwrap_or(u64::MAX),
        over_budget = stats.over_budget,
        entities = stats.active_entities,
        commands = summary.commands,
        circles = summary.circles,
        lines = summary.lines,
        "page run complete"
    );
    if summary.leaked_effects > 0 {
        tracing::warn!(leaked = summary.leaked_effects, "effects still registered after teardown");
    }

    let catalog = args
        .catalog
        .as_ref()
        .map(|path| Catalog::load(path).with_context(|| format!("failed to load catalog {}", path.display())))
        .transpose()?;
    if let Some(catalog) = &catalog {
        summarize_catalog(catalog);
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    if args.offline {
        let catalog = match catalog {
            Some(catalog) => catalog,
            None => Catalog::from_toml_str(offline::BUNDLED_CATALOG).context("bundled catalog is invalid")?,
        };
        let report = runtime.block_on(offline::run_back_office(&catalog, &args.search))?;
        tracing::info!(
            heroes = report.heroes,
            matched = report.matched,
            news_after_delete = report.news_after_delete,
            placeholders = report.placeholders,
            "offline back office run complete"
        );
    }

    if !args.check_backend {
        return Ok(ExitCode::SUCCESS);
    }

    let backend = match &args.backend_config {
        Some(path) => BackendConfig::load(path)
            .with_context(|| format!("failed to load backend config {}", path.display()))?,
        None => BackendConfig::from_env().context("backend credentials missing from environment")?,
    };
    let reachable = runtime.block_on(check_backend(&backend))?;
    Ok(if reachable {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}

fn summarize_catalog(catalog: &Catalog) {
    for role in Role::ALL {
        tracing::info!(role = role.label(), heroes = catalog.heroes_by_role(role).count(), "roster");
    }
    tracing::info!(
        news = catalog.news(None).len(),
        categories = catalog.news_categories().len(),
        game_info = catalog.game_info().len(),
        media = catalog.media().len(),
        "catalog loaded"
    );
}

async fn check_backend(config: &BackendConfig) -> Result<bool> {
    let service = ServiceHandle::connect(config).context("failed to build backend client")?;
    let report = service.check_connection().await;
    match &report.error {
        None => tracing::info!(
            latency_ms = u64::try_from(report.latency.as_millis()).unwrap_or(u64::MAX),
            "backend check passed"
        ),
        Some(reason) => tracing::error!(%reason, "backend check failed"),
    }
    Ok(report.reachable)
}
