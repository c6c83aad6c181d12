// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! onboarder: onboarding documentation from git history and source
//!
//! This binary clones a repository, analyses its history and source, and
//! pipes one prompt per document to an external generator command.

use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use onboarder::config::{Command, Config};
use onboarder::output::document_file_name;
use onboarder::pipeline::{DocumentPipeline, ProgressEvent};
use onboarder::runner::Runner;
use onboarder_ai::{ContextCache, DisabledCacheStore, ResilientClient, SystemClock};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(config.log_level().into()))
        .with_writer(std::io::stderr)
        .init();

    config.validate()?;
    let request = config.run_request()?;
    let templates = Arc::new(config.template_set().context("loading templates")?);
    let runner = Runner::new(config.run_settings(), Arc::clone(&templates));

    let cancel = CancellationToken::new();
    spawn_cancel_watchers(&config, &cancel);

    info!(
        url = %request.repo_url,
        output = %runner.settings().output_dir.display(),
        "Starting onboarder"
    );

    let result = match config.command {
        Some(Command::Analyze) => runner.analyze(&request, &cancel).await.map(|analysis| {
            info!(
                commits = analysis.report.commits.len(),
                files = analysis.report.files.len(),
                hotspots = analysis.report.hotspots.len(),
                "Analysis complete"
            );
        }),
        None => {
            let generator = config.command_generator()?;
            info!(
                generator = generator.program(),
                model = %config.model,
                "Using generator command"
            );

            let client = ResilientClient::new(Arc::new(generator), config.retry_config());
            let cache = ContextCache::new(
                Arc::new(DisabledCacheStore),
                Arc::new(SystemClock),
                config.cache_config(),
            );
            let pipeline = DocumentPipeline::new(client, templates)
                .with_cache(Arc::new(cache))
                .with_generation_options(config.generation_options())
                .with_debug(config.debug_sink())
                .with_validation(config.validate_output)
                .with_progress(Box::new(log_progress));

            runner
                .run(&pipeline, &request, &cancel)
                .await
                .map(|documents| {
                    for key in documents.keys() {
                        info!(document = key, file = %document_file_name(key), "Generated");
                    }
                })
        }
    };

    if let Err(err) = result {
        error!(kind = %err.kind(), error = %err, "Run failed");
        return Err(err.into());
    }
    Ok(())
}

fn spawn_cancel_watchers(config: &Config, cancel: &CancellationToken) {
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling run");
            token.cancel();
        }
    });

    if let Some(timeout) = config.timeout() {
        let token = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            warn!(timeout_secs = timeout.as_secs(), "Run deadline reached, cancelling");
            token.cancel();
        });
    }
}

fn log_progress(event: &ProgressEvent) {
    match event {
        ProgressEvent::StageStarted { stage, index, total } => {
            info!(stage = %stage, step = index + 1, total, "Stage started");
        }
        ProgressEvent::StageCompleted { stage, chars } => {
            info!(stage = %stage, chars, "Stage completed");
        }
        ProgressEvent::ContextFallback { reason } => {
            warn!(reason = %reason, "Sending full repository context with each prompt");
        }
    }
}
