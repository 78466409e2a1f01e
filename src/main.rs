// fataar-rs: Android library archive merger
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Entry point.
//!
//! ```text
//! cli::parse() --> ConfigLoader --> Logging --> Command Dispatch
//!   Version | Options | Inis | Table | Remap | Values | Sanitize
//!   Manifest | Merge
//! ```

use std::process::ExitCode;

use fataar_rs::cli::global::GlobalOptions;
use fataar_rs::cli::{self, Command};
use fataar_rs::cmd::config::{run_inis_command, run_options_command};
use fataar_rs::cmd::manifest::run_manifest_command;
use fataar_rs::cmd::merge::run_merge_command;
use fataar_rs::cmd::remap::run_remap_command;
use fataar_rs::cmd::resources::{run_sanitize_command, run_values_command};
use fataar_rs::cmd::table::run_table_command;
use fataar_rs::config::loader::ConfigLoader;
use fataar_rs::config::types::GlobalConfig;
use fataar_rs::config::{Config, DEFAULT_CONFIG_FILE, ENV_PREFIX};
use fataar_rs::error::Result;
use fataar_rs::logging::init_logging;
use fataar_rs::logging::{LogConfig, LogLevel};
use fataar_rs::store::BuildContext;

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Merged configuration plus the files it came from.
struct Loaded {
    config: Config,
    files: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::parse();

    let loaded = load_config(&cli.global);
    let log_config = match &loaded {
        Ok(loaded) => log_config_from(&loaded.config.global),
        Err(_) => log_config_from_cli(&cli.global),
    };
    let _log_guard = match init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    dispatch_command(&cli, loaded).await
}

fn log_config_from(global: &GlobalConfig) -> LogConfig {
    LogConfig::builder()
        .with_console_level(global.output_log_level)
        .with_file_level(global.file_log_level)
        .maybe_with_log_file(global.log_file.as_ref().map(|p| p.display().to_string()))
        .with_json_file(global.json_log)
        .build()
}

fn log_config_from_cli(global: &GlobalOptions) -> LogConfig {
    let console_level = global
        .log_level
        .and_then(LogLevel::from_u8)
        .unwrap_or(LogLevel::INFO);

    let file_level = global
        .file_log_level
        .and_then(LogLevel::from_u8)
        .unwrap_or(console_level);

    LogConfig::builder()
        .with_console_level(console_level)
        .with_file_level(file_level)
        .maybe_with_log_file(global.log_file.as_ref().map(|p| p.display().to_string()))
        .with_json_file(global.json_log)
        .build()
}

async fn dispatch_command(cli: &cli::Cli, loaded: Result<Loaded>) -> ExitCode {
    let result = match &cli.command {
        Some(Command::Version) => {
            handle_version_command();
            Ok(())
        }
        Some(Command::Options) => loaded.map(|loaded| run_options_command(&loaded.config)),
        Some(Command::Inis) => loaded.map(|loaded| run_inis_command(&loaded.files)),
        Some(command) => match loaded.and_then(|loaded| build_context(loaded.config)) {
            Ok(ctx) => run_with_context(command, &ctx).await,
            Err(e) => Err(e),
        },
        None => {
            eprintln!("No command specified. Use --help for usage information.");
            Err(anyhow::anyhow!("No command specified"))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run_with_context(command: &Command, ctx: &BuildContext) -> Result<()> {
    match command {
        Command::Table(args) => run_table_command(args, ctx),
        Command::Remap(args) => run_remap_command(args, ctx).await,
        Command::Values(args) => run_values_command(args, ctx),
        Command::Sanitize(args) => run_sanitize_command(args, ctx),
        Command::Manifest(args) => run_manifest_command(args, ctx).await,
        Command::Merge(args) => run_merge_command(args, ctx).await,
        Command::Version | Command::Options | Command::Inis => Ok(()),
    }
}

fn handle_version_command() {
    println!("{}", env!("CARGO_PKG_VERSION"));
}

/// Resolves the variant store and cancels the context on Ctrl+C.
fn build_context(config: Config) -> Result<BuildContext> {
    let ctx = BuildContext::from_config(config)?;
    let cancel_token = ctx.cancel_token().clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Received Ctrl+C, interrupting...");
            cancel_token.cancel();
        }
    });
    Ok(ctx)
}

fn build_config_loader(global: &GlobalOptions) -> Result<ConfigLoader> {
    let mut loader = ConfigLoader::new();
    if !global.no_default_config {
        loader = loader.add_toml_file_optional(DEFAULT_CONFIG_FILE);
    }
    for path in &global.configs {
        loader = loader.add_toml_file(path);
    }
    loader = loader.with_env_prefix(ENV_PREFIX);
    for assignment in global.to_config_overrides() {
        loader = loader.set_assignment(&assignment)?;
    }
    Ok(loader)
}

fn load_config(global: &GlobalOptions) -> Result<Loaded> {
    let loader = build_config_loader(global)?;
    let files = loader.format_loaded_files();
    let config = loader.build().map_err(|e| {
        eprintln!("Failed to load config: {e:#}");
        e
    })?;
    Ok(Loaded { config, files })
}
