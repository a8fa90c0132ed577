// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Stopwatch binary: the server, and a small client for a running server.

use std::io;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use stopwatch_config::{Config, LoggingConfig};
use stopwatch_server::{render_status, ClientAction, StopwatchClient};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Stopwatch - track running time per day.
#[derive(Parser, Debug)]
#[command(name = "stopwatch", about = "Single-user stopwatch server", version)]
struct Args {
	/// Config file (defaults to /etc/stopwatch/stopwatch.toml)
	#[arg(long, short, global = true, env = "STOPWATCH_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
	/// Run the HTTP server (default)
	Serve,
	/// Start the stopwatch on a running server
	Start,
	/// Stop the stopwatch on a running server
	Stop,
	/// Print the current state of a running server
	Status,
	/// Print the built-in configuration as TOML
	DefaultConfig,
	/// Show version information
	Version,
}

/// What this process does. Chosen once from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
	Serve,
	Client(ClientAction),
	DefaultConfig,
	Version,
}

impl From<Option<Command>> for Mode {
	fn from(command: Option<Command>) -> Self {
		match command {
			None | Some(Command::Serve) => Mode::Serve,
			Some(Command::Start) => Mode::Client(ClientAction::Start),
			Some(Command::Stop) => Mode::Client(ClientAction::Stop),
			Some(Command::Status) => Mode::Client(ClientAction::Status),
			Some(Command::DefaultConfig) => Mode::DefaultConfig,
			Some(Command::Version) => Mode::Version,
		}
	}
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();
	run(Mode::from(args.command), args.config.as_deref()).await
}

async fn run(mode: Mode, config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
	match mode {
		Mode::Version => {
			println!("stopwatch {}", env!("CARGO_PKG_VERSION"));
			Ok(())
		}
		Mode::DefaultConfig => {
			print!("{}", stopwatch_config::default_config_toml()?);
			Ok(())
		}
		Mode::Serve => {
			let config = load_config(config_path)?;
			let _log_guard = init_tracing(&config, Console::Stdout)?;
			stopwatch_server::serve(config, shutdown_signal()).await?;
			Ok(())
		}
		Mode::Client(action) => {
			let config = load_config(config_path)?;
			let _log_guard = init_tracing(&config, Console::Stderr)?;
			let client = StopwatchClient::new(config.http.local_base_url())?;
			let snapshot = client.call(action).await?;
			println!("{}", render_status(&snapshot));
			Ok(())
		}
	}
}

fn load_config(path: Option<&Path>) -> Result<Config, stopwatch_config::ConfigError> {
	match path {
		Some(path) => stopwatch_config::load_config_with_file(path),
		None => stopwatch_config::load_config(),
	}
}

#[derive(Debug, Clone, Copy)]
enum Console {
	Stdout,
	Stderr,
}

/// Install the global subscriber and log the resolved configuration. Logs go
/// to the configured file when one is set, otherwise to `console`. The
/// returned guard flushes the file writer on drop.
fn init_tracing(
	config: &Config,
	console: Console,
) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error>> {
	let (writer, guard, ansi) = match &config.logging.file {
		Some(path) => {
			let dir = path
				.parent()
				.filter(|p| !p.as_os_str().is_empty())
				.unwrap_or_else(|| Path::new("."));
			let file_name = path.file_name().ok_or_else(|| {
				io::Error::new(
					io::ErrorKind::InvalidInput,
					format!("log file path has no file name: {}", path.display()),
				)
			})?;
			std::fs::create_dir_all(dir)?;
			let appender = tracing_appender::rolling::never(dir, file_name);
			let (non_blocking, guard) = tracing_appender::non_blocking(appender);
			(BoxMakeWriter::new(non_blocking), Some(guard), false)
		}
		None => match console {
			Console::Stdout => (BoxMakeWriter::new(io::stdout), None, true),
			Console::Stderr => (BoxMakeWriter::new(io::stderr), None, true),
		},
	};

	subscriber(&config.logging, writer, ansi).try_init()?;
	log_config(config);

	Ok(guard)
}

fn subscriber(
	config: &LoggingConfig,
	writer: BoxMakeWriter,
	ansi: bool,
) -> impl tracing::Subscriber + Send + Sync {
	tracing_subscriber::registry()
		.with(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| config.level.clone().into()),
		)
		.with(
			tracing_subscriber::fmt::layer()
				.with_writer(writer)
				.with_ansi(ansi),
		)
}

fn log_config(config: &Config) {
	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		href_prefix = %config.http.href_prefix,
		database = %config.database.url,
		day_start_hour = %config.stopwatch.day_start_hour,
		utc_offset = %config.stopwatch.utc_offset,
		"Configuration loaded"
	);
}

async fn shutdown_signal() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		tracing::error!(error = %e, "failed to listen for shutdown signal");
		std::future::pending::<()>().await;
	}
}
