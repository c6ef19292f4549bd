use std::{
    io::{self, Write},
    path::PathBuf,
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{Confirm, HttpProjectService, Shell};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod render;

use commands::{Command, Flow};

#[derive(Parser, Debug)]
#[command(about = "Terminal client for the projects service")]
struct Args {
    /// Overrides the service base URL from the config file and environment.
    #[arg(long)]
    api_base_url: Option<String>,
    #[arg(long, default_value = "projects.toml")]
    config: PathBuf,
}

/// Asks on the terminal; anything but an explicit yes declines.
struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{prompt} [y/N] ");
        let _ = io::stdout().flush();
        let mut answer = String::new();
        if io::stdin().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let settings = config::load_settings(&args.config, args.api_base_url.as_deref())
        .context("failed to load client configuration")?;
    info!(api_base_url = %settings.api_base_url, "console: starting");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build client runtime")?;

    let service = Arc::new(HttpProjectService::new(settings.api_base_url.clone()));
    let mut shell = runtime.block_on(Shell::mount(service, Arc::new(TerminalConfirm), &settings));
    println!("{}", render::render_shell(&shell));
    println!("type 'help' for commands");

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush().context("failed to flush stdout")?;

        let mut line = String::new();
        if stdin.read_line(&mut line).context("failed to read command")? == 0 {
            break;
        }

        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };

        match runtime.block_on(commands::execute(&mut shell, command)) {
            Flow::Quit => break,
            Flow::Continue(note) => {
                if let Some(note) = note {
                    println!("{note}");
                }
                println!("{}", render::render_shell(&shell));
            }
        }
    }

    shell.unmount();
    info!("console: exiting");
    Ok(())
}
