/*
 * @file main.rs
 * @brief Hearth console entry point
 * @author Kevin Thomas
 * @date 2025
 *
 * MIT License
 *
 * Copyright (c) 2025 Kevin Thomas
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! Binary entry point that loads configuration and runs the console
//! conversation loop against the configured hub and chat service.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use hearth::assistant::Assistant;
use hearth::config::{AppConfig, CONFIG_PATH};
use hearth::history::History;

#[derive(Parser)]
#[command(name = "hearth")]
#[command(about = "Chat with your smart home and let the model operate it", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = CONFIG_PATH)]
    config: PathBuf,

    /// Persist conversation history to this JSON file
    #[arg(long)]
    history: Option<PathBuf>,

    /// Speak replies aloud
    #[arg(long)]
    speak: bool,

    /// Voice passed to `say -v` (implies --speak)
    #[arg(long)]
    voice: Option<String>,

    /// Ask for a short house summary before the first prompt
    #[arg(long)]
    greet: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = AppConfig::load(&cli.config);
    if let Some(path) = cli.history {
        config.history_path = Some(path);
    }
    if let Some(voice) = cli.voice {
        config.voice = Some(voice);
        config.speak_replies = true;
    }
    if cli.speak {
        config.speak_replies = true;
    }
    config.validate().context("Incomplete configuration")?;

    let history = match &config.history_path {
        Some(path) => History::load(path.clone()),
        None => History::ephemeral(),
    };
    tracing::info!(hub = %config.hub_url, model = %config.model(), "starting assistant");
    let assistant = Assistant::from_config(&config, history)?;
    assistant.run_console(cli.greet).await
}

/// Logs go to stderr so they never interleave with the conversation on stdout.
fn init_tracing(verbose: bool) {
    let default = if verbose { "hearth=debug" } else { "hearth=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
