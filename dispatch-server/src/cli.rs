//! CLI entry point (spec §6), derive style matching
//! `zenith-scheduler/src/main.rs`.

use clap::Parser;

/// GPU-aware inference delegator.
#[derive(Parser)]
#[command(name = "dispatch-server")]
#[command(about = "GPU-aware inference delegator for KubeAI")]
pub struct Args {
    /// System prompt for the one-shot inference run.
    #[arg(long)]
    pub system_prompt: String,

    /// User prompt for the one-shot inference run.
    #[arg(long)]
    pub user_prompt: String,

    /// Catalog model id.
    #[arg(short = 'm', long, default_value = "gemma2:9b")]
    pub model: String,

    /// Configuration file path.
    #[arg(long, default_value = "config.yaml")]
    pub config: String,
}
