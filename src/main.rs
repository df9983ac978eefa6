use anyhow::Context;
use bitcoin_hub::adapter::inbound::cli::command::{Cli, ColorChoice, Commands};
use bitcoin_hub::adapter::inbound::cli::{check, output, serve};
use clap::Parser;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {}
    }
    output::configure(output::OutputConfig::new(cli.json, cli.quiet, cli.verbose));

    if let Err(e) = run(cli).await {
        output::error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command_or_default() {
        Commands::Serve(args) => serve::execute(&args).await.context("server stopped"),
        Commands::Check(args) => check::execute(&args).context("configuration check failed"),
    }
}
