// ABOUTME: Entry point for the skiff CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use commands::Context;
use skiff::config;
use skiff::error::Result;
use skiff::output::{Output, OutputMode};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins over the verbose flag
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let result = run(cli).await;

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut ctx = Context {
        project_dir: cli.project,
        config_path: cli.config,
        output: Output::new(OutputMode::from_flags(cli.quiet, cli.json)),
    };

    match cli.command {
        Commands::Build { tag, context } => commands::build(&mut ctx, tag.as_deref(), &context).await,
        Commands::Push { tag, tag_flag } => {
            let tag = Commands::push_tag(tag, tag_flag);
            commands::push(&mut ctx, tag.as_deref()).await
        }
        Commands::Deploy { tag, force_lock } => commands::deploy(&mut ctx, &tag, force_lock).await,
        Commands::Release {
            tag,
            context,
            force_lock,
        } => commands::release(&mut ctx, tag.as_deref(), &context, force_lock).await,
        Commands::Status => commands::status(&mut ctx).await,
        Commands::Tags { remote } => commands::tags(&mut ctx, remote).await,
        Commands::Init { name, force } => {
            let path = config::init_config(&ctx.project_dir, name.as_deref(), force)?;
            ctx.output.success(&format!("Created {}", path.display()));
            Ok(())
        }
        Commands::Version => {
            println!("skiff {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
