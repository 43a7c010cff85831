use clap::Parser;
use droid_locator::cli::commands::{cmd_dump, cmd_inspect, cmd_query, cmd_resolve};
use droid_locator::cli::config::{Cli, Commands, build_settings, load_config};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref());
    let settings = build_settings(&cli, &config);

    let output = match &cli.command {
        Commands::Resolve {
            point,
            snapshot,
            format,
        } => Some(cmd_resolve(point, snapshot, format, &settings)?),
        Commands::Inspect { point, snapshot } => Some(cmd_inspect(point, snapshot, &settings)?),
        Commands::Query {
            criteria,
            snapshot,
            format,
        } => Some(cmd_query(criteria, snapshot, format, &settings)?),
        Commands::Dump { output } => cmd_dump(output.as_deref(), &settings)?,
    };

    if let Some(text) = output {
        println!("{}", text.trim_end());
    }

    Ok(())
}

/// RUST_LOG wins; otherwise -v raises the level from warn.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("droid_locator={}", default_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
