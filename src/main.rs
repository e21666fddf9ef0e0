use clap::Parser;
use log::LevelFilter;
use miette::Result;
use texopt::cli::{Cli, Commands};
use texopt::output::Printer;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let printer = Printer::new();

    match cli.command {
        Commands::Scan(args) => texopt::cli::scan::run(args, &printer)?,
        Commands::Optimize(args) => texopt::cli::optimize::run(args, &printer)?,
        Commands::Completions(args) => texopt::cli::completions::run(args)?,
    }

    Ok(())
}

/// Warnings by default, `-v` for info, `-vv` for debug. `RUST_LOG` wins.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}
