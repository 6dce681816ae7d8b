use std::path::PathBuf;
use std::process;

use clap::Parser;
use log::error;

use geolog_domains::Config;

#[derive(Parser)]
#[command(name = "geolog-domains")]
#[command(version)]
#[command(about = "Extract region-filtered domains from a DNS query log")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE", default_value = "config.toml")]
    config: PathBuf,

    /// Output file, overrides [output] path
    #[arg(short = 'o', long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(level) = &cli.log_level {
        logger.parse_filters(level);
    }
    logger.init();

    let mut config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(err) => {
            error!("{}", err);
            process::exit(1);
        }
    };
    if let Some(output) = cli.output {
        config.output.path = Some(output);
    }

    if let Err(err) = geolog_domains::run(&config) {
        error!("{}", err);
        process::exit(1);
    }
}
