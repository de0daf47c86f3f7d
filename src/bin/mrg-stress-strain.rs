use log::{error, info, LevelFilter};
use mrg_stress_strain::cli::{parse_cli, version_string, CliAction};
use mrg_stress_strain::{run, PAUSE_SECS};
use std::time::Duration;

fn main() {
    let config = match parse_cli() {
        CliAction::Version => {
            println!("{}", version_string());
            return;
        }
        CliAction::Run(config) => config,
    };

    let level = if config.verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .init();

    let summary = match run(&config) {
        Ok(s) => s,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    if config.dry_run {
        for f in summary.stale.iter() {
            println!("{}", f.display());
        }
    }

    if config.pause {
        info!("Fine, waiting {} seconds before exiting...", PAUSE_SECS);
        std::thread::sleep(Duration::from_secs(PAUSE_SECS));
    }
}
