use super::VERSION;
use clap::{App, AppSettings, Arg};
use std::ffi::OsString;
use std::path::PathBuf;

/// Snapshot of the command line, read-only for the rest of the run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunConfiguration {
    pub inputs: Vec<PathBuf>,
    pub verbose: bool,
    pub pause: bool,
    pub dry_run: bool,
    pub force: bool,
    pub all: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CliAction {
    Run(RunConfiguration),
    Version,
}

pub fn version_string() -> String {
    format!("mrg-stress-strain {}", VERSION.unwrap_or("unknown"))
}

fn build_app<'a, 'b>() -> App<'a, 'b> {
    let arg_input = Arg::with_name("input")
        .help("tsv file or directory to parse")
        .value_name("INPUT")
        .multiple(true);
    let arg_pause = Arg::with_name("pause")
        .help("wait a few seconds before exiting")
        .short("p")
        .long("pause");
    let arg_dry = Arg::with_name("dry_run")
        .help("just show the files to be processed")
        .short("n")
        .long("dry-run");
    let arg_force = Arg::with_name("force")
        .help("regenerate charts even when they are up to date")
        .short("f")
        .long("force");
    let arg_all = Arg::with_name("all")
        .help("process all files, even without the tsv extension")
        .short("a")
        .long("all");
    let arg_verbose = Arg::with_name("verbose")
        .help("print progress information")
        .short("V")
        .long("verbose");
    let arg_version = Arg::with_name("version")
        .help("print version information")
        .short("v")
        .long("version");
    App::new("mrg-stress-strain")
        .author("Tim Hartman")
        .about("plot stress/strain test data from tab separated files")
        .setting(AppSettings::DisableVersion)
        .arg(arg_input)
        .arg(arg_pause)
        .arg(arg_dry)
        .arg(arg_force)
        .arg(arg_all)
        .arg(arg_verbose)
        .arg(arg_version)
}

/// Parses the given arguments, the first one being the program name.
pub fn parse_cli_from<I, T>(args: I) -> Result<CliAction, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli_args = build_app().get_matches_from_safe(args)?;
    if cli_args.is_present("version") {
        return Ok(CliAction::Version);
    }
    let inputs = cli_args
        .values_of_os("input")
        .map(|vals| vals.map(PathBuf::from).collect())
        .unwrap_or_default();
    Ok(CliAction::Run(RunConfiguration {
        inputs,
        verbose: cli_args.is_present("verbose"),
        pause: cli_args.is_present("pause"),
        dry_run: cli_args.is_present("dry_run"),
        force: cli_args.is_present("force"),
        all: cli_args.is_present("all"),
    }))
}

/// Takes the CLI arguments of the process; prints usage and exits on errors.
pub fn parse_cli() -> CliAction {
    match parse_cli_from(std::env::args_os()) {
        Ok(action) => action,
        Err(e) => e.exit(),
    }
}
