use log::info;
use plotters::prelude::*;
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
pub mod cli;
pub mod discover;
pub mod error;
pub mod freshness;
pub mod pdf;
pub mod render;

use cli::RunConfiguration;
use error::{Error, Result};

pub const VERSION: Option<&str> = option_env!("CARGO_PKG_VERSION");

pub const DT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const DATA_EXTENSION: &str = "tsv";
pub const PLOT_EXTENSION: &str = "pdf";

/// The first column holds fractional days; elapsed times are in seconds.
pub const SECONDS_PER_DAY: f64 = 86400.;

/// seconds to wait before exiting with --pause
pub const PAUSE_SECS: u64 = 3;

const MIN_FIELDS: usize = 5;

/// One stress/strain test: four parallel columns of equal length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleSeries {
    pub elapsed: Vec<f64>,
    pub load: Vec<f64>,
    pub stroke: Vec<f64>,
    pub strain: Vec<f64>,
}

impl SampleSeries {
    pub fn new(capacity: usize) -> SampleSeries {
        SampleSeries {
            elapsed: Vec::with_capacity(capacity),
            load: Vec::with_capacity(capacity),
            stroke: Vec::with_capacity(capacity),
            strain: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.elapsed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elapsed.is_empty()
    }

    /// Reads the tab separated columns time, load, stroke, _, strain.
    /// The first timestamp is the origin, later ones become seconds since it.
    /// Load, stroke and strain are set to NAN when not numeric,
    /// but a short line or a bad timestamp fails the whole file.
    pub fn from_reader<R: BufRead>(reader: R, source: &Path) -> Result<SampleSeries> {
        let mut series = SampleSeries::new(10000);
        let mut origin: Option<f64> = None;
        for (i, l) in reader.lines().enumerate() {
            let l = l.map_err(|e| Error::io(source, e))?;
            let parse_error = |reason: String| Error::Parse {
                path: source.to_path_buf(),
                line: i + 1,
                reason,
            };
            let fields: Vec<&str> = l.split('\t').collect();
            if fields.len() < MIN_FIELDS {
                return Err(parse_error(format!(
                    "expected at least {} tab separated fields, found {}",
                    MIN_FIELDS,
                    fields.len()
                )));
            }
            let t: f64 = fields[0]
                .trim()
                .parse()
                .map_err(|_| parse_error(format!("invalid timestamp {:?}", fields[0])))?;
            let elapsed = match origin {
                Some(t0) => (t - t0) * SECONDS_PER_DAY,
                None => {
                    origin = Some(t);
                    0.
                }
            };
            series.elapsed.push(elapsed);
            series.load.push(parse_or_nan(fields[1]));
            series.stroke.push(parse_or_nan(fields[2]));
            series.strain.push(parse_or_nan(fields[4]));
        }
        Ok(series)
    }

    pub fn from_tsv(fin: &Path) -> Result<SampleSeries> {
        let file = File::open(fin).map_err(|e| Error::io(fin, e))?;
        SampleSeries::from_reader(BufReader::new(file), fin)
    }

    /// plots the series to `<base>.pdf`, overwriting it, and returns the chart path
    pub fn plot(&self, base: &Path) -> Result<PathBuf> {
        let fout = chart_for_base(base);
        let (width, height) = render::CHART_SIZE;
        let mut buffer = vec![0u8; (width * height * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, render::CHART_SIZE)
                .into_drawing_area();
            render::draw_chart(&root, self)?;
        }
        pdf::write_image_page(&fout, &buffer, render::CHART_SIZE)?;
        Ok(fout)
    }
}

fn parse_or_nan(field: &str) -> f64 {
    field.trim().parse().unwrap_or(f64::NAN)
}

/// appends the chart extension, so `run.a` becomes `run.a.pdf`
pub fn chart_for_base(base: &Path) -> PathBuf {
    let mut name: OsString = base.as_os_str().to_owned();
    name.push(".");
    name.push(PLOT_EXTENSION);
    PathBuf::from(name)
}

/// Parses one data file, returning its base name and its samples.
pub fn parse(fin: &Path) -> Result<(PathBuf, SampleSeries)> {
    let series = SampleSeries::from_tsv(fin)?;
    Ok((freshness::base_name(fin), series))
}

/// What a run found and did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub found: Vec<PathBuf>,
    pub stale: Vec<PathBuf>,
    pub rendered: Vec<PathBuf>,
}

/// discovery, freshness filter, then parse and plot each stale file in order;
/// the first error aborts the remaining files
pub fn run(config: &RunConfiguration) -> Result<RunSummary> {
    let ext = DATA_EXTENSION.to_uppercase();
    if config.all {
        info!("Skipping check for .{} extension...", DATA_EXTENSION);
    }
    let found = discover::discover(&config.inputs, config.all)?;
    info!("Found {} {} file(s).", found.len(), ext);
    let stale = freshness::filter_stale(&found, config.force)?;
    info!("Updating {} {} file(s).", stale.len(), ext);

    let mut rendered = Vec::with_capacity(stale.len());
    if config.dry_run {
        info!("Dry run, no processing...");
    } else {
        for fin in &stale {
            info!("Parsing {}...", fin.display());
            let (base, series) = parse(fin)?;
            info!("Plotting {} ({} samples)...", fin.display(), series.len());
            let fout = series.plot(&base)?;
            info!("Finished with {}.", fin.display());
            rendered.push(fout);
        }
    }
    Ok(RunSummary {
        found,
        stale,
        rendered,
    })
}
