use super::error::{Error, Result};
use super::{chart_for_base, DT_FORMAT};
use chrono::prelude::*;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    UpToDate,
    NeedsUpdate,
}

/// input path with its extension stripped
pub fn base_name(input: &Path) -> PathBuf {
    input.with_extension("")
}

/// input path with the extension replaced by the chart extension
pub fn chart_path(input: &Path) -> PathBuf {
    chart_for_base(&base_name(input))
}

fn fmt_mtime(t: SystemTime) -> String {
    DateTime::<Local>::from(t).format(DT_FORMAT).to_string()
}

/// Compares the chart and input modification times;
/// a missing chart counts as modified at the epoch.
pub fn check(input: &Path, force: bool) -> Result<Freshness> {
    if force {
        return Ok(Freshness::NeedsUpdate);
    }
    let input_mtime = std::fs::metadata(input)
        .and_then(|m| m.modified())
        .map_err(|e| Error::io(input, e))?;
    let chart = chart_path(input);
    let chart_mtime = match std::fs::metadata(&chart) {
        Ok(m) => m.modified().map_err(|e| Error::io(&chart, e))?,
        Err(_) => SystemTime::UNIX_EPOCH,
    };
    let freshness = if chart_mtime >= input_mtime {
        Freshness::UpToDate
    } else {
        Freshness::NeedsUpdate
    };
    log::debug!(
        "{}: data {}, chart {} -> {:?}",
        input.display(),
        fmt_mtime(input_mtime),
        fmt_mtime(chart_mtime),
        freshness
    );
    Ok(freshness)
}

/// Keeps the files whose chart needs (re)generation, preserving order.
pub fn filter_stale(found: &[PathBuf], force: bool) -> Result<Vec<PathBuf>> {
    let mut stale = Vec::with_capacity(found.len());
    for f in found {
        if check(f, force)? == Freshness::NeedsUpdate {
            stale.push(f.clone());
        }
    }
    Ok(stale)
}
