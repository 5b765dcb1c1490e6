//! Archive download.

use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Download `url` to `dest`, buffering the whole body before writing.
///
/// The body goes to `<dest>.part` first and is renamed into place, so an
/// interrupted run never leaves a truncated archive at `dest`.
pub fn fetch_archive(url: &str, dest: &Path, timeout: Duration) -> Result<u64> {
    info!("Downloading {} -> {:?}", url, dest);

    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| network_error(url, e))?;

    let response = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(|e| network_error(url, e))?;
    debug!("Response status {}", response.status());

    let body = response.bytes().map_err(|e| network_error(url, e))?;

    let part = part_path(dest);
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(&part, &body)?;
    fs::rename(&part, dest)?;

    info!("Saved {} bytes to {:?}", body.len(), dest);
    Ok(body.len() as u64)
}

/// Download only when `dest` does not exist yet.
pub fn ensure_archive(url: &str, dest: &Path, timeout: Duration) -> Result<()> {
    if dest.exists() {
        debug!("Archive {:?} already present, skipping download", dest);
        return Ok(());
    }
    fetch_archive(url, dest, timeout).map(|_| ())
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

fn network_error(url: &str, source: reqwest::Error) -> Error {
    Error::NetworkFetch {
        url: url.to_string(),
        source,
    }
}
