use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::time::{Duration, Instant};

use tracing::{debug, info};
use ureq::Agent;

use crate::config::CacheConfig;
use crate::constants::cache::DOWNLOAD_BUFFER_BYTES;
use crate::errors::DatasetError;
use crate::transport::CancellationToken;

const MIB: f64 = 1024.0 * 1024.0;

/// Blocking HTTP client that streams a remote resource into a local file.
#[derive(Clone, Debug)]
pub struct HttpDownloader {
    agent: Agent,
    progress_interval: Duration,
}

impl HttpDownloader {
    /// Build a downloader honoring the timeout and progress settings of `config`.
    pub fn new(config: &CacheConfig) -> Self {
        let agent_config = Agent::config_builder()
            .timeout_global(config.timeout)
            .build();
        Self {
            agent: Agent::new_with_config(agent_config),
            progress_interval: config.progress_interval,
        }
    }

    /// Stream `url` into `dest`, returning the number of bytes written.
    ///
    /// Transport and HTTP status failures map to `Network`; local write failures
    /// map to `CacheIo`. `dest` may hold partial content on error and must be
    /// discarded by the caller.
    pub fn download_to(
        &self,
        url: &str,
        dest: &Path,
        cancel: Option<&CancellationToken>,
    ) -> Result<u64, DatasetError> {
        let network = |reason: String| DatasetError::Network {
            url: url.to_string(),
            reason,
        };
        check_cancelled(url, cancel)?;

        debug!("[recdata:http] GET {url}");
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|err| network(format!("request failed: {err}")))?;
        let expected_bytes = response
            .headers()
            .get("content-length")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok());
        let mut reader = response.into_body().into_reader();

        let mut file = File::create(dest)
            .map_err(|err| DatasetError::cache_io(dest, format!("failed creating file: {err}")))?;
        info!("[recdata:http] downloading {url} -> {}", dest.display());

        let started = Instant::now();
        let mut last_report = Instant::now();
        let mut total_bytes = 0u64;
        let mut buffer = vec![0u8; DOWNLOAD_BUFFER_BYTES];
        loop {
            check_cancelled(url, cancel)?;
            let read = reader
                .read(&mut buffer)
                .map_err(|err| network(format!("failed reading response body: {err}")))?;
            if read == 0 {
                break;
            }
            file.write_all(&buffer[..read])
                .map_err(|err| DatasetError::cache_io(dest, format!("failed writing: {err}")))?;
            total_bytes = total_bytes.saturating_add(read as u64);
            if last_report.elapsed() >= self.progress_interval {
                log_progress(url, total_bytes, expected_bytes, started.elapsed());
                last_report = Instant::now();
            }
        }
        file.sync_all()
            .map_err(|err| DatasetError::cache_io(dest, format!("failed flushing: {err}")))?;

        if let Some(expected) = expected_bytes
            && expected != total_bytes
        {
            return Err(network(format!(
                "truncated body: received {total_bytes} of {expected} bytes"
            )));
        }
        info!(
            "[recdata:http] download complete {url}: {:.1} MiB in {:.1}s",
            total_bytes as f64 / MIB,
            started.elapsed().as_secs_f64()
        );
        Ok(total_bytes)
    }
}

fn check_cancelled(url: &str, cancel: Option<&CancellationToken>) -> Result<(), DatasetError> {
    if cancel.is_some_and(CancellationToken::is_cancelled) {
        return Err(DatasetError::Cancelled {
            url: url.to_string(),
        });
    }
    Ok(())
}

fn log_progress(url: &str, total_bytes: u64, expected_bytes: Option<u64>, elapsed: Duration) {
    let elapsed = elapsed.as_secs_f64();
    match expected_bytes {
        Some(expected) if expected > 0 => {
            let pct = ((total_bytes as f64 / expected as f64) * 100.0).clamp(0.0, 100.0);
            let rate = if elapsed > 0.0 {
                total_bytes as f64 / elapsed
            } else {
                0.0
            };
            let eta_secs = if rate > 0.0 && total_bytes < expected {
                (expected - total_bytes) as f64 / rate
            } else {
                0.0
            };
            info!(
                "[recdata:http] download progress {url}: {:.1}/{:.1} MiB ({pct:.1}%, {elapsed:.1}s elapsed, ETA {eta_secs:.1}s)",
                total_bytes as f64 / MIB,
                expected as f64 / MIB,
            );
        }
        _ => info!(
            "[recdata:http] download progress {url}: {:.1} MiB ({elapsed:.1}s)",
            total_bytes as f64 / MIB,
        ),
    }
}
