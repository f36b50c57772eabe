//! Filesystem lookups: input selection, background discovery, output naming.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use vertcut_common::config::{DiscoveryConfig, NamingConfig};
use vertcut_common::error::{VertcutError, VertcutResult};

/// Timestamp format used in output names.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

fn has_extension(path: &Path, allowed: &[String]) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    allowed
        .iter()
        .any(|a| a.trim_start_matches('.').eq_ignore_ascii_case(ext))
}

fn file_name_lower(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Most recently modified video in `dir` that has not already been processed.
pub fn find_latest_video(
    dir: &Path,
    discovery: &DiscoveryConfig,
    naming: &NamingConfig,
) -> VertcutResult<PathBuf> {
    let processed = format!("{}_", naming.processed_prefix.to_lowercase());
    let entries = std::fs::read_dir(dir).map_err(|e| {
        VertcutError::no_input(format!("cannot read {}: {e}", dir.display()))
    })?;

    let mut latest: Option<(SystemTime, PathBuf)> = None;
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() || !has_extension(&path, &discovery.video_extensions) {
            continue;
        }
        if file_name_lower(&path).starts_with(&processed) {
            continue;
        }
        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        if latest.as_ref().map_or(true, |(t, _)| modified > *t) {
            latest = Some((modified, path));
        }
    }

    match latest {
        Some((_, path)) => {
            tracing::info!(path = %path.display(), "Selected latest input video");
            Ok(path)
        }
        None => Err(VertcutError::no_input(format!(
            "no video files ({}) in {}",
            discovery.video_extensions.join(", "),
            dir.display()
        ))),
    }
}

/// First image across the configured search directories, skipping screenshots.
pub fn find_background_image(discovery: &DiscoveryConfig) -> Option<PathBuf> {
    let markers: Vec<String> = discovery
        .screenshot_markers
        .iter()
        .map(|m| m.to_lowercase())
        .collect();

    for dir in &discovery.background_dirs {
        let Ok(entries) = std::fs::read_dir(dir) else {
            continue;
        };
        let mut candidates: Vec<PathBuf> = entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.is_file() && has_extension(p, &discovery.background_extensions))
            .collect();
        candidates.sort();

        for path in candidates {
            let name = file_name_lower(&path);
            if markers.iter().any(|m| name.contains(m.as_str())) {
                tracing::debug!(path = %path.display(), "Skipping screenshot");
                continue;
            }
            tracing::info!(path = %path.display(), "Found background image");
            return Some(path);
        }
    }

    tracing::info!("No background image found");
    None
}

/// `prefix_stem[_suffix]_timestamp.container` inside `output_dir`.
pub fn output_path(
    output_dir: &Path,
    input: &Path,
    naming: &NamingConfig,
    suffix: Option<&str>,
    timestamp: &str,
) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "video".to_string());
    let mut name = format!("{}_{stem}", naming.processed_prefix);
    if let Some(suffix) = suffix {
        name.push('_');
        name.push_str(suffix);
    }
    name.push('_');
    name.push_str(timestamp);
    name.push('.');
    name.push_str(naming.container.trim_start_matches('.'));
    output_dir.join(name)
}

/// Local time formatted with [`TIMESTAMP_FORMAT`].
pub fn timestamp_now() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Suffix for the `index`th (0-based) clip of a batch.
pub fn batch_suffix(index: usize) -> String {
    format!("clip_{:02}", index + 1)
}
