// Runs a full split: sprite + stylesheets in, one image per part out

use anyhow::{Context, Result, bail};
use image::DynamicImage;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::css::parse_stylesheet;
use crate::model::part::Part;
use crate::pipeline::find::find_all;
use crate::pipeline::fs_ops::{collect_css_files, ensure_dir};
use crate::pipeline::parts::{distinct, scale};
use crate::pipeline::splitter::{PartOutcome, split_parts};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub written: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

pub fn load_sprite(path: &Path) -> Result<DynamicImage> {
    let bytes = fs::read(path).context("error reading sprite")?;
    image::load_from_memory(&bytes).context("error decoding sprite")
}

/// Reads every stylesheet in order and collects the parts they describe.
pub fn collect_parts(css_paths: &[PathBuf]) -> Result<Vec<Part>> {
    let mut parts = Vec::new();
    for css_path in collect_css_files(css_paths) {
        let file_name = css_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| css_path.display().to_string());
        info!("reading {}", file_name);

        let css = fs::read_to_string(&css_path)
            .with_context(|| format!("error reading css {}", css_path.display()))?;
        let sheet = parse_stylesheet(&css)
            .with_context(|| format!("failed to parse css {}", css_path.display()))?;
        info!("  - parsed {} rules", sheet.rules.len());

        let report = find_all(&sheet);
        for skipped in &report.skipped {
            debug!(
                "  - skipping rule #{} {}: {}",
                skipped.index, skipped.name, skipped.error
            );
        }
        for part in &report.parts {
            debug!("  - rule {}", part.info());
        }
        info!("  - found {} rectangles", report.parts.len());

        parts.extend(report.parts);
    }
    Ok(parts)
}

pub fn run(sprite_path: &Path, css_paths: &[PathBuf], config: &Config) -> Result<RunSummary> {
    let sprite = load_sprite(sprite_path)?;
    let start = Instant::now();

    let parts = collect_parts(css_paths)?;
    info!("total references: {}", parts.len());
    let mut parts = distinct(parts, config.named);
    info!("unique references: {}", parts.len());

    if config.ratio != 1 {
        info!("scaling rectangles by {}", config.ratio);
        parts = scale(&parts, config.ratio).context("failed to scale to ratio")?;
    }

    info!("writing to [{}]...", config.output_dir.display());
    ensure_dir(&config.output_dir).context("failed to create out directory")?;

    let stats = split_parts(
        &sprite,
        &parts,
        &config.split_options(),
        |outcome: &PartOutcome| info!("  - {}", outcome),
    )?;

    let summary = RunSummary {
        total: stats.total,
        written: stats.written,
        failed: stats.failed,
        elapsed: start.elapsed(),
    };
    info!("{} written, {} failed", summary.written, summary.failed);
    info!("done in {}ms", summary.elapsed.as_millis());

    if config.strict && summary.failed > 0 {
        bail!(
            "{} of {} parts could not be written",
            summary.failed,
            summary.total
        );
    }
    Ok(summary)
}
