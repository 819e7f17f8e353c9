// Fans cropping and writing of parts out over a bounded group of workers

use anyhow::Result;
use crossbeam_channel::unbounded;
use image::DynamicImage;
use rayon::prelude::*;
use std::error::Error as _;
use std::fmt;
use std::path::{Path, PathBuf};
use std::thread;

use super::crop::crop;
use super::io_group::IoGroup;
use super::png_writer::write_part;
use crate::error::SplitError;
use crate::model::part::Part;

#[derive(Debug, Clone)]
pub struct SplitOptions {
    pub output_dir: PathBuf,
    /// Maximum parts in flight; `None` sizes the group to the open file limit.
    pub jobs: Option<usize>,
    /// Worker threads, 0 for one per core.
    pub thread_count: usize,
}

impl SplitOptions {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            jobs: None,
            thread_count: 0,
        }
    }

    pub fn with_jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn with_thread_count(mut self, thread_count: usize) -> Self {
        self.thread_count = thread_count;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Crop,
    Write,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Crop => f.write_str("crop"),
            Stage::Write => f.write_str("write"),
        }
    }
}

/// What happened to one part. `Display` gives the progress line.
#[derive(Debug)]
pub enum PartOutcome {
    Written {
        name: String,
        path: PathBuf,
    },
    Failed {
        name: String,
        stage: Stage,
        error: SplitError,
    },
}

impl PartOutcome {
    pub fn name(&self) -> &str {
        match self {
            PartOutcome::Written { name, .. } | PartOutcome::Failed { name, .. } => name,
        }
    }

    pub fn is_written(&self) -> bool {
        matches!(self, PartOutcome::Written { .. })
    }
}

impl fmt::Display for PartOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartOutcome::Written { name, .. } => write!(f, "wrote {}", name),
            PartOutcome::Failed { name, stage, error } => {
                write!(f, "failed to {} rule {}: {}", stage, name, error)?;
                let mut source = error.source();
                while let Some(cause) = source {
                    write!(f, ": {}", cause)?;
                    source = cause.source();
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SplitStats {
    pub total: usize,
    pub written: usize,
    pub failed: usize,
}

/// Crops one part out of the sprite and writes it below `output_dir`.
pub fn split_part(part: &Part, sprite: &DynamicImage, output_dir: &Path) -> PartOutcome {
    let failed = |stage, error| PartOutcome::Failed {
        name: part.name.clone(),
        stage,
        error,
    };

    let image = match crop(part, sprite) {
        Ok(image) => image,
        Err(e) => return failed(Stage::Crop, e),
    };

    match write_part(&image, &part.name, output_dir) {
        Ok(path) => PartOutcome::Written {
            name: part.name.clone(),
            path,
        },
        Err(e) => failed(Stage::Write, e),
    }
}

/// Splits every part out of the sprite concurrently.
///
/// Each part is handled by its own task holding an [`IoGroup`] permit while it
/// crops and writes. Exactly one outcome per part is handed to `on_outcome`,
/// on the calling thread and in completion order, before the group is joined.
/// A failing part never stops the others.
///
/// At most `min(thread_count, jobs)` parts are in flight. Without `jobs` the
/// group is sized to the open file limit, which is usually larger than the
/// pool, so the pool size is then the effective bound.
pub fn split_parts<F>(
    sprite: &DynamicImage,
    parts: &[Part],
    options: &SplitOptions,
    mut on_outcome: F,
) -> Result<SplitStats>
where
    F: FnMut(&PartOutcome),
{
    let group = IoGroup::with_fd_limit(options.jobs);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.thread_count)
        .build()?;
    let output_dir = options.output_dir.as_path();
    let (tx, rx) = unbounded::<PartOutcome>();

    let mut stats = SplitStats {
        total: parts.len(),
        ..SplitStats::default()
    };

    thread::scope(|s| {
        let group = &group;
        let pool = &pool;
        s.spawn(move || {
            pool.install(|| {
                parts.par_iter().for_each_with(tx, |tx, part| {
                    let _permit = group.take();
                    let _ = tx.send(split_part(part, sprite, output_dir));
                });
            });
        });

        for _ in 0..parts.len() {
            let Ok(outcome) = rx.recv() else {
                break;
            };
            if outcome.is_written() {
                stats.written += 1;
            } else {
                stats.failed += 1;
            }
            on_outcome(&outcome);
        }

        group.wait();
    });

    Ok(stats)
}
