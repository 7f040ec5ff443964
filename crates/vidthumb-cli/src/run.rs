use std::path::{Path, PathBuf};

use anyhow::Context;
use rayon::prelude::*;
use tracing::{error, info};

use vidthumb_core::config::ThumbnailerConfig;
use vidthumb_core::filter::FilmStripFilter;
use vidthumb_media::thumbnailer::VideoThumbnailer;

use crate::args::Args;

/// One input file and where its thumbnail goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub input: PathBuf,
    pub output: PathBuf,
}

pub fn plan_jobs(args: &Args) -> anyhow::Result<Vec<Job>> {
    let outputs = args.output_paths()?;
    Ok(args
        .inputs
        .iter()
        .cloned()
        .zip(outputs)
        .map(|(input, output)| Job { input, output })
        .collect())
}

/// Generates and saves one thumbnail. Every job gets its own thumbnailer,
/// so jobs can run on separate threads.
pub fn run_job(job: &Job, config: &ThumbnailerConfig, film_strip: bool) -> anyhow::Result<()> {
    let mut thumbnailer = VideoThumbnailer::with_config(config.clone());
    if film_strip {
        thumbnailer.add_filter(Box::new(FilmStripFilter::new()));
    }

    let image = thumbnailer
        .try_generate_thumbnail(&job.input)
        .with_context(|| format!("no thumbnail for {}", job.input.display()))?;
    save(&image, &job.output)?;

    info!(
        input = %job.input.display(),
        output = %job.output.display(),
        width = image.width(),
        height = image.height(),
        "thumbnail written"
    );
    Ok(())
}

fn save(image: &image::RgbImage, output: &Path) -> anyhow::Result<()> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    image
        .save(output)
        .with_context(|| format!("failed to write {}", output.display()))
}

/// Runs every job in parallel. Returns the number of inputs that failed.
pub fn run(args: &Args) -> anyhow::Result<usize> {
    let config = args.thumbnailer_config()?;
    let jobs = plan_jobs(args)?;

    let failures = jobs
        .par_iter()
        .filter(|job| match run_job(job, &config, args.film_strip) {
            Ok(()) => false,
            Err(e) => {
                error!(input = %job.input.display(), "{e:#}");
                true
            }
        })
        .count();
    Ok(failures)
}
