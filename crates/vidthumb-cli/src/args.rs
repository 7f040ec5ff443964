use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::Parser;

use vidthumb_core::config::ThumbnailerConfig;

/// Extension used when output names are derived from the input.
pub const DEFAULT_OUTPUT_EXTENSION: &str = "png";

/// vidthumb - pick a representative thumbnail for video files
#[derive(Parser, Debug, Clone)]
#[command(name = "vidthumb")]
#[command(about = "Extract a representative thumbnail from video files")]
#[command(version)]
pub struct Args {
    /// Video files to thumbnail
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output image (single input only); format follows the extension
    #[arg(short, long, conflicts_with = "output_dir")]
    pub output: Option<PathBuf>,

    /// Directory receiving `<stem>.png` for every input
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Longest side of the thumbnail in pixels
    #[arg(short, long)]
    pub size: Option<u32>,

    /// Seek position as a percentage of the duration (clamped to 95)
    #[arg(short = 't', long, conflicts_with = "seek_time")]
    pub seek_percentage: Option<u32>,

    /// Seek position as HH:MM:SS
    #[arg(long)]
    pub seek_time: Option<String>,

    /// Overlay film sprocket holes on both edges
    #[arg(short, long)]
    pub film_strip: bool,

    /// Choose the most typical of 25 consecutive frames
    #[arg(long)]
    pub smart: bool,

    /// Produce a square thumbnail, ignoring the aspect ratio
    #[arg(long)]
    pub no_aspect: bool,

    /// Skip seeking in h264 streams
    #[arg(long)]
    pub workaround: bool,

    /// JSON thumbnailer config; other flags override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Loads `--config` if given and applies the command line on top.
    pub fn thumbnailer_config(&self) -> anyhow::Result<ThumbnailerConfig> {
        let mut config = match &self.config {
            Some(path) => ThumbnailerConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => ThumbnailerConfig::default(),
        };

        if let Some(size) = self.size {
            if size == 0 {
                bail!("thumbnail size must be positive");
            }
            config.set_thumbnail_size(size);
        }
        if let Some(percentage) = self.seek_percentage {
            config.set_seek_percentage(percentage);
        }
        if let Some(time) = &self.seek_time {
            config.set_seek_time(time)?;
        }
        if self.smart {
            config.set_smart_frame_selection(true);
        }
        if self.no_aspect {
            config.set_maintain_aspect_ratio(false);
        }
        if self.workaround {
            config.set_work_around_issues(true);
        }
        Ok(config)
    }

    /// Output path for every input, in input order.
    pub fn output_paths(&self) -> anyhow::Result<Vec<PathBuf>> {
        if let Some(output) = &self.output {
            if self.inputs.len() > 1 {
                bail!("--output takes a single input, use --output-dir for several");
            }
            return Ok(vec![output.clone()]);
        }

        let dir = self.output_dir.clone().unwrap_or_default();
        self.inputs
            .iter()
            .map(|input| derived_output_path(&dir, input))
            .collect()
    }

    pub fn log_filter(&self) -> &'static str {
        if self.verbose { "debug" } else { "warn" }
    }
}

fn derived_output_path(dir: &Path, input: &Path) -> anyhow::Result<PathBuf> {
    let stem = input
        .file_stem()
        .with_context(|| format!("cannot derive an output name from {}", input.display()))?;
    Ok(dir.join(stem).with_extension(DEFAULT_OUTPUT_EXTENSION))
}
