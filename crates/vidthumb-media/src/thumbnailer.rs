use std::path::Path;

use image::RgbImage;
use tracing::{debug, warn};

use vidthumb_core::config::ThumbnailerConfig;
use vidthumb_core::filter::FrameFilter;
use vidthumb_core::frame::VideoFrame;
use vidthumb_core::histogram::Histogram;
use vidthumb_core::image_writer::ImageWriter;
use vidthumb_core::smart::{SMART_FRAME_ATTEMPTS, best_frame_index};

use crate::decoder::{FfmpegDecoder, VideoDecoder};
use crate::error::{MediaError, Result};

/// Codec for which seeking is skipped when `work_around_issues` is set.
/// Seeking in h264 made older decoders spin at full CPU.
const SEEK_WORKAROUND_CODEC: &str = "h264";

/// Produces one representative image per video file.
pub struct VideoThumbnailer {
    config: ThumbnailerConfig,
    filters: Vec<Box<dyn FrameFilter>>,
    image_writer: ImageWriter,
}

impl VideoThumbnailer {
    pub fn new() -> Self {
        Self::with_config(ThumbnailerConfig::default())
    }

    pub fn with_config(config: ThumbnailerConfig) -> Self {
        Self {
            config,
            filters: Vec::new(),
            image_writer: ImageWriter::new(),
        }
    }

    pub fn config(&self) -> &ThumbnailerConfig {
        &self.config
    }

    pub fn set_thumbnail_size(&mut self, size: u32) {
        self.config.set_thumbnail_size(size);
    }

    pub fn set_seek_percentage(&mut self, percentage: u32) {
        self.config.set_seek_percentage(percentage);
    }

    /// Accepts `HH:MM:SS`; a malformed time keeps the current seek setting.
    pub fn set_seek_time(&mut self, time: &str) -> Result<()> {
        self.config.set_seek_time(time)?;
        Ok(())
    }

    pub fn set_work_around_issues(&mut self, work_around: bool) {
        self.config.set_work_around_issues(work_around);
    }

    pub fn set_maintain_aspect_ratio(&mut self, maintain: bool) {
        self.config.set_maintain_aspect_ratio(maintain);
    }

    pub fn set_smart_frame_selection(&mut self, enabled: bool) {
        self.config.set_smart_frame_selection(enabled);
    }

    /// Filters run in the order they were added.
    pub fn add_filter(&mut self, filter: Box<dyn FrameFilter>) {
        self.filters.push(filter);
    }

    /// Removes the first filter called `name`.
    pub fn remove_filter(&mut self, name: &str) -> bool {
        match self.filters.iter().position(|f| f.name() == name) {
            Some(index) => {
                self.filters.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
    }

    pub fn filter_names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    /// Thumbnail of `path`, or `None` if the file could not be read as video.
    pub fn generate_thumbnail(&mut self, path: &Path) -> Option<RgbImage> {
        match self.try_generate_thumbnail(path) {
            Ok(image) => Some(image),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "no thumbnail available");
                None
            }
        }
    }

    pub fn try_generate_thumbnail(&mut self, path: &Path) -> Result<RgbImage> {
        let mut decoder = FfmpegDecoder::new();
        self.generate_with(&mut decoder, path)
    }

    /// Runs the whole pipeline on `decoder`. Only initialization failures
    /// and a complete lack of frames are errors; seek trouble is logged and
    /// the current position is used.
    pub fn generate_with<D: VideoDecoder>(&mut self, decoder: &mut D, path: &Path) -> Result<RgbImage> {
        decoder.initialize(path)?;

        // Most formats need one decoded frame before seeking is reliable.
        decoder.decode_video_frame();

        let codec = decoder.codec();
        if self.config.work_around_issues && codec == SEEK_WORKAROUND_CODEC {
            debug!(path = %path.display(), %codec, "not seeking in h264 stream");
        } else {
            let seconds = self.config.seek.target_secs(decoder.duration());
            debug!(path = %path.display(), seconds, "seeking");
            if let Err(e) = decoder.seek(seconds) {
                warn!(path = %path.display(), seconds, error = %e, "seek failed, using current position");
            }
        }

        let mut frame = if self.config.smart_frame_selection {
            self.select_smart_frame(decoder)?
        } else {
            self.current_frame(decoder)?
        };

        for filter in &mut self.filters {
            filter.process(&mut frame);
        }

        let image = self.image_writer.write_frame(&frame)?;
        debug!(
            path = %path.display(),
            width = image.width(),
            height = image.height(),
            "thumbnail generated"
        );
        Ok(image)
    }

    fn current_frame<D: VideoDecoder>(&self, decoder: &mut D) -> Result<VideoFrame> {
        let size = self.config.thumbnail_size;
        let maintain = self.config.maintain_aspect_ratio;
        match decoder.scaled_video_frame(size, maintain) {
            // Nothing decoded yet, e.g. the priming decode failed.
            Err(MediaError::NoFrame) => {
                decoder.decode_video_frame();
                decoder.scaled_video_frame(size, maintain)
            }
            result => result,
        }
    }

    fn select_smart_frame<D: VideoDecoder>(&self, decoder: &mut D) -> Result<VideoFrame> {
        let mut candidates = Vec::with_capacity(SMART_FRAME_ATTEMPTS);
        for index in 0..SMART_FRAME_ATTEMPTS {
            decoder.decode_video_frame();
            match decoder
                .scaled_video_frame(self.config.thumbnail_size, self.config.maintain_aspect_ratio)
            {
                Ok(frame) => candidates.push(frame),
                Err(e) => warn!(index, error = %e, "skipping candidate frame"),
            }
        }

        let histograms: Vec<Histogram<u32>> = candidates.iter().map(Histogram::from_frame).collect();
        let best = best_frame_index(&histograms).ok_or(MediaError::NoFrame)?;
        debug!(best, candidates = candidates.len(), "selected most typical frame");
        Ok(candidates.swap_remove(best))
    }
}

impl Default for VideoThumbnailer {
    fn default() -> Self {
        Self::new()
    }
}
