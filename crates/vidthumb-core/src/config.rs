use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::seek::{SeekPosition, SeekTime};

pub const DEFAULT_THUMBNAIL_SIZE: u32 = 256;

/// Settings of one thumbnailer. Filters are not part of the config; they
/// live on the thumbnailer itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailerConfig {
    /// Edge of the square box the thumbnail must fit in, in pixels.
    pub thumbnail_size: u32,
    pub seek: SeekPosition,
    pub maintain_aspect_ratio: bool,
    pub smart_frame_selection: bool,
    /// Skip seeking in h264 streams.
    pub work_around_issues: bool,
}

impl Default for ThumbnailerConfig {
    fn default() -> Self {
        Self {
            thumbnail_size: DEFAULT_THUMBNAIL_SIZE,
            seek: SeekPosition::default(),
            maintain_aspect_ratio: true,
            smart_frame_selection: false,
            work_around_issues: false,
        }
    }
}

impl ThumbnailerConfig {
    pub fn set_thumbnail_size(&mut self, size: u32) {
        self.thumbnail_size = size;
    }

    /// Seek to a share of the duration. Values above 95 are clamped and any
    /// explicit seek time is dropped.
    pub fn set_seek_percentage(&mut self, percentage: u32) {
        self.seek = SeekPosition::percentage(percentage);
    }

    /// Seek to an explicit `HH:MM:SS` time, replacing any percentage. A
    /// malformed time leaves the config untouched.
    pub fn set_seek_time(&mut self, time: &str) -> Result<()> {
        let time: SeekTime = time.parse()?;
        self.seek = SeekPosition::Time(time);
        Ok(())
    }

    pub fn set_work_around_issues(&mut self, work_around: bool) {
        self.work_around_issues = work_around;
    }

    pub fn set_maintain_aspect_ratio(&mut self, maintain: bool) {
        self.maintain_aspect_ratio = maintain;
    }

    pub fn set_smart_frame_selection(&mut self, enabled: bool) {
        self.smart_frame_selection = enabled;
    }

    pub fn seek_percentage(&self) -> Option<u32> {
        match self.seek {
            SeekPosition::Percentage(percentage) => Some(percentage),
            SeekPosition::Time(_) => None,
        }
    }

    /// The explicit seek time formatted as `HH:MM:SS`, if one is set.
    pub fn seek_time(&self) -> Option<String> {
        match self.seek {
            SeekPosition::Time(time) => Some(time.to_string()),
            SeekPosition::Percentage(_) => None,
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let mut config: Self = serde_json::from_str(&json)?;
        // Hand-edited files may carry an out-of-range percentage.
        if let SeekPosition::Percentage(percentage) = config.seek {
            config.seek = SeekPosition::percentage(percentage);
        }
        Ok(config)
    }
}
