use crate::frame::{RGB_BYTES_PER_PIXEL, VideoFrame};

/// Post-processing step run on the selected thumbnail frame.
pub trait FrameFilter: Send {
    /// Identifies the filter for `remove_filter`.
    fn name(&self) -> &str;

    fn process(&mut self, frame: &mut VideoFrame);
}

const STRIP_EDGE: u8 = 0x1c;
const STRIP_HOLE: u8 = 0xd8;

/// One sprocket tile: an opaque dark border around a light hole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SprocketTile {
    width: usize,
    height: usize,
    hole_x: (usize, usize),
    hole_y: (usize, usize),
}

impl SprocketTile {
    /// Tile matching the width of the thumbnail it decorates.
    fn for_frame_width(width: u32) -> Self {
        match width {
            0..=96 => Self {
                width: 4,
                height: 4,
                hole_x: (1, 3),
                hole_y: (1, 3),
            },
            97..=192 => Self {
                width: 8,
                height: 8,
                hole_x: (2, 6),
                hole_y: (2, 6),
            },
            _ => Self {
                width: 12,
                height: 10,
                hole_x: (3, 9),
                hole_y: (2, 8),
            },
        }
    }

    fn value(&self, x: usize, y: usize) -> u8 {
        let in_hole = (self.hole_x.0..self.hole_x.1).contains(&x)
            && (self.hole_y.0..self.hole_y.1).contains(&y);
        if in_hole { STRIP_HOLE } else { STRIP_EDGE }
    }
}

/// Draws film sprocket holes down both vertical edges of the thumbnail.
#[derive(Debug, Clone, Default)]
pub struct FilmStripFilter;

impl FilmStripFilter {
    pub const NAME: &'static str = "film-strip";

    pub fn new() -> Self {
        Self
    }
}

impl FrameFilter for FilmStripFilter {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn process(&mut self, frame: &mut VideoFrame) {
        let tile = SprocketTile::for_frame_width(frame.width);
        let width = frame.width as usize;
        if width < tile.width * 2 || frame.frame_data.len() < frame.required_len() {
            return;
        }

        for y in 0..frame.height as usize {
            let tile_y = y % tile.height;
            let row = frame.row_mut(y);
            for x in 0..tile.width {
                let value = tile.value(x, tile_y);
                let left = x * RGB_BYTES_PER_PIXEL;
                let right = (width - 1 - x) * RGB_BYTES_PER_PIXEL;
                row[left..left + RGB_BYTES_PER_PIXEL].fill(value);
                row[right..right + RGB_BYTES_PER_PIXEL].fill(value);
            }
        }
    }
}
