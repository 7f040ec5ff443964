use std::ffi::{CStr, CString};

use rsmpeg::avfilter::{AVFilter, AVFilterGraph, AVFilterInOut};
use rsmpeg::avutil::AVFrame;
use rsmpeg::ffi;
use tracing::{debug, warn};

use crate::error::{MediaError, Result};

const SOURCE_NAME: &CStr = c"in";
const SINK_NAME: &CStr = c"out";

/// Filter chain between the buffer source and sink.
const DEINTERLACE_FILTER: &CStr = c"yadif=mode=send_frame:parity=auto:deint=all";

/// Parameters a graph was built for. Any change forces a rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphKey {
    pub pixel_format: ffi::AVPixelFormat,
    pub width: i32,
    pub height: i32,
}

/// Lazily built `buffer -> yadif -> buffersink` graph.
///
/// yadif only emits a frame once it has seen the one after it, so every
/// frame is pushed twice: the copy stands in for the next frame. The frame
/// before it is still held by yadif, which keeps the temporal check working
/// across consecutive calls.
#[derive(Default)]
pub struct DeinterlaceGraph {
    graph: Option<AVFilterGraph>,
    key: Option<GraphKey>,
}

impl DeinterlaceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key of the graph currently built, if any.
    pub fn key(&self) -> Option<GraphKey> {
        self.key
    }

    /// Makes sure a graph for `key` exists, rebuilding if the key changed.
    /// Returns false when the graph cannot be built.
    pub fn ensure_graph(
        &mut self,
        key: GraphKey,
        time_base: ffi::AVRational,
        sample_aspect_ratio: ffi::AVRational,
    ) -> bool {
        if self.graph.is_some() && self.key == Some(key) {
            return true;
        }

        self.teardown();
        match build_graph(key, time_base, sample_aspect_ratio) {
            Ok(graph) => {
                debug!(?key, "built deinterlace graph");
                self.graph = Some(graph);
                self.key = Some(key);
                true
            }
            Err(e) => {
                warn!(?key, error = %e, "failed to build deinterlace graph");
                false
            }
        }
    }

    pub fn teardown(&mut self) {
        self.graph = None;
        self.key = None;
    }

    /// Pushes `src` through the graph and returns it deinterlaced.
    /// `src` itself is left untouched.
    pub fn process(&mut self, src: &AVFrame) -> Result<AVFrame> {
        let graph = self
            .graph
            .as_ref()
            .ok_or_else(|| MediaError::Filter("graph not built".into()))?;
        let mut source = graph
            .get_filter(SOURCE_NAME)
            .ok_or_else(|| MediaError::Filter("graph has no source".into()))?;
        let mut sink = graph
            .get_filter(SINK_NAME)
            .ok_or_else(|| MediaError::Filter("graph has no sink".into()))?;

        for _ in 0..2 {
            source
                .buffersrc_add_frame(Some(src.clone()), None)
                .map_err(|e| MediaError::Filter(format!("push frame: {e}")))?;
        }

        // The copy pushed by the previous call comes out ahead of `src`.
        let mut latest = None;
        while let Ok(frame) = sink.buffersink_get_frame(None) {
            latest = Some(frame);
        }
        latest.ok_or_else(|| MediaError::Filter("graph produced no frame".into()))
    }
}

fn build_graph(
    key: GraphKey,
    time_base: ffi::AVRational,
    sample_aspect_ratio: ffi::AVRational,
) -> Result<AVFilterGraph> {
    let buffer_src = AVFilter::get_by_name(c"buffer")
        .ok_or_else(|| MediaError::Filter("buffer filter unavailable".into()))?;
    let buffer_sink = AVFilter::get_by_name(c"buffersink")
        .ok_or_else(|| MediaError::Filter("buffersink filter unavailable".into()))?;

    let (tb_num, tb_den) = if time_base.num > 0 && time_base.den > 0 {
        (time_base.num, time_base.den)
    } else {
        (1, 25)
    };
    let (sar_num, sar_den) = if sample_aspect_ratio.num > 0 && sample_aspect_ratio.den > 0 {
        (sample_aspect_ratio.num, sample_aspect_ratio.den)
    } else {
        (1, 1)
    };
    let args = CString::new(format!(
        "video_size={}x{}:pix_fmt={}:time_base={tb_num}/{tb_den}:pixel_aspect={sar_num}/{sar_den}",
        key.width, key.height, key.pixel_format
    ))
    .map_err(|e| MediaError::Filter(format!("buffer args: {e}")))?;

    let graph = AVFilterGraph::new();
    {
        let mut source_ctx = graph
            .create_filter_context(&buffer_src, SOURCE_NAME, Some(&args))
            .map_err(|e| MediaError::Filter(format!("create buffer source: {e}")))?;
        let mut sink_ctx = graph
            .create_filter_context(&buffer_sink, SINK_NAME, None)
            .map_err(|e| MediaError::Filter(format!("create buffer sink: {e}")))?;

        // The source feeds the chain's input label, the sink drains its output.
        let outputs = AVFilterInOut::new(SOURCE_NAME, &mut source_ctx, 0);
        let inputs = AVFilterInOut::new(SINK_NAME, &mut sink_ctx, 0);
        graph
            .parse_ptr(DEINTERLACE_FILTER, Some(inputs), Some(outputs))
            .map_err(|e| MediaError::Filter(format!("parse {DEINTERLACE_FILTER:?}: {e}")))?;
    }
    graph
        .config()
        .map_err(|e| MediaError::Filter(format!("configure graph: {e}")))?;

    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIME_BASE: ffi::AVRational = ffi::AVRational { num: 1, den: 25 };
    const SQUARE_PIXELS: ffi::AVRational = ffi::AVRational { num: 1, den: 1 };

    fn key(width: i32, height: i32) -> GraphKey {
        GraphKey {
            pixel_format: ffi::AV_PIX_FMT_YUV420P,
            width,
            height,
        }
    }

    /// YUV 4:2:0 frame whose even and odd luma rows differ, like a frame
    /// whose two fields were captured at different moments.
    fn combed_frame(width: i32, height: i32, even: u8, odd: u8) -> AVFrame {
        let mut frame = AVFrame::new();
        frame.set_width(width);
        frame.set_height(height);
        frame.set_format(ffi::AV_PIX_FMT_YUV420P);
        frame.alloc_buffer().unwrap();
        unsafe {
            for y in 0..height as usize {
                let value = if y % 2 == 0 { even } else { odd };
                let row = frame.data[0].add(y * frame.linesize[0] as usize);
                std::ptr::write_bytes(row, value, width as usize);
            }
            for plane in 1..3 {
                for y in 0..height as usize / 2 {
                    let row = frame.data[plane].add(y * frame.linesize[plane] as usize);
                    std::ptr::write_bytes(row, 128, width as usize / 2);
                }
            }
        }
        frame
    }

    fn luma(frame: &AVFrame) -> Vec<u8> {
        let width = frame.width as usize;
        (0..frame.height as usize)
            .flat_map(|y| unsafe {
                let row = frame.data[0].add(y * frame.linesize[0] as usize);
                std::slice::from_raw_parts(row as *const u8, width).to_vec()
            })
            .collect()
    }

    #[test]
    fn test_graph_is_rebuilt_when_key_changes() {
        let mut graph = DeinterlaceGraph::new();
        assert_eq!(graph.key(), None);

        assert!(graph.ensure_graph(key(64, 48), TIME_BASE, SQUARE_PIXELS));
        assert_eq!(graph.key(), Some(key(64, 48)));
        assert!(graph.ensure_graph(key(64, 48), TIME_BASE, SQUARE_PIXELS));
        assert_eq!(graph.key(), Some(key(64, 48)));

        assert!(graph.ensure_graph(key(64, 32), TIME_BASE, SQUARE_PIXELS));
        assert_eq!(graph.key(), Some(key(64, 32)));

        graph.teardown();
        assert_eq!(graph.key(), None);
    }

    #[test]
    fn test_process_without_graph_fails() {
        let mut graph = DeinterlaceGraph::new();
        let frame = combed_frame(64, 48, 16, 235);
        assert!(matches!(graph.process(&frame), Err(MediaError::Filter(_))));
    }

    #[test]
    fn test_first_frame_after_build_is_returned() {
        let mut graph = DeinterlaceGraph::new();
        assert!(graph.ensure_graph(key(64, 48), TIME_BASE, SQUARE_PIXELS));

        let frame = combed_frame(64, 48, 16, 235);
        let filtered = graph.process(&frame).unwrap();
        assert_eq!((filtered.width, filtered.height), (64, 48));
        assert_eq!(filtered.format, ffi::AV_PIX_FMT_YUV420P);
        // The source frame keeps its own buffers.
        assert_eq!(luma(&frame)[64], 235);
    }

    #[test]
    fn test_moving_fields_are_interpolated() {
        let mut graph = DeinterlaceGraph::new();
        assert!(graph.ensure_graph(key(64, 48), TIME_BASE, SQUARE_PIXELS));

        let first = combed_frame(64, 48, 16, 235);
        graph.process(&first).unwrap();

        // Inverted stripes: both fields moved since the previous frame.
        let second = combed_frame(64, 48, 235, 16);
        let filtered = graph.process(&second).unwrap();
        assert_eq!((filtered.width, filtered.height), (64, 48));
        assert_ne!(luma(&filtered), luma(&second));
    }
}
