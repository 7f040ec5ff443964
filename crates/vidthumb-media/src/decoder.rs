use std::ffi::CString;
use std::path::Path;

use rsmpeg::avcodec::{AVCodec, AVCodecContext};
use rsmpeg::avformat::AVFormatContextInput;
use rsmpeg::avutil::AVFrame;
use rsmpeg::ffi;
use tracing::{debug, error, warn};

use vidthumb_core::dimensions::{SampleAspectRatio, calculate_dimensions};
use vidthumb_core::frame::VideoFrame;

use crate::deinterlace::{DeinterlaceGraph, GraphKey};
use crate::error::{MediaError, Result};
use crate::init::ensure_ffmpeg_initialized;
use crate::scaler::{THUMBNAIL_PIXEL_FORMAT, convert_and_scale, to_video_frame};

/// Packets read while looking for one that belongs to the video stream.
/// Streams that end their video early would otherwise be read to the end
/// for every decode call.
pub const MAX_PACKET_READ_ATTEMPTS: usize = 1000;

/// Packets decoded per attempt while searching for a key frame after a seek.
pub const SEEK_PACKETS_PER_ATTEMPT: usize = 20;

/// Attempts at finding a key frame after a seek before giving up, so damaged
/// streams cannot stall the caller.
pub const MAX_KEYFRAME_ATTEMPTS: usize = 200;

/// Frame-level access to one media file, enabling test mocking.
///
/// Every operation on an uninitialized decoder is a no-op: accessors return
/// their sentinel, `decode_video_frame` returns false and the fallible
/// operations return `MediaError::NotInitialized`.
pub trait VideoDecoder {
    /// Opens `path`. On failure the decoder stays uninitialized.
    fn initialize(&mut self, path: &Path) -> Result<()>;

    /// Releases everything acquired by `initialize`.
    fn destroy(&mut self);

    fn is_initialized(&self) -> bool;

    /// Decodes until one frame is finished. Returns false when the input ran
    /// out first; the previously decoded frame is kept.
    fn decode_video_frame(&mut self) -> bool;

    /// Seeks to the key frame at or before `seconds`.
    fn seek(&mut self, seconds: i64) -> Result<()>;

    /// The current frame as RGB24, fitted to a `size` x `size` box.
    fn scaled_video_frame(&mut self, size: u32, maintain_aspect_ratio: bool) -> Result<VideoFrame>;

    /// Decoder name, empty when uninitialized.
    fn codec(&self) -> String;

    /// Whole seconds, 0 when uninitialized or unknown.
    fn duration(&self) -> i64;

    /// -1 when uninitialized.
    fn width(&self) -> i32;

    /// -1 when uninitialized.
    fn height(&self) -> i32;
}

/// FFmpeg-backed decoder session.
pub struct FfmpegDecoder {
    session: Option<Session>,
    seek_enabled: bool,
}

/// Everything that exists only between a successful open and `destroy`.
struct Session {
    input_ctx: AVFormatContextInput,
    decode_ctx: AVCodecContext,
    video_stream_index: usize,
    codec_name: String,
    duration_secs: i64,
    /// Most recent finished frame.
    frame: Option<AVFrame>,
    deinterlace: DeinterlaceGraph,
    /// Set once the decoder has been sent the end-of-stream flush.
    draining: bool,
}

enum PacketRead {
    Packet(rsmpeg::avcodec::AVPacket),
    EndOfInput,
    GaveUp,
}

enum DecodeStep {
    Frame,
    NeedMore,
    Exhausted,
}

impl FfmpegDecoder {
    pub fn new() -> Self {
        Self {
            session: None,
            seek_enabled: true,
        }
    }

    /// Creates a decoder and initializes it on `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let mut decoder = Self::new();
        decoder.initialize(path)?;
        Ok(decoder)
    }

    pub fn seek_enabled(&self) -> bool {
        self.seek_enabled
    }

    /// Seeking is switched off automatically after a failed container seek.
    pub fn set_seek_enabled(&mut self, enabled: bool) {
        self.seek_enabled = enabled;
    }

    pub fn frame_is_key(&self) -> bool {
        self.session.as_ref().is_some_and(Session::frame_is_key)
    }

    pub fn frame_is_interlaced(&self) -> bool {
        self.session.as_ref().is_some_and(Session::frame_is_interlaced)
    }

    /// Parameters of the deinterlace graph, if one has been built.
    pub fn deinterlace_key(&self) -> Option<GraphKey> {
        self.session.as_ref().and_then(|s| s.deinterlace.key())
    }
}

impl Default for FfmpegDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoDecoder for FfmpegDecoder {
    fn initialize(&mut self, path: &Path) -> Result<()> {
        ensure_ffmpeg_initialized();
        self.destroy();

        match Session::open(path) {
            Ok(session) => {
                debug!(
                    path = %path.display(),
                    codec = %session.codec_name,
                    duration = session.duration_secs,
                    "decoder initialized"
                );
                self.session = Some(session);
                Ok(())
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "failed to initialize decoder");
                Err(e)
            }
        }
    }

    fn destroy(&mut self) {
        self.session = None;
    }

    fn is_initialized(&self) -> bool {
        self.session.is_some()
    }

    fn decode_video_frame(&mut self) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };

        loop {
            match session.decode_step() {
                DecodeStep::Frame => return true,
                DecodeStep::NeedMore => continue,
                DecodeStep::Exhausted => {
                    warn!("decode_video_frame failed: frame not finished");
                    return false;
                }
            }
        }
    }

    fn seek(&mut self, seconds: i64) -> Result<()> {
        if !self.seek_enabled {
            debug!(seconds, "seeking disabled, staying at current position");
            return Ok(());
        }
        let session = self.session.as_mut().ok_or(MediaError::NotInitialized)?;

        let timestamp = seconds.max(0).saturating_mul(ffi::AV_TIME_BASE as i64);
        if let Err(e) = session
            .input_ctx
            .seek(-1, timestamp, ffi::AVSEEK_FLAG_BACKWARD as i32)
        {
            self.seek_enabled = false;
            warn!(seconds, error = %e, "container seek failed, seeking disabled");
            return Err(MediaError::SeekError(format!("{e}")));
        }

        session.decode_ctx.flush_buffers();
        session.draining = false;

        for attempt in 0..MAX_KEYFRAME_ATTEMPTS {
            let mut got_frame = false;
            for _ in 0..SEEK_PACKETS_PER_ATTEMPT {
                match session.decode_step() {
                    DecodeStep::Frame => {
                        got_frame = true;
                        break;
                    }
                    DecodeStep::NeedMore => {}
                    DecodeStep::Exhausted => {
                        warn!(seconds, "stream ended before a key frame was found");
                        return Err(MediaError::SeekError(format!(
                            "no key frame after {seconds}s"
                        )));
                    }
                }
            }

            if got_frame && session.frame_is_key() {
                debug!(seconds, attempt, "positioned on key frame");
                return Ok(());
            }
        }

        warn!(seconds, "no key frame within the attempt budget");
        Err(MediaError::SeekError(format!(
            "no key frame within {MAX_KEYFRAME_ATTEMPTS} attempts"
        )))
    }

    fn scaled_video_frame(&mut self, size: u32, maintain_aspect_ratio: bool) -> Result<VideoFrame> {
        let session = self.session.as_mut().ok_or(MediaError::NotInitialized)?;
        session.scaled_frame(size, maintain_aspect_ratio)
    }

    fn codec(&self) -> String {
        self.session
            .as_ref()
            .map(|s| s.codec_name.clone())
            .unwrap_or_default()
    }

    fn duration(&self) -> i64 {
        self.session.as_ref().map_or(0, |s| s.duration_secs)
    }

    fn width(&self) -> i32 {
        self.session.as_ref().map_or(-1, |s| s.decode_ctx.width)
    }

    fn height(&self) -> i32 {
        self.session.as_ref().map_or(-1, |s| s.decode_ctx.height)
    }
}

impl Session {
    fn open(path: &Path) -> Result<Self> {
        let path_str = path.to_string_lossy().to_string();
        let c_path =
            CString::new(path_str.clone()).map_err(|_| MediaError::OpenFailed(path_str.clone()))?;

        // Also reads the stream info.
        let input_ctx = AVFormatContextInput::open(&c_path)
            .map_err(|e| MediaError::OpenFailed(format!("{path_str}: {e}")))?;

        let video_stream_index = input_ctx
            .streams()
            .iter()
            .position(|stream| stream.codecpar().codec_type == ffi::AVMEDIA_TYPE_VIDEO)
            .ok_or(MediaError::NoVideoStream)?;

        let (decoder, duration_secs) = {
            let streams = input_ctx.streams();
            let video_stream = &streams[video_stream_index];
            let codec_id = video_stream.codecpar().codec_id;
            let decoder = AVCodec::find_decoder(codec_id)
                .ok_or_else(|| MediaError::DecoderNotFound(format!("{codec_id:?}")))?;

            let duration_secs = if input_ctx.duration > 0 {
                input_ctx.duration / ffi::AV_TIME_BASE as i64
            } else if video_stream.duration > 0 && video_stream.time_base.den > 0 {
                let tb = video_stream.time_base;
                video_stream.duration * tb.num as i64 / tb.den as i64
            } else {
                0
            };
            (decoder, duration_secs)
        };

        let mut decode_ctx = AVCodecContext::new(&decoder);
        {
            let streams = input_ctx.streams();
            decode_ctx
                .apply_codecpar(&streams[video_stream_index].codecpar())
                .map_err(|e| MediaError::DecoderError(format!("apply_codecpar: {e}")))?;
        }
        // 0 lets FFmpeg pick the thread count.
        unsafe {
            use rsmpeg::UnsafeDerefMut;
            decode_ctx.deref_mut().thread_count = 0;
        }
        decode_ctx
            .open(None)
            .map_err(|e| MediaError::DecoderError(format!("open: {e}")))?;

        Ok(Self {
            input_ctx,
            decode_ctx,
            video_stream_index,
            codec_name: decoder.name().to_string_lossy().to_string(),
            duration_secs,
            frame: None,
            deinterlace: DeinterlaceGraph::new(),
            draining: false,
        })
    }

    fn read_video_packet(&mut self) -> PacketRead {
        for _ in 0..MAX_PACKET_READ_ATTEMPTS {
            match self.input_ctx.read_packet() {
                Ok(Some(packet)) if packet.stream_index as usize == self.video_stream_index => {
                    return PacketRead::Packet(packet);
                }
                Ok(Some(_)) => continue,
                Ok(None) => return PacketRead::EndOfInput,
                Err(e) => {
                    warn!(error = %e, "read_packet failed, treating as end of input");
                    return PacketRead::EndOfInput;
                }
            }
        }
        PacketRead::GaveUp
    }

    fn receive_frame(&mut self) -> bool {
        match self.decode_ctx.receive_frame() {
            Ok(frame) => {
                self.frame = Some(frame);
                true
            }
            Err(_) => false,
        }
    }

    /// Sends one packet to the decoder. False when nothing is left to send.
    fn feed_packet(&mut self) -> bool {
        if self.draining {
            return false;
        }

        match self.read_video_packet() {
            PacketRead::Packet(packet) => {
                if let Err(e) = self.decode_ctx.send_packet(Some(&packet)) {
                    warn!(error = %e, "failed to decode packet, skipping it");
                }
                true
            }
            PacketRead::EndOfInput => {
                // Flush so frames still buffered in the decoder come out.
                self.decode_ctx.send_packet(None).ok();
                self.draining = true;
                true
            }
            PacketRead::GaveUp => {
                warn!(
                    attempts = MAX_PACKET_READ_ATTEMPTS,
                    "no video packet found, giving up"
                );
                false
            }
        }
    }

    /// Feeds at most one packet.
    fn decode_step(&mut self) -> DecodeStep {
        if self.receive_frame() {
            return DecodeStep::Frame;
        }
        if !self.feed_packet() {
            return DecodeStep::Exhausted;
        }
        if self.receive_frame() {
            DecodeStep::Frame
        } else if self.draining {
            DecodeStep::Exhausted
        } else {
            DecodeStep::NeedMore
        }
    }

    fn frame_is_key(&self) -> bool {
        self.frame
            .as_ref()
            .is_some_and(|f| f.flags & ffi::AV_FRAME_FLAG_KEY as i32 != 0)
    }

    fn frame_is_interlaced(&self) -> bool {
        self.frame
            .as_ref()
            .is_some_and(|f| f.flags & ffi::AV_FRAME_FLAG_INTERLACED as i32 != 0)
    }

    /// The stream's sample aspect ratio, falling back to the codec's.
    fn sample_aspect_ratio(&self) -> ffi::AVRational {
        let streams = self.input_ctx.streams();
        let stream_sar = streams[self.video_stream_index].sample_aspect_ratio;
        if stream_sar.num > 0 && stream_sar.den > 0 {
            stream_sar
        } else {
            self.decode_ctx.sample_aspect_ratio
        }
    }

    /// Coded size of the stream. The slot may hold an already scaled frame,
    /// so thumbnail dimensions never derive from it.
    fn source_size(&self, frame: &AVFrame) -> (u32, u32) {
        if self.decode_ctx.width > 0 && self.decode_ctx.height > 0 {
            (self.decode_ctx.width as u32, self.decode_ctx.height as u32)
        } else {
            (frame.width.max(0) as u32, frame.height.max(0) as u32)
        }
    }

    /// Replaces the current frame with a deinterlaced one when the graph can
    /// deliver it; otherwise leaves it alone.
    fn deinterlace_current_frame(&mut self) {
        let Some(frame) = self.frame.as_ref() else {
            return;
        };
        let key = GraphKey {
            pixel_format: frame.format,
            width: frame.width,
            height: frame.height,
        };
        let time_base = self.input_ctx.streams()[self.video_stream_index].time_base;
        let sar = self.sample_aspect_ratio();

        if !self.deinterlace.ensure_graph(key, time_base, sar) {
            return;
        }
        match self.deinterlace.process(frame) {
            Ok(filtered) => self.frame = Some(filtered),
            Err(e) => debug!(error = %e, "using frame without deinterlacing"),
        }
    }

    fn scaled_frame(&mut self, size: u32, maintain_aspect_ratio: bool) -> Result<VideoFrame> {
        if self.frame_is_interlaced() {
            self.deinterlace_current_frame();
        }

        let frame = self.frame.as_ref().ok_or(MediaError::NoFrame)?;
        let sar = self.sample_aspect_ratio();
        let (source_width, source_height) = self.source_size(frame);
        let (width, height) = calculate_dimensions(
            size,
            maintain_aspect_ratio,
            source_width,
            source_height,
            Some(SampleAspectRatio::new(sar.num, sar.den)),
        );

        let converted = convert_and_scale(frame, THUMBNAIL_PIXEL_FORMAT, width as i32, height as i32)
            .inspect_err(|e| warn!(error = %e, "failed to scale frame, keeping the decoded one"))?;
        let video_frame = to_video_frame(&converted)?;
        self.frame = Some(converted);
        Ok(video_frame)
    }
}
