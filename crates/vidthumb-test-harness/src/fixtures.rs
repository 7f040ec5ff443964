use std::path::{Path, PathBuf};
use std::process::Command;

/// Frame size of every generated fixture video unless stated otherwise.
pub const FIXTURE_WIDTH: u32 = 320;
pub const FIXTURE_HEIGHT: u32 = 240;

fn run_ffmpeg(args: &[&str], output_path: &Path, what: &str) {
    let status = Command::new("ffmpeg")
        .args(["-y", "-loglevel", "error"])
        .args(args)
        .arg(output_path)
        .stderr(std::process::Stdio::null())
        .status()
        .expect("ffmpeg must be installed to generate test fixtures");

    assert!(status.success(), "ffmpeg failed to generate {what}");
    assert!(
        output_path.exists(),
        "{what} was not created: {}",
        output_path.display()
    );
}

/// Generate a small h264 test video using ffmpeg's lavfi test source.
/// Returns the path to the generated file.
pub fn generate_test_video(output_dir: &Path, name: &str, duration_secs: f64) -> PathBuf {
    let output_path = output_dir.join(format!("{name}.mp4"));
    run_ffmpeg(
        &[
            "-f",
            "lavfi",
            "-i",
            &format!(
                "testsrc=duration={duration_secs}:size={FIXTURE_WIDTH}x{FIXTURE_HEIGHT}:rate=30"
            ),
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-preset",
            "ultrafast",
        ],
        &output_path,
        &format!("test video {name}"),
    );
    output_path
}

/// Generate an MPEG-4 part 2 video with a key frame every `gop` frames.
/// Uses the encoder built into every ffmpeg, so the codec is never "h264".
pub fn generate_mpeg4_test_video(
    output_dir: &Path,
    name: &str,
    duration_secs: f64,
    gop: u32,
) -> PathBuf {
    let output_path = output_dir.join(format!("{name}.avi"));
    run_ffmpeg(
        &[
            "-f",
            "lavfi",
            "-i",
            &format!(
                "testsrc=duration={duration_secs}:size={FIXTURE_WIDTH}x{FIXTURE_HEIGHT}:rate=25"
            ),
            "-c:v",
            "mpeg4",
            "-g",
            &gop.to_string(),
            "-q:v",
            "5",
        ],
        &output_path,
        &format!("mpeg4 test video {name}"),
    );
    output_path
}

/// Generate an MPEG-2 video encoded as interlaced, top field first.
pub fn generate_interlaced_test_video(
    output_dir: &Path,
    name: &str,
    duration_secs: f64,
) -> PathBuf {
    let output_path = output_dir.join(format!("{name}.mpg"));
    run_ffmpeg(
        &[
            "-f",
            "lavfi",
            "-i",
            &format!(
                "testsrc=duration={duration_secs}:size={FIXTURE_WIDTH}x{FIXTURE_HEIGHT}:rate=25"
            ),
            "-vf",
            "setfield=tff",
            "-c:v",
            "mpeg2video",
            "-flags",
            "+ilme+ildct",
            "-q:v",
            "4",
        ],
        &output_path,
        &format!("interlaced test video {name}"),
    );
    output_path
}

/// Generate a video whose pixels are not square (`sar_num:sar_den`).
pub fn generate_anamorphic_test_video(
    output_dir: &Path,
    name: &str,
    sar_num: u32,
    sar_den: u32,
) -> PathBuf {
    let output_path = output_dir.join(format!("{name}.avi"));
    run_ffmpeg(
        &[
            "-f",
            "lavfi",
            "-i",
            &format!("testsrc=duration=1:size={FIXTURE_WIDTH}x{FIXTURE_HEIGHT}:rate=25"),
            "-vf",
            &format!("setsar={sar_num}/{sar_den}"),
            "-c:v",
            "mpeg4",
            "-q:v",
            "5",
        ],
        &output_path,
        &format!("anamorphic test video {name}"),
    );
    output_path
}

/// Generate a file with an audio stream and no video stream.
pub fn generate_audio_only_file(output_dir: &Path, name: &str, duration_secs: f64) -> PathBuf {
    let output_path = output_dir.join(format!("{name}.wav"));
    run_ffmpeg(
        &[
            "-f",
            "lavfi",
            "-i",
            &format!("sine=frequency=440:duration={duration_secs}"),
            "-c:a",
            "pcm_s16le",
        ],
        &output_path,
        &format!("audio-only file {name}"),
    );
    output_path
}

/// Write bytes that no demuxer recognizes.
pub fn write_garbage_file(output_dir: &Path, name: &str) -> PathBuf {
    let output_path = output_dir.join(format!("{name}.mp4"));
    std::fs::write(&output_path, b"this is not a media file at all").expect("write garbage file");
    output_path
}

/// Get a temporary directory for test fixtures that persists for the test run.
pub fn fixture_dir() -> tempfile::TempDir {
    tempfile::TempDir::new().expect("failed to create temp dir for fixtures")
}
