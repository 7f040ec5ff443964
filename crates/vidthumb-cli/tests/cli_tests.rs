use std::path::{Path, PathBuf};

use clap::Parser;
use vidthumb_cli::args::Args;
use vidthumb_cli::run::{Job, plan_jobs, run};
use vidthumb_core::config::ThumbnailerConfig;
use vidthumb_test_harness::fixtures;

fn parse(args: &[&str]) -> Args {
    Args::try_parse_from(std::iter::once("vidthumb").chain(args.iter().copied())).unwrap()
}

#[test]
fn test_defaults_match_thumbnailer_defaults() {
    let args = parse(&["clip.mp4"]);
    assert_eq!(args.thumbnailer_config().unwrap(), ThumbnailerConfig::default());
    assert_eq!(args.log_filter(), "warn");
}

#[test]
fn test_flags_override_config() {
    let args = parse(&[
        "-s", "128", "-t", "40", "--smart", "--no-aspect", "--workaround", "-v", "clip.mp4",
    ]);
    let config = args.thumbnailer_config().unwrap();
    assert_eq!(config.thumbnail_size, 128);
    assert_eq!(config.seek_percentage(), Some(40));
    assert!(config.smart_frame_selection);
    assert!(!config.maintain_aspect_ratio);
    assert!(config.work_around_issues);
    assert_eq!(args.log_filter(), "debug");
}

#[test]
fn test_seek_time_flag() {
    let config = parse(&["--seek-time", "00:02:03", "clip.mp4"]).thumbnailer_config().unwrap();
    assert_eq!(config.seek_time().as_deref(), Some("00:02:03"));

    let bad = parse(&["--seek-time", "2 minutes", "clip.mp4"]);
    assert!(bad.thumbnailer_config().is_err());
}

#[test]
fn test_conflicting_flags_are_rejected() {
    let argv = ["vidthumb", "-t", "20", "--seek-time", "00:00:01", "clip.mp4"];
    assert!(Args::try_parse_from(argv).is_err());

    let argv = ["vidthumb", "-o", "a.png", "--output-dir", "out", "clip.mp4"];
    assert!(Args::try_parse_from(argv).is_err());

    assert!(Args::try_parse_from(["vidthumb"]).is_err());
}

#[test]
fn test_zero_size_is_rejected() {
    assert!(parse(&["-s", "0", "clip.mp4"]).thumbnailer_config().is_err());
}

#[test]
fn test_config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("thumbs.json");

    let mut saved = ThumbnailerConfig::default();
    saved.set_thumbnail_size(96);
    saved.set_seek_time("00:00:05").unwrap();
    saved.set_smart_frame_selection(true);
    saved.save(&path).unwrap();

    let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["thumbnail_size"], 96);

    let path_arg = path.to_str().unwrap();
    let config = parse(&["--config", path_arg, "clip.mp4"]).thumbnailer_config().unwrap();
    assert_eq!(config, saved);

    let config = parse(&["--config", path_arg, "-s", "64", "clip.mp4"]).thumbnailer_config().unwrap();
    assert_eq!(config.thumbnail_size, 64);
    assert_eq!(config.seek_time().as_deref(), Some("00:00:05"));
}

#[test]
fn test_missing_config_file_is_an_error() {
    let args = parse(&["--config", "/nonexistent/vidthumb.json", "clip.mp4"]);
    assert!(args.thumbnailer_config().is_err());
}

#[test]
fn test_plan_jobs() {
    let args = parse(&["-o", "thumb.jpg", "clip.mp4"]);
    assert_eq!(
        plan_jobs(&args).unwrap(),
        vec![Job {
            input: PathBuf::from("clip.mp4"),
            output: PathBuf::from("thumb.jpg"),
        }]
    );

    let args = parse(&["--output-dir", "thumbs", "a/one.mp4", "b/two.avi"]);
    let outputs: Vec<PathBuf> = plan_jobs(&args).unwrap().into_iter().map(|j| j.output).collect();
    assert_eq!(outputs, vec![Path::new("thumbs/one.png"), Path::new("thumbs/two.png")]);

    let args = parse(&["one.mp4", "two.mp4"]);
    let outputs: Vec<PathBuf> = plan_jobs(&args).unwrap().into_iter().map(|j| j.output).collect();
    assert_eq!(outputs, vec![Path::new("one.png"), Path::new("two.png")]);

    let args = parse(&["-o", "thumb.png", "one.mp4", "two.mp4"]);
    assert!(plan_jobs(&args).is_err());
}

#[test]
fn test_run_writes_thumbnails_and_counts_failures() {
    let dir = fixtures::fixture_dir();
    let video = fixtures::generate_mpeg4_test_video(dir.path(), "cli_clip", 2.0, 10);
    let garbage = fixtures::write_garbage_file(dir.path(), "cli_garbage");
    let out_dir = dir.path().join("thumbs");

    let args = parse(&[
        "--output-dir",
        out_dir.to_str().unwrap(),
        "-s",
        "64",
        "-f",
        video.to_str().unwrap(),
        garbage.to_str().unwrap(),
    ]);
    assert_eq!(run(&args).unwrap(), 1);

    let image = image::open(out_dir.join("cli_clip.png")).unwrap().to_rgb8();
    assert_eq!(image.dimensions(), (64, 48));
    assert!(!out_dir.join("cli_garbage.png").exists());
}

#[test]
fn test_run_jpeg_output() {
    let dir = fixtures::fixture_dir();
    let video = fixtures::generate_mpeg4_test_video(dir.path(), "cli_jpeg", 1.0, 5);
    let output = dir.path().join("thumb.jpg");

    let args = parse(&["-o", output.to_str().unwrap(), video.to_str().unwrap()]);
    assert_eq!(run(&args).unwrap(), 0);
    assert_eq!(image::open(&output).unwrap().to_rgb8().dimensions(), (256, 192));
}
