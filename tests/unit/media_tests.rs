/*!
 * Tests for media backends
 */

use anyhow::Result;
use subvox::engines::mock::MockMedia;
use subvox::media::{MediaBackend, filter_ffmpeg_stderr};
use crate::common;

/// Test that banner and metadata noise is stripped from ffmpeg stderr
#[test]
fn test_filter_ffmpeg_stderr_withBannerNoise_shouldKeepOnlyErrors() {
    let stderr = "\
ffmpeg version 6.0 Copyright (c) 2000-2023 the FFmpeg developers
  built with gcc 12
  configuration: --enable-gpl
Input #0, matroska,webm, from 'movie.mkv':
  Metadata:
  Duration: 00:42:00.00, start: 0.000000
movie.mkv: No such file or directory
";

    let filtered = filter_ffmpeg_stderr(stderr);
    assert_eq!(filtered, "movie.mkv: No such file or directory");
}

/// Test the fallback message for empty stderr
#[test]
fn test_filter_ffmpeg_stderr_withOnlyNoise_shouldReportUnknownError() {
    let filtered = filter_ffmpeg_stderr("ffmpeg version 6.0\n");
    assert!(filtered.contains("unknown ffmpeg error"));
}

/// Test the working mock writes an audio artifact
#[tokio::test]
async fn test_mock_media_extract_withWorkingBackend_shouldWriteAudioFile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();
    let video = common::create_test_video(&dir, "movie.mkv")?;
    let audio = dir.join("movie.wav");

    let media = MockMedia::working();
    media.extract_audio(&video, &audio).await?;

    assert!(audio.exists());
    Ok(())
}

/// Test the failing mock reports extraction errors
#[tokio::test]
async fn test_mock_media_extract_withFailingBackend_shouldError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();
    let video = common::create_test_video(&dir, "movie.mkv")?;
    let audio = dir.join("movie.wav");

    let media = MockMedia::fail_extraction();
    assert!(media.extract_audio(&video, &audio).await.is_err());
    assert!(!audio.exists());
    Ok(())
}

/// Test pattern-scoped extraction failure only hits matching inputs
#[tokio::test]
async fn test_mock_media_extract_withPattern_shouldFailSelectively() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();
    let bad = common::create_test_video(&dir, "broken.mkv")?;
    let good = common::create_test_video(&dir, "fine.mkv")?;

    let media = MockMedia::fail_extraction_matching("broken");

    assert!(media.extract_audio(&bad, &dir.join("a.wav")).await.is_err());
    assert!(media.extract_audio(&good, &dir.join("b.wav")).await.is_ok());
    Ok(())
}

/// Test the mux counter observes calls
#[tokio::test]
async fn test_mock_media_mux_shouldCountCallsAndWriteOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();
    let video = common::create_test_video(&dir, "movie.mkv")?;
    let subtitle = common::create_test_file(&dir, "movie.srt", "1\n00:00:00,000 --> 00:00:01,000\nhi\n\n")?;
    let output = dir.join("movie.mp4");

    let media = MockMedia::working();
    let counter = media.mux_counter();

    media
        .mux_subtitles(&video, &subtitle, "BorderStyle=3", &output)
        .await?;

    assert!(output.exists());
    assert_eq!(counter.load(std::sync::atomic::Ordering::SeqCst), 1);
    Ok(())
}
