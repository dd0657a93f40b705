use std::path::Path;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use log::{error, debug};
use tokio::process::Command;

// @module: Media collaborators for audio extraction and subtitle muxing

/// Timeout applied to every ffmpeg invocation
const FFMPEG_TIMEOUT_SECS: u64 = 600;

/// External media tool contract
///
/// Audio extraction produces single-channel 16 kHz 16-bit PCM audio at the
/// chosen location; muxing burns a subtitle file into the video as a rendered
/// overlay track. Failures are reported as opaque errors that the pipeline
/// maps onto the owning job.
#[async_trait]
pub trait MediaBackend: Send + Sync {
    /// Extract the audio track of a video to a WAV file
    async fn extract_audio(&self, video_path: &Path, audio_path: &Path) -> Result<()>;

    /// Burn a subtitle file onto a video, writing the result to `output_path`
    async fn mux_subtitles(
        &self,
        video_path: &Path,
        subtitle_path: &Path,
        style: &str,
        output_path: &Path,
    ) -> Result<()>;
}

// @struct: ffmpeg-backed media tool
#[derive(Debug, Default)]
pub struct FfmpegBackend;

impl FfmpegBackend {
    /// Creates a new ffmpeg backend
    pub fn new() -> Self {
        FfmpegBackend
    }

    /// Run an ffmpeg invocation with a timeout, surfacing filtered stderr on failure
    async fn run_ffmpeg(&self, args: &[&str], what: &str) -> Result<()> {
        debug!("ffmpeg {}: {:?}", what, args);

        let ffmpeg_future = Command::new("ffmpeg").args(args).output();

        let timeout_duration = std::time::Duration::from_secs(FFMPEG_TIMEOUT_SECS);
        let result = tokio::select! {
            result = ffmpeg_future => {
                result.map_err(|e| anyhow!("Failed to execute ffmpeg for {}: {}", what, e))?
            },
            _ = tokio::time::sleep(timeout_duration) => {
                return Err(anyhow!("ffmpeg {} timed out after {} seconds", what, FFMPEG_TIMEOUT_SECS));
            }
        };

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            let filtered = filter_ffmpeg_stderr(&stderr);
            error!("ffmpeg {} failed: {}", what, filtered);
            return Err(anyhow!("ffmpeg {} failed: {}", what, filtered));
        }

        Ok(())
    }
}

#[async_trait]
impl MediaBackend for FfmpegBackend {
    async fn extract_audio(&self, video_path: &Path, audio_path: &Path) -> Result<()> {
        if !video_path.exists() {
            return Err(anyhow!("Video file does not exist: {:?}", video_path));
        }

        // Mono 16 kHz s16le is what the recognition model expects
        self.run_ffmpeg(
            &[
                "-y",
                "-i", video_path.to_str().unwrap_or_default(),
                "-vn",
                "-acodec", "pcm_s16le",
                "-ac", "1",
                "-ar", "16000",
                audio_path.to_str().unwrap_or_default(),
            ],
            "audio extraction",
        )
        .await?;

        let file_size = std::fs::metadata(audio_path)?.len();
        if file_size == 0 {
            return Err(anyhow!("Extracted audio file is empty: {:?}", audio_path));
        }

        Ok(())
    }

    async fn mux_subtitles(
        &self,
        video_path: &Path,
        subtitle_path: &Path,
        style: &str,
        output_path: &Path,
    ) -> Result<()> {
        if !video_path.exists() {
            return Err(anyhow!("Video file does not exist: {:?}", video_path));
        }
        if !subtitle_path.exists() {
            return Err(anyhow!("Subtitle file does not exist: {:?}", subtitle_path));
        }

        let filter = format!(
            "subtitles={}:force_style='{}'",
            escape_filter_path(subtitle_path),
            style
        );

        self.run_ffmpeg(
            &[
                "-y",
                "-i", video_path.to_str().unwrap_or_default(),
                "-vf", &filter,
                "-c:a", "copy",
                output_path.to_str().unwrap_or_default(),
            ],
            "subtitle muxing",
        )
        .await
    }
}

/// Escape a path for use inside an ffmpeg filter argument
///
/// The filter grammar treats ':' and '\' specially even inside the
/// subtitles= value.
fn escape_filter_path(path: &Path) -> String {
    path.to_string_lossy()
        .replace('\\', "\\\\")
        .replace(':', "\\:")
        .replace('\'', "\\'")
}

/// Filter ffmpeg stderr to only show meaningful error lines, stripping the
/// version banner, build configuration, and stream metadata noise.
pub fn filter_ffmpeg_stderr(stderr: &str) -> String {
    let dominated_prefixes = [
        "ffmpeg version",
        "  built with",
        "  configuration:",
        "  lib",
        "Input #",
        "  Metadata:",
        "  Duration:",
        "  Chapter",
        "    Chapter",
        "  Stream #",
        "      Metadata:",
        "        title",
        "        BPS",
        "        DURATION",
        "        NUMBER_OF",
        "        _STATISTICS",
        "Output #",
        "Stream mapping:",
        "Press [q]",
    ];

    let meaningful: Vec<&str> = stderr
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                return false;
            }
            !dominated_prefixes.iter().any(|p| line.starts_with(p))
        })
        .collect();

    if meaningful.is_empty() {
        "unknown ffmpeg error (stderr was empty after filtering)".to_string()
    } else {
        meaningful.join("\n")
    }
}
