/*!
 * # subvox - speech-to-subtitle pipeline for video files
 *
 * A Rust library for generating timed, optionally translated subtitle
 * tracks from the spoken audio of video files.
 *
 * ## Features
 *
 * - Extract audio from video files via ffmpeg
 * - Transcribe speech locally with whisper.cpp models
 * - Optionally translate segment texts through an LLM endpoint while
 *   preserving timing and ordering
 * - Serialize well-formed SRT subtitle files
 * - Burn the subtitle track back onto the video as a rendered overlay
 * - Batch processing with per-video failure isolation
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `timecode`: SRT timecode formatting
 * - `segment`: Timed segments, validation, translation reinsertion
 * - `subtitle`: Subtitle cues and SRT serialization
 * - `media`: ffmpeg audio extraction and subtitle muxing
 * - `engines`: Model adapters:
 *   - `engines::whisper`: whisper.cpp speech recognition
 *   - `engines::translate`: HTTP LLM translation client
 *   - `engines::mock`: scripted collaborators for tests
 * - `pipeline`: Per-video orchestration and batch scheduling
 * - `file_utils`: File system operations
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod errors;
pub mod timecode;
pub mod segment;
pub mod subtitle;
pub mod media;
pub mod engines;
pub mod pipeline;
pub mod file_utils;
pub mod language_utils;

// Re-export main types for easier usage
pub use app_config::{Config, ModelSize};
pub use segment::{TimedSegment, Transcript};
pub use subtitle::SubtitleCue;
pub use pipeline::{BatchReport, JobOutput, JobReport, OutputOptions, Pipeline};
pub use errors::{JobError, RecognizerError, SegmentError, TimecodeError, TranslationError};
pub use language_utils::{get_language_name, language_codes_match};
