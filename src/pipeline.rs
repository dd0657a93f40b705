use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use anyhow::{Result, anyhow};
use futures::stream::{self, StreamExt};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{error, info, debug};
use tokio::sync::Semaphore;

use crate::app_config::Config;
use crate::engines::translate::HttpTranslator;
use crate::engines::whisper::WhisperRecognizer;
use crate::engines::{SpeechRecognizer, Translator};
use crate::errors::JobError;
use crate::file_utils::FileManager;
use crate::media::{FfmpegBackend, MediaBackend};
use crate::segment::Transcript;
use crate::subtitle::{cues_from_segments, render_srt, write_srt};

// @module: Per-video pipeline orchestration

/// Output placement for one batch run
#[derive(Debug, Clone)]
pub struct OutputOptions {
    /// Directory receiving persisted artifacts
    pub dir: PathBuf,

    /// Keep the subtitle file alongside the output video
    pub keep_subtitle: bool,

    /// Only emit the subtitle file, skip muxing entirely
    pub subtitle_only: bool,
}

impl OutputOptions {
    /// Whether the subtitle artifact outlives the job
    fn persist_subtitle(&self) -> bool {
        self.keep_subtitle || self.subtitle_only
    }
}

/// What one successful job produced
#[derive(Debug, Clone)]
pub struct JobOutput {
    /// Persisted subtitle file, when requested
    pub subtitle_path: Option<PathBuf>,

    /// Muxed output video, unless subtitle-only mode
    pub video_path: Option<PathBuf>,

    /// Language tag detected by the recognizer
    pub detected_language: String,

    /// Number of cues written
    pub cue_count: usize,
}

/// Outcome of one job in a batch run
#[derive(Debug)]
pub struct JobReport {
    /// Input video this job processed
    pub video: PathBuf,

    /// Output on success, stage-tagged error on failure
    pub result: Result<JobOutput, JobError>,
}

/// Structured result of a whole batch run
#[derive(Debug)]
pub struct BatchReport {
    /// Per-job outcomes, in input order
    pub jobs: Vec<JobReport>,
}

impl BatchReport {
    /// Number of jobs that completed
    pub fn success_count(&self) -> usize {
        self.jobs.iter().filter(|j| j.result.is_ok()).count()
    }

    /// Number of jobs that failed
    pub fn failure_count(&self) -> usize {
        self.jobs.iter().filter(|j| j.result.is_err()).count()
    }

    /// Whether any job failed
    pub fn has_failures(&self) -> bool {
        self.failure_count() > 0
    }
}

/// Pipeline orchestrator
///
/// Sequences, per input video: audio extraction, transcription, optional
/// translation, serialization, and optional muxing. Each video is an
/// isolated job; one job's failure never aborts its siblings. The model
/// collaborators are loaded once and shared read-only across jobs.
pub struct Pipeline {
    // @field: App configuration
    config: Config,

    // @field: Shared recognition model
    recognizer: Arc<dyn SpeechRecognizer>,

    // @field: Shared translation client, present when translation is enabled
    translator: Option<Arc<dyn Translator>>,

    // @field: Media tool for extraction and muxing
    media: Arc<dyn MediaBackend>,

    // @field: Shared scratch directory for transient artifacts
    scratch_dir: PathBuf,
}

impl Pipeline {
    /// Assemble a pipeline from pre-built collaborators
    pub fn new(
        config: Config,
        recognizer: Arc<dyn SpeechRecognizer>,
        translator: Option<Arc<dyn Translator>>,
        media: Arc<dyn MediaBackend>,
        scratch_dir: PathBuf,
    ) -> Result<Self> {
        if config.translation.enabled && translator.is_none() {
            return Err(anyhow!("Translation is enabled but no translator was provided"));
        }

        Ok(Pipeline {
            config,
            recognizer,
            translator,
            media,
            scratch_dir,
        })
    }

    /// Build the default collaborators from configuration
    ///
    /// Loads the recognition model once; the returned pipeline shares it
    /// across all jobs of all batch runs.
    pub fn from_config(config: Config, scratch_dir: PathBuf) -> Result<Self> {
        let recognizer: Arc<dyn SpeechRecognizer> =
            Arc::new(WhisperRecognizer::load(&config.recognition)?);

        let translator: Option<Arc<dyn Translator>> = if config.translation.enabled {
            Some(Arc::new(HttpTranslator::new(config.translation.clone())))
        } else {
            None
        };

        let media: Arc<dyn MediaBackend> = Arc::new(FfmpegBackend::new());

        Self::new(config, recognizer, translator, media, scratch_dir)
    }

    /// Process a batch of videos, collecting a structured per-job report
    ///
    /// Jobs run concurrently up to the configured limit. The report lists
    /// every input in its original order with either its outputs or its
    /// failing stage and reason.
    pub async fn run_batch(
        &self,
        videos: &[PathBuf],
        options: &OutputOptions,
    ) -> Result<BatchReport> {
        if videos.is_empty() {
            return Err(anyhow!("No input videos to process"));
        }

        FileManager::ensure_dir(&options.dir)?;

        let multi_progress = MultiProgress::new();
        let batch_pb = multi_progress.add(ProgressBar::new(videos.len() as u64));
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} videos ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        batch_pb.set_style(template_result.progress_chars("█▓▒░"));
        batch_pb.set_message("Processing videos");

        let semaphore = Arc::new(Semaphore::new(self.config.pipeline.concurrency));

        let mut results: Vec<(usize, JobReport)> = stream::iter(videos.iter().enumerate())
            .map(|(index, video)| {
                let semaphore = Arc::clone(&semaphore);
                let batch_pb = batch_pb.clone();
                async move {
                    let _permit = semaphore.acquire().await.ok();

                    let file_name = video
                        .file_name()
                        .map(|f| f.to_string_lossy().to_string())
                        .unwrap_or_else(|| "unknown".to_string());
                    batch_pb.set_message(format!("Processing: {}", file_name));

                    let result = self.process_video(video, options).await;
                    match &result {
                        Ok(output) => {
                            info!(
                                "Done: {} ({} cues, detected '{}')",
                                file_name, output.cue_count, output.detected_language
                            );
                        }
                        Err(e) => {
                            error!("Failed [{}] {}: {}", e.stage(), file_name, e);
                        }
                    }

                    batch_pb.inc(1);
                    (
                        index,
                        JobReport {
                            video: video.clone(),
                            result,
                        },
                    )
                }
            })
            .buffer_unordered(self.config.pipeline.concurrency)
            .collect()
            .await;

        batch_pb.finish_and_clear();

        // Restore input order
        results.sort_by_key(|(index, _)| *index);
        let report = BatchReport {
            jobs: results.into_iter().map(|(_, job)| job).collect(),
        };

        info!(
            "Batch complete: {} succeeded, {} failed",
            report.success_count(),
            report.failure_count()
        );

        Ok(report)
    }

    /// Run one job with deadline enforcement and artifact cleanup
    async fn process_video(
        &self,
        video: &Path,
        options: &OutputOptions,
    ) -> Result<JobOutput, JobError> {
        // Transient names carry a per-job unique suffix so stems shared by
        // two inputs never collide in the shared scratch directory.
        let audio_path = FileManager::transient_path(&self.scratch_dir, video, "wav");
        let persist = options.persist_subtitle();
        let srt_path = if persist {
            let language = if self.config.translation.enabled {
                Some(self.config.translation.target_language.as_str())
            } else {
                None
            };
            match language {
                Some(lang) => FileManager::subtitle_output_path(video, &options.dir, lang),
                None => options.dir.join(format!("{}.srt", FileManager::stem(video))),
            }
        } else {
            FileManager::transient_path(&self.scratch_dir, video, "srt")
        };

        let stages = self.run_stages(video, options, &audio_path, &srt_path);
        let result = match self.config.pipeline.job_timeout_secs {
            Some(secs) => match tokio::time::timeout(Duration::from_secs(secs), stages).await {
                Ok(result) => result,
                Err(_) => Err(JobError::Timeout(secs)),
            },
            None => stages.await,
        };

        // The extracted audio is always transient; the subtitle file only
        // outlives a successful job when the caller asked to keep it.
        FileManager::remove_quietly(&audio_path);
        if result.is_err() || !persist {
            FileManager::remove_quietly(&srt_path);
        }

        result
    }

    /// The per-video state machine, strictly in stage order
    async fn run_stages(
        &self,
        video: &Path,
        options: &OutputOptions,
        audio_path: &Path,
        srt_path: &Path,
    ) -> Result<JobOutput, JobError> {
        if !video.exists() {
            return Err(JobError::Extraction(format!(
                "input file does not exist: {}",
                video.display()
            )));
        }

        debug!("[extract] {}", video.display());
        self.media
            .extract_audio(video, audio_path)
            .await
            .map_err(|e| JobError::Extraction(e.to_string()))?;

        debug!("[transcribe] {}", video.display());
        let transcript = self.recognizer.transcribe(audio_path).await?;

        let transcript = match (&self.translator, self.config.translation.enabled) {
            (Some(translator), true) => {
                debug!("[translate] {}", video.display());
                self.translate_transcript(translator, transcript).await?
            }
            _ => transcript,
        };

        debug!("[serialize] {}", video.display());
        transcript.validate(self.config.pipeline.strict_overlaps)?;
        let cues = cues_from_segments(&transcript.segments)?;
        let content = render_srt(&cues);
        write_srt(srt_path, &content).map_err(|e| JobError::Subtitle(e.to_string()))?;

        let video_path = if options.subtitle_only {
            None
        } else {
            debug!("[mux] {}", video.display());
            let output = FileManager::video_output_path(video, &options.dir);
            self.guard_against_overwrite(video, &output)?;
            self.media
                .mux_subtitles(video, srt_path, &self.config.pipeline.mux_style, &output)
                .await
                .map_err(|e| JobError::Mux(e.to_string()))?;
            Some(output)
        };

        Ok(JobOutput {
            subtitle_path: options.persist_subtitle().then(|| srt_path.to_path_buf()),
            video_path,
            detected_language: transcript.language.clone(),
            cue_count: cues.len(),
        })
    }

    /// Single batched translation call plus positional reinsertion
    async fn translate_transcript(
        &self,
        translator: &Arc<dyn Translator>,
        transcript: Transcript,
    ) -> Result<Transcript, JobError> {
        let target = &self.config.translation.target_language;
        let texts = transcript.texts();
        let translated = translator
            .translate(&transcript.language, target, texts)
            .await?;

        Ok(transcript.with_translated_texts(translated, target)?)
    }

    /// Refuse a mux destination that would clobber the input video
    fn guard_against_overwrite(&self, video: &Path, output: &Path) -> Result<(), JobError> {
        let same_name = video.file_name() == output.file_name();
        if !same_name {
            return Ok(());
        }

        let canonical_dir = |path: &Path| {
            path.parent()
                .map(|p| {
                    if p.as_os_str().is_empty() {
                        Path::new(".")
                    } else {
                        p
                    }
                })
                .and_then(|p| p.canonicalize().ok())
        };
        let video_dir = canonical_dir(video);
        let output_dir = canonical_dir(output);
        if video_dir.is_some() && video_dir == output_dir {
            return Err(JobError::Mux(format!(
                "output {} would overwrite the input video",
                output.display()
            )));
        }

        Ok(())
    }
}
