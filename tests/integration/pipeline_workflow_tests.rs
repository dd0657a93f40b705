/*!
 * End-to-end pipeline tests over mock collaborators
 */

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use anyhow::Result;
use tempfile::TempDir;

use subvox::app_config::Config;
use subvox::engines::mock::{MockMedia, MockRecognizer, MockTranslator, TranslatorBehavior};
use subvox::engines::{SpeechRecognizer, Translator};
use subvox::media::MediaBackend;
use subvox::pipeline::{OutputOptions, Pipeline};
use subvox::segment::{TimedSegment, Transcript};
use crate::common;

/// Everything a pipeline test needs, with the scratch and output dirs kept alive
struct TestHarness {
    pipeline: Pipeline,
    _scratch: TempDir,
    scratch_path: PathBuf,
    output: TempDir,
}

impl TestHarness {
    fn new(
        config: Config,
        recognizer: Arc<dyn SpeechRecognizer>,
        translator: Option<Arc<dyn Translator>>,
        media: Arc<dyn MediaBackend>,
    ) -> Result<Self> {
        let scratch = common::create_temp_dir()?;
        let output = common::create_temp_dir()?;
        let scratch_path = scratch.path().to_path_buf();
        let pipeline = Pipeline::new(config, recognizer, translator, media, scratch_path.clone())?;

        Ok(Self {
            pipeline,
            _scratch: scratch,
            scratch_path,
            output,
        })
    }

    fn working(config: Config) -> Result<Self> {
        Self::new(
            config,
            Arc::new(MockRecognizer::with_transcript(common::sample_transcript())),
            None,
            Arc::new(MockMedia::working()),
        )
    }

    fn options(&self, keep_subtitle: bool, subtitle_only: bool) -> OutputOptions {
        OutputOptions {
            dir: self.output.path().to_path_buf(),
            keep_subtitle,
            subtitle_only,
        }
    }

    fn scratch_is_empty(&self) -> bool {
        std::fs::read_dir(&self.scratch_path)
            .map(|entries| entries.count() == 0)
            .unwrap_or(false)
    }
}

/// Test the exact subtitle produced by the two-segment scenario
#[tokio::test]
async fn test_run_batch_withSrtOnly_shouldWriteExactSubtitleFile() -> Result<()> {
    let harness = TestHarness::working(Config::default())?;
    let videos_dir = common::create_temp_dir()?;
    let video = common::create_test_video(&videos_dir.path().to_path_buf(), "movie.mkv")?;

    let report = harness
        .pipeline
        .run_batch(&[video], &harness.options(false, true))
        .await?;

    assert_eq!(report.success_count(), 1);
    let output = report.jobs[0].result.as_ref().unwrap();
    assert!(output.video_path.is_none());

    let subtitle_path = output.subtitle_path.as_ref().unwrap();
    assert_eq!(subtitle_path.file_name().unwrap(), "movie.srt");

    let content = std::fs::read_to_string(subtitle_path)?;
    let expected = "1\n00:00:00,000 --> 00:00:01,500\nhello\n\n2\n00:00:01,500 --> 00:00:03,000\nworld\n\n";
    assert_eq!(content, expected);

    // The extracted audio never outlives the job
    assert!(harness.scratch_is_empty());

    Ok(())
}

/// Test that subtitle-only mode never invokes the muxer
#[tokio::test]
async fn test_run_batch_withSrtOnly_shouldSkipMuxing() -> Result<()> {
    let media = MockMedia::working();
    let mux_counter = media.mux_counter();

    let harness = TestHarness::new(
        Config::default(),
        Arc::new(MockRecognizer::with_transcript(common::sample_transcript())),
        None,
        Arc::new(media),
    )?;
    let videos_dir = common::create_temp_dir()?;
    let video = common::create_test_video(&videos_dir.path().to_path_buf(), "movie.mkv")?;

    let report = harness
        .pipeline
        .run_batch(&[video], &harness.options(false, true))
        .await?;

    assert_eq!(report.success_count(), 1);
    assert_eq!(mux_counter.load(Ordering::SeqCst), 0);

    Ok(())
}

/// Test the default flow muxes and discards the transient subtitle
#[tokio::test]
async fn test_run_batch_withMuxing_shouldProduceVideoAndDiscardTransientSrt() -> Result<()> {
    let harness = TestHarness::working(Config::default())?;
    let videos_dir = common::create_temp_dir()?;
    let video = common::create_test_video(&videos_dir.path().to_path_buf(), "movie.mkv")?;

    let report = harness
        .pipeline
        .run_batch(&[video], &harness.options(false, false))
        .await?;

    assert_eq!(report.success_count(), 1);
    let output = report.jobs[0].result.as_ref().unwrap();

    let video_path = output.video_path.as_ref().unwrap();
    assert_eq!(video_path.file_name().unwrap(), "movie.mp4");
    assert!(video_path.exists());

    assert!(output.subtitle_path.is_none());
    assert!(harness.scratch_is_empty());

    Ok(())
}

/// Test that the subtitle file survives next to the video when requested
#[tokio::test]
async fn test_run_batch_withOutputSrt_shouldKeepBothArtifacts() -> Result<()> {
    let harness = TestHarness::working(Config::default())?;
    let videos_dir = common::create_temp_dir()?;
    let video = common::create_test_video(&videos_dir.path().to_path_buf(), "movie.mkv")?;

    let report = harness
        .pipeline
        .run_batch(&[video], &harness.options(true, false))
        .await?;

    let output = report.jobs[0].result.as_ref().unwrap();
    assert!(output.video_path.as_ref().unwrap().exists());
    assert!(output.subtitle_path.as_ref().unwrap().exists());

    Ok(())
}

/// Test translated output carries target-language text with source timing
#[tokio::test]
async fn test_run_batch_withTranslation_shouldRewriteTextsAndKeepTiming() -> Result<()> {
    let mut config = Config::default();
    config.translation.enabled = true;
    config.translation.target_language = "fr".to_string();

    let harness = TestHarness::new(
        config,
        Arc::new(MockRecognizer::with_transcript(common::sample_transcript())),
        Some(Arc::new(MockTranslator::working())),
        Arc::new(MockMedia::working()),
    )?;
    let videos_dir = common::create_temp_dir()?;
    let video = common::create_test_video(&videos_dir.path().to_path_buf(), "movie.mkv")?;

    let report = harness
        .pipeline
        .run_batch(&[video], &harness.options(false, true))
        .await?;

    let output = report.jobs[0].result.as_ref().unwrap();
    let subtitle_path = output.subtitle_path.as_ref().unwrap();
    assert_eq!(subtitle_path.file_name().unwrap(), "movie.fr.srt");

    let content = std::fs::read_to_string(subtitle_path)?;
    assert!(content.contains("00:00:00,000 --> 00:00:01,500"));
    assert!(content.contains("[fr] hello"));
    assert!(content.contains("[fr] world"));

    Ok(())
}

/// Test that a translator breaking the positional contract fails the job
#[tokio::test]
async fn test_run_batch_withDroppingTranslator_shouldFailInTranslateStage() -> Result<()> {
    let mut config = Config::default();
    config.translation.enabled = true;
    config.translation.target_language = "fr".to_string();

    let harness = TestHarness::new(
        config,
        Arc::new(MockRecognizer::with_transcript(common::sample_transcript())),
        Some(Arc::new(MockTranslator::drops_last())),
        Arc::new(MockMedia::working()),
    )?;
    let videos_dir = common::create_temp_dir()?;
    let video = common::create_test_video(&videos_dir.path().to_path_buf(), "movie.mkv")?;

    let report = harness
        .pipeline
        .run_batch(&[video], &harness.options(false, true))
        .await?;

    assert_eq!(report.failure_count(), 1);
    let error = report.jobs[0].result.as_ref().unwrap_err();
    assert_eq!(error.stage(), "translate");
    assert!(error.to_string().contains("count mismatch"));

    Ok(())
}

/// Test per-job isolation: one failing extraction leaves its sibling intact
#[tokio::test]
async fn test_run_batch_withOneFailingExtraction_shouldIsolateJobs() -> Result<()> {
    let mut config = Config::default();
    config.pipeline.concurrency = 2;

    let harness = TestHarness::new(
        config,
        Arc::new(MockRecognizer::with_transcript(common::sample_transcript())),
        None,
        Arc::new(MockMedia::fail_extraction_matching("broken")),
    )?;
    let videos_dir = common::create_temp_dir()?;
    let dir = videos_dir.path().to_path_buf();
    let broken = common::create_test_video(&dir, "broken.mkv")?;
    let fine = common::create_test_video(&dir, "fine.mkv")?;

    let report = harness
        .pipeline
        .run_batch(&[broken.clone(), fine.clone()], &harness.options(false, true))
        .await?;

    assert_eq!(report.jobs.len(), 2);
    assert_eq!(report.success_count(), 1);
    assert_eq!(report.failure_count(), 1);
    assert!(report.has_failures());

    // Report preserves input order
    assert_eq!(report.jobs[0].video, broken);
    assert_eq!(report.jobs[1].video, fine);

    let failure = report.jobs[0].result.as_ref().unwrap_err();
    assert_eq!(failure.stage(), "extract");

    let success = report.jobs[1].result.as_ref().unwrap();
    assert!(success.subtitle_path.as_ref().unwrap().exists());

    Ok(())
}

/// Test that a slow collaborator trips the whole-job deadline
#[tokio::test]
async fn test_run_batch_withSlowTranslator_shouldTimeOutJob() -> Result<()> {
    let mut config = Config::default();
    config.translation.enabled = true;
    config.translation.target_language = "fr".to_string();
    config.pipeline.job_timeout_secs = Some(1);

    let harness = TestHarness::new(
        config,
        Arc::new(MockRecognizer::with_transcript(common::sample_transcript())),
        Some(Arc::new(MockTranslator::new(TranslatorBehavior::Slow {
            delay_ms: 5_000,
        }))),
        Arc::new(MockMedia::working()),
    )?;
    let videos_dir = common::create_temp_dir()?;
    let video = common::create_test_video(&videos_dir.path().to_path_buf(), "movie.mkv")?;

    let report = harness
        .pipeline
        .run_batch(&[video], &harness.options(false, true))
        .await?;

    let error = report.jobs[0].result.as_ref().unwrap_err();
    assert_eq!(error.stage(), "timeout");

    // Partial artifacts are removed with the failed job
    assert!(harness.scratch_is_empty());

    Ok(())
}

/// Test that a missing input fails in the extraction stage
#[tokio::test]
async fn test_run_batch_withMissingInput_shouldFailInExtractStage() -> Result<()> {
    let harness = TestHarness::working(Config::default())?;

    let report = harness
        .pipeline
        .run_batch(
            &[PathBuf::from("/nonexistent/movie.mkv")],
            &harness.options(false, true),
        )
        .await?;

    let error = report.jobs[0].result.as_ref().unwrap_err();
    assert_eq!(error.stage(), "extract");

    Ok(())
}

/// Test that a malformed recognizer segment fails serialization
#[tokio::test]
async fn test_run_batch_withMalformedSegment_shouldFailInSerializeStage() -> Result<()> {
    let transcript = Transcript::new(vec![TimedSegment::new(2.0, 1.0, "backwards")], "en");

    let harness = TestHarness::new(
        Config::default(),
        Arc::new(MockRecognizer::with_transcript(transcript)),
        None,
        Arc::new(MockMedia::working()),
    )?;
    let videos_dir = common::create_temp_dir()?;
    let video = common::create_test_video(&videos_dir.path().to_path_buf(), "movie.mkv")?;

    let report = harness
        .pipeline
        .run_batch(&[video], &harness.options(false, true))
        .await?;

    let error = report.jobs[0].result.as_ref().unwrap_err();
    assert_eq!(error.stage(), "serialize");

    Ok(())
}

/// Test that a failing muxer removes the persisted subtitle with the job
#[tokio::test]
async fn test_run_batch_withFailingMux_shouldFailAndCleanUp() -> Result<()> {
    let harness = TestHarness::new(
        Config::default(),
        Arc::new(MockRecognizer::with_transcript(common::sample_transcript())),
        None,
        Arc::new(MockMedia::fail_mux()),
    )?;
    let videos_dir = common::create_temp_dir()?;
    let video = common::create_test_video(&videos_dir.path().to_path_buf(), "movie.mkv")?;

    let report = harness
        .pipeline
        .run_batch(&[video], &harness.options(true, false))
        .await?;

    let error = report.jobs[0].result.as_ref().unwrap_err();
    assert_eq!(error.stage(), "mux");

    // Nothing survives a failed job
    assert!(harness.scratch_is_empty());
    let leftover: Vec<_> = std::fs::read_dir(harness.output.path())?.collect();
    assert!(leftover.is_empty());

    Ok(())
}

/// Test that an empty transcript still serializes to a valid empty file
#[tokio::test]
async fn test_run_batch_withEmptyTranscript_shouldWriteEmptySubtitleFile() -> Result<()> {
    let harness = TestHarness::new(
        Config::default(),
        Arc::new(MockRecognizer::with_transcript(Transcript::new(Vec::new(), "en"))),
        None,
        Arc::new(MockMedia::working()),
    )?;
    let videos_dir = common::create_temp_dir()?;
    let video = common::create_test_video(&videos_dir.path().to_path_buf(), "silent.mkv")?;

    let report = harness
        .pipeline
        .run_batch(&[video], &harness.options(false, true))
        .await?;

    let output = report.jobs[0].result.as_ref().unwrap();
    assert_eq!(output.cue_count, 0);

    let content = std::fs::read_to_string(output.subtitle_path.as_ref().unwrap())?;
    assert!(content.is_empty());

    Ok(())
}

/// Test that a failing recognizer lands in the transcription stage
#[tokio::test]
async fn test_run_batch_withFailingRecognizer_shouldFailInTranscribeStage() -> Result<()> {
    let harness = TestHarness::new(
        Config::default(),
        Arc::new(MockRecognizer::failing()),
        None,
        Arc::new(MockMedia::working()),
    )?;
    let videos_dir = common::create_temp_dir()?;
    let video = common::create_test_video(&videos_dir.path().to_path_buf(), "movie.mkv")?;

    let report = harness
        .pipeline
        .run_batch(&[video], &harness.options(false, true))
        .await?;

    let error = report.jobs[0].result.as_ref().unwrap_err();
    assert_eq!(error.stage(), "transcribe");

    Ok(())
}

/// Test that enabling translation without a translator is rejected up front
#[test]
fn test_pipeline_new_withTranslationEnabledButNoTranslator_shouldFail() {
    let mut config = Config::default();
    config.translation.enabled = true;

    let result = Pipeline::new(
        config,
        Arc::new(MockRecognizer::with_transcript(common::sample_transcript())),
        None,
        Arc::new(MockMedia::working()),
        PathBuf::from("/tmp"),
    );

    assert!(result.is_err());
}

/// Test that an empty batch is rejected
#[tokio::test]
async fn test_run_batch_withNoVideos_shouldError() -> Result<()> {
    let harness = TestHarness::working(Config::default())?;

    let result = harness
        .pipeline
        .run_batch(&[], &harness.options(false, true))
        .await;

    assert!(result.is_err());
    Ok(())
}
