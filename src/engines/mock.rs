/*!
 * Mock collaborator implementations for testing.
 *
 * Scripted recognizers, translators, and media backends covering the
 * behaviors the pipeline has to survive: clean runs, collaborator failures,
 * and translators that break the positional contract.
 */

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use anyhow::{Result, anyhow};
use async_trait::async_trait;

use crate::engines::{SpeechRecognizer, Translator};
use crate::errors::{RecognizerError, TranslationError};
use crate::media::MediaBackend;
use crate::segment::Transcript;

/// Scripted recognizer behavior
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecognizerBehavior {
    /// Return the scripted transcript
    Working,
    /// Always fail inference
    Failing,
}

/// Mock recognizer returning a scripted transcript
pub struct MockRecognizer {
    /// Transcript handed out on success
    transcript: Transcript,
    /// Behavior mode
    behavior: RecognizerBehavior,
}

impl MockRecognizer {
    /// Recognizer that always returns the given transcript
    pub fn with_transcript(transcript: Transcript) -> Self {
        Self {
            transcript,
            behavior: RecognizerBehavior::Working,
        }
    }

    /// Recognizer that always fails
    pub fn failing() -> Self {
        Self {
            transcript: Transcript::new(Vec::new(), "en"),
            behavior: RecognizerBehavior::Failing,
        }
    }
}

#[async_trait]
impl SpeechRecognizer for MockRecognizer {
    async fn transcribe(&self, _audio_path: &Path) -> Result<Transcript, RecognizerError> {
        match self.behavior {
            RecognizerBehavior::Working => Ok(self.transcript.clone()),
            RecognizerBehavior::Failing => {
                Err(RecognizerError::Inference("mock inference failure".to_string()))
            }
        }
    }
}

/// Scripted translator behavior
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TranslatorBehavior {
    /// Tag each text with the target language
    Working,
    /// Return one fewer text than requested
    DropsLast,
    /// Always fail with a provider error
    Failing,
    /// Simulate a slow provider (for timeout testing)
    Slow { delay_ms: u64 },
}

/// Mock translator for exercising the reinsertion contract
pub struct MockTranslator {
    /// Behavior mode
    behavior: TranslatorBehavior,
    /// Number of translate calls observed
    call_count: Arc<AtomicUsize>,
}

impl MockTranslator {
    /// Create a mock translator with the specified behavior
    pub fn new(behavior: TranslatorBehavior) -> Self {
        Self {
            behavior,
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Translator that tags each text with the target language
    pub fn working() -> Self {
        Self::new(TranslatorBehavior::Working)
    }

    /// Translator that silently drops the last text
    pub fn drops_last() -> Self {
        Self::new(TranslatorBehavior::DropsLast)
    }

    /// Translator that always fails
    pub fn failing() -> Self {
        Self::new(TranslatorBehavior::Failing)
    }

    /// Shared handle to the call counter
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.call_count)
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(
        &self,
        _source_language: &str,
        target_language: &str,
        texts: Vec<String>,
    ) -> Result<Vec<String>, TranslationError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        match self.behavior {
            TranslatorBehavior::Working => Ok(texts
                .iter()
                .map(|t| format!("[{}] {}", target_language, t))
                .collect()),
            TranslatorBehavior::DropsLast => {
                let mut translated: Vec<String> = texts
                    .iter()
                    .map(|t| format!("[{}] {}", target_language, t))
                    .collect();
                translated.pop();
                Ok(translated)
            }
            TranslatorBehavior::Failing => {
                Err(TranslationError::Provider("mock provider failure".to_string()))
            }
            TranslatorBehavior::Slow { delay_ms } => {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Ok(texts)
            }
        }
    }
}

/// Scripted media backend behavior
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MediaBehavior {
    /// Both operations succeed
    Working,
    /// Audio extraction fails
    FailExtraction,
    /// Muxing fails
    FailMux,
}

/// Mock media backend writing placeholder artifacts
pub struct MockMedia {
    /// Behavior mode
    behavior: MediaBehavior,
    /// Restrict extraction failure to inputs whose name contains this pattern
    fail_pattern: Option<String>,
    /// Number of mux calls observed
    mux_count: Arc<AtomicUsize>,
}

impl MockMedia {
    /// Create a mock media backend with the specified behavior
    pub fn new(behavior: MediaBehavior) -> Self {
        Self {
            behavior,
            fail_pattern: None,
            mux_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Media backend where both operations succeed
    pub fn working() -> Self {
        Self::new(MediaBehavior::Working)
    }

    /// Media backend that fails audio extraction
    pub fn fail_extraction() -> Self {
        Self::new(MediaBehavior::FailExtraction)
    }

    /// Media backend that fails extraction only for inputs matching `pattern`
    pub fn fail_extraction_matching(pattern: impl Into<String>) -> Self {
        Self {
            behavior: MediaBehavior::FailExtraction,
            fail_pattern: Some(pattern.into()),
            mux_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Media backend that fails muxing
    pub fn fail_mux() -> Self {
        Self::new(MediaBehavior::FailMux)
    }

    /// Shared handle to the mux call counter
    pub fn mux_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.mux_count)
    }

    fn extraction_fails_for(&self, video_path: &Path) -> bool {
        if self.behavior != MediaBehavior::FailExtraction {
            return false;
        }
        match &self.fail_pattern {
            Some(pattern) => video_path.to_string_lossy().contains(pattern.as_str()),
            None => true,
        }
    }
}

#[async_trait]
impl MediaBackend for MockMedia {
    async fn extract_audio(&self, video_path: &Path, audio_path: &Path) -> Result<()> {
        if self.extraction_fails_for(video_path) {
            return Err(anyhow!("mock extraction failure for {:?}", video_path));
        }

        std::fs::write(audio_path, b"mock-audio")?;
        Ok(())
    }

    async fn mux_subtitles(
        &self,
        video_path: &Path,
        subtitle_path: &Path,
        _style: &str,
        output_path: &Path,
    ) -> Result<()> {
        self.mux_count.fetch_add(1, Ordering::SeqCst);

        if self.behavior == MediaBehavior::FailMux {
            return Err(anyhow!("mock mux failure for {:?}", video_path));
        }

        if !subtitle_path.exists() {
            return Err(anyhow!("subtitle file missing: {:?}", subtitle_path));
        }

        std::fs::write(output_path, b"mock-video")?;
        Ok(())
    }
}
