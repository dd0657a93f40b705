use std::path::Path;
use std::sync::{Arc, Mutex};
use async_trait::async_trait;
use log::{info, debug, warn};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::app_config::RecognitionConfig;
use crate::engines::SpeechRecognizer;
use crate::errors::RecognizerError;
use crate::segment::{TimedSegment, Transcript};

// @module: whisper.cpp speech recognition adapter

/// Sample rate the recognition model expects
const EXPECTED_SAMPLE_RATE: u32 = 16_000;

/// Speech recognizer backed by a locally loaded whisper.cpp model
///
/// The context is loaded once and shared across jobs; invocation goes
/// through a mutex because a whisper context must not run two inference
/// calls at the same time.
pub struct WhisperRecognizer {
    // @field: Loaded model context, invocation serialized
    context: Arc<Mutex<WhisperContext>>,

    // @field: Pinned source language, None for auto-detection
    language: Option<String>,

    // @field: Inference thread count, 0 for the library default
    threads: usize,
}

impl WhisperRecognizer {
    /// Load the configured model file into memory
    pub fn load(config: &RecognitionConfig) -> Result<Self, RecognizerError> {
        let model_path = config.model_path();

        info!(
            "Loading recognition model '{}' from {}",
            config.model_size,
            model_path.display()
        );

        let path_str = model_path.to_str().ok_or_else(|| RecognizerError::ModelLoad {
            path: model_path.clone(),
            reason: "model path is not valid UTF-8".to_string(),
        })?;

        let context =
            WhisperContext::new_with_params(path_str, WhisperContextParameters::default())
                .map_err(|e| RecognizerError::ModelLoad {
                    path: model_path.clone(),
                    reason: e.to_string(),
                })?;

        Ok(WhisperRecognizer {
            context: Arc::new(Mutex::new(context)),
            language: config.language.clone(),
            threads: config.threads,
        })
    }

    /// Read a mono 16 kHz 16-bit PCM WAV file into normalized f32 samples
    fn read_wav_samples(audio_path: &Path) -> Result<Vec<f32>, RecognizerError> {
        let reader = hound::WavReader::open(audio_path).map_err(|e| RecognizerError::Audio {
            path: audio_path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let spec = reader.spec();
        if spec.channels != 1 || spec.sample_rate != EXPECTED_SAMPLE_RATE {
            return Err(RecognizerError::Audio {
                path: audio_path.to_path_buf(),
                reason: format!(
                    "expected mono {} Hz audio, got {} channel(s) at {} Hz",
                    EXPECTED_SAMPLE_RATE, spec.channels, spec.sample_rate
                ),
            });
        }

        let samples: Result<Vec<i16>, _> = reader.into_samples::<i16>().collect();
        let samples = samples.map_err(|e| RecognizerError::Audio {
            path: audio_path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Ok(samples.iter().map(|&s| s as f32 / 32_768.0).collect())
    }
}

#[async_trait]
impl SpeechRecognizer for WhisperRecognizer {
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcript, RecognizerError> {
        let samples = Self::read_wav_samples(audio_path)?;
        debug!(
            "Transcribing {} ({} samples)",
            audio_path.display(),
            samples.len()
        );

        let context = Arc::clone(&self.context);
        let language = self.language.clone();
        let threads = self.threads;

        // Compute-bound, so off the async runtime; the mutex keeps two jobs
        // from invoking the same context at once.
        let transcript = tokio::task::spawn_blocking(move || {
            let guard = context
                .lock()
                .map_err(|_| RecognizerError::Inference("model mutex poisoned".to_string()))?;

            let mut state = guard
                .create_state()
                .map_err(|e| RecognizerError::Inference(e.to_string()))?;

            let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
            params.set_print_progress(false);
            params.set_print_realtime(false);
            params.set_print_timestamps(false);
            params.set_language(Some(language.as_deref().unwrap_or("auto")));
            if threads > 0 {
                params.set_n_threads(threads as i32);
            }

            state
                .full(params, &samples)
                .map_err(|e| RecognizerError::Inference(e.to_string()))?;

            let detected = match state.full_lang_id_from_state() {
                Ok(id) => whisper_rs::get_lang_str(id).unwrap_or("en").to_string(),
                Err(e) => {
                    warn!("Language detection unavailable ({}), assuming English", e);
                    "en".to_string()
                }
            };

            let segment_count = state
                .full_n_segments()
                .map_err(|e| RecognizerError::Inference(e.to_string()))?;

            let mut segments = Vec::with_capacity(segment_count as usize);
            for i in 0..segment_count {
                let text = state
                    .full_get_segment_text(i)
                    .map_err(|e| RecognizerError::Inference(e.to_string()))?;
                let start = state
                    .full_get_segment_t0(i)
                    .map_err(|e| RecognizerError::Inference(e.to_string()))?;
                let end = state
                    .full_get_segment_t1(i)
                    .map_err(|e| RecognizerError::Inference(e.to_string()))?;

                // Timestamps arrive in centiseconds
                segments.push(TimedSegment::new(
                    start as f64 / 100.0,
                    end as f64 / 100.0,
                    text.trim().to_string(),
                ));
            }

            Ok::<Transcript, RecognizerError>(Transcript::new(segments, detected))
        })
        .await
        .map_err(|e| RecognizerError::Inference(format!("inference task failed: {}", e)))??;

        debug!(
            "Recognized {} segments, detected language '{}'",
            transcript.segments.len(),
            transcript.language
        );

        Ok(transcript)
    }
}
