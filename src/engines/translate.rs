use std::time::Duration;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use log::{error, debug};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::app_config::TranslationConfig;
use crate::engines::Translator;
use crate::errors::TranslationError;
use crate::language_utils;

// @module: HTTP LLM translation client

/// Upper bound on entries per request; large batches make the model drop lines
const MAX_ENTRIES_PER_CHUNK: usize = 40;

/// Generate request for the translation endpoint
#[derive(Debug, Serialize)]
struct GenerationRequest {
    /// Model name to use for generation
    model: String,
    /// Prompt holding the marker-delimited batch
    prompt: String,
    /// System message carrying the translation instruction
    system: String,
    /// Whether to stream the response
    stream: bool,
}

/// Generate response from the translation endpoint
#[derive(Debug, Deserialize)]
struct GenerationResponse {
    /// Generated text
    response: String,
}

/// Translation client speaking the Ollama-style generate API
///
/// Each request carries a batch of segment texts delimited by `<<ENTRY_n>>`
/// markers; the response is split back on the same markers, preserving
/// order. Long transcripts are chunked by character budget, and the chunks
/// are reassembled in submission order.
pub struct HttpTranslator {
    // @field: Translation settings
    config: TranslationConfig,

    // @field: HTTP client with the configured timeout
    client: Client,
}

impl HttpTranslator {
    /// Create a client from the translation configuration
    pub fn new(config: TranslationConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        HttpTranslator { config, client }
    }

    /// Split texts into chunks that respect the character budget
    ///
    /// Chunk boundaries never reorder or drop entries; an oversized entry
    /// gets a chunk of its own.
    pub fn split_into_chunks(&self, texts: &[String]) -> Vec<Vec<String>> {
        let effective_max_chars = self.config.max_chars_per_request.max(100);

        let mut chunks = Vec::new();
        let mut current: Vec<String> = Vec::new();
        let mut current_size = 0;

        for (idx, text) in texts.iter().enumerate() {
            let entry_size = text.len();

            if entry_size > effective_max_chars {
                if !current.is_empty() {
                    chunks.push(std::mem::take(&mut current));
                    current_size = 0;
                }
                debug!("Entry {} is oversized ({} chars), placing in its own chunk", idx, entry_size);
                chunks.push(vec![text.clone()]);
                continue;
            }

            if !current.is_empty()
                && (current_size + entry_size > effective_max_chars
                    || current.len() >= MAX_ENTRIES_PER_CHUNK)
            {
                chunks.push(std::mem::take(&mut current));
                current_size = 0;
            }

            current.push(text.clone());
            current_size += entry_size;
        }

        if !current.is_empty() {
            chunks.push(current);
        }

        chunks
    }

    /// Build the marker-delimited prompt for one chunk
    pub fn build_prompt(texts: &[String]) -> String {
        let mut prompt = String::new();
        for (idx, text) in texts.iter().enumerate() {
            prompt.push_str(&format!("<<ENTRY_{}>>\n", idx));
            prompt.push_str(text);
            prompt.push('\n');
        }
        prompt.push_str("<<END>>");
        prompt
    }

    /// Build the system instruction for a language pair
    fn build_system_prompt(source_language: &str, target_language: &str) -> String {
        let source_name = language_utils::get_language_name(source_language)
            .unwrap_or_else(|_| source_language.to_string());
        let target_name = language_utils::get_language_name(target_language)
            .unwrap_or_else(|_| target_language.to_string());

        format!(
            "You are a professional subtitle translator. Translate each entry below from {} to {}. \
             Keep every <<ENTRY_n>> marker and the <<END>> marker exactly as they appear, in the same order, \
             and put each translation directly after its marker. Translate the text only; never merge, \
             split, add, or drop entries.",
            source_name, target_name
        )
    }

    /// Split a marker-delimited response back into one text per entry
    pub fn parse_response(response: &str, expected: usize) -> Result<Vec<String>, TranslationError> {
        let mut texts = Vec::with_capacity(expected);
        let mut cursor = 0;

        for idx in 0..expected {
            let start_marker = format!("<<ENTRY_{}>>", idx);
            let end_marker = if idx == expected - 1 {
                "<<END>>".to_string()
            } else {
                format!("<<ENTRY_{}>>", idx + 1)
            };

            let start = response[cursor..]
                .find(&start_marker)
                .map(|pos| cursor + pos + start_marker.len())
                .ok_or_else(|| {
                    TranslationError::MarkerParse(format!("missing marker for entry {}", idx))
                })?;

            let end = response[start..]
                .find(&end_marker)
                .map(|pos| start + pos)
                .ok_or_else(|| {
                    TranslationError::MarkerParse(format!("missing end marker after entry {}", idx))
                })?;

            texts.push(response[start..end].trim().to_string());
            cursor = end;
        }

        Ok(texts)
    }

    /// Send one chunk to the endpoint, with bounded retries on transient failures
    async fn translate_chunk(
        &self,
        system: &str,
        texts: &[String],
    ) -> Result<Vec<String>, TranslationError> {
        let url = format!("{}/api/generate", self.config.endpoint.trim_end_matches('/'));
        let request = GenerationRequest {
            model: self.config.model.clone(),
            prompt: Self::build_prompt(texts),
            system: system.to_string(),
            stream: false,
        };

        let mut attempt = 0;
        let mut last_error = None;

        while attempt <= self.config.retry_count {
            if attempt > 0 {
                let backoff_ms = self.config.retry_backoff_ms * (1u64 << (attempt - 1));
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            }

            match self.client.post(&url).json(&request).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let parsed: GenerationResponse = response.json().await.map_err(|e| {
                            TranslationError::Provider(format!(
                                "failed to parse endpoint response: {}",
                                e
                            ))
                        })?;
                        return Self::parse_response(&parsed.response, texts.len());
                    } else if status.is_server_error() {
                        let body = response.text().await.unwrap_or_default();
                        error!(
                            "Translation endpoint error ({}): {} - attempt {}/{}",
                            status, body, attempt + 1, self.config.retry_count + 1
                        );
                        last_error = Some(TranslationError::Provider(format!(
                            "endpoint error ({}): {}",
                            status, body
                        )));
                    } else {
                        let body = response.text().await.unwrap_or_default();
                        return Err(TranslationError::Provider(format!(
                            "endpoint error ({}): {}",
                            status, body
                        )));
                    }
                }
                Err(e) => {
                    error!(
                        "Translation endpoint network error: {} - attempt {}/{}",
                        e, attempt + 1, self.config.retry_count + 1
                    );
                    last_error = Some(TranslationError::Provider(e.to_string()));
                }
            }

            attempt += 1;
        }

        Err(last_error.unwrap_or_else(|| {
            TranslationError::Provider(format!(
                "request failed after {} attempts",
                self.config.retry_count + 1
            ))
        }))
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate(
        &self,
        source_language: &str,
        target_language: &str,
        texts: Vec<String>,
    ) -> Result<Vec<String>, TranslationError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let system = Self::build_system_prompt(source_language, target_language);
        let chunks = self.split_into_chunks(&texts);
        debug!(
            "Translating {} texts in {} chunk(s), {} -> {}",
            texts.len(),
            chunks.len(),
            source_language,
            target_language
        );

        // buffered() preserves submission order, so reassembly is a flatten
        let mut futures = Vec::with_capacity(chunks.len());
        for chunk_texts in &chunks {
            futures.push(self.translate_chunk(&system, chunk_texts));
        }
        let results: Vec<Result<Vec<String>, TranslationError>> = stream::iter(futures)
            .buffered(self.config.concurrent_requests.max(1))
            .collect()
            .await;

        let mut translated = Vec::with_capacity(texts.len());
        for result in results {
            translated.extend(result?);
        }

        Ok(translated)
    }
}
