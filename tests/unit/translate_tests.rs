/*!
 * Tests for the translation client's batching and marker protocol
 */

use subvox::app_config::TranslationConfig;
use subvox::engines::translate::HttpTranslator;
use subvox::errors::TranslationError;

fn translator_with_budget(max_chars: usize) -> HttpTranslator {
    let config = TranslationConfig {
        max_chars_per_request: max_chars,
        ..TranslationConfig::default()
    };
    HttpTranslator::new(config)
}

/// Test prompt construction markers
#[test]
fn test_build_prompt_withTexts_shouldDelimitEntries() {
    let texts = vec!["hello".to_string(), "world".to_string()];
    let prompt = HttpTranslator::build_prompt(&texts);

    assert_eq!(prompt, "<<ENTRY_0>>\nhello\n<<ENTRY_1>>\nworld\n<<END>>");
}

/// Test that a prompt-shaped response parses back to the original texts
#[test]
fn test_parse_response_withWellFormedResponse_shouldRecoverEntries() {
    let texts = vec!["bonjour".to_string(), "le monde".to_string()];
    let response = HttpTranslator::build_prompt(&texts);

    let parsed = HttpTranslator::parse_response(&response, 2).unwrap();
    assert_eq!(parsed, vec!["bonjour", "le monde"]);
}

/// Test parsing rejects responses with a missing entry marker
#[test]
fn test_parse_response_withMissingMarker_shouldFail() {
    let response = "<<ENTRY_0>>\nbonjour\n<<END>>";
    let result = HttpTranslator::parse_response(response, 2);

    assert!(matches!(result, Err(TranslationError::MarkerParse(_))));
}

/// Test parsing rejects responses with a missing end marker
#[test]
fn test_parse_response_withMissingEndMarker_shouldFail() {
    let response = "<<ENTRY_0>>\nbonjour";
    let result = HttpTranslator::parse_response(response, 1);

    assert!(matches!(result, Err(TranslationError::MarkerParse(_))));
}

/// Test parsing a multi-line entry
#[test]
fn test_parse_response_withMultiLineEntry_shouldKeepInnerNewlines() {
    let response = "<<ENTRY_0>>\nline one\nline two\n<<END>>";
    let parsed = HttpTranslator::parse_response(response, 1).unwrap();

    assert_eq!(parsed, vec!["line one\nline two"]);
}

/// Test chunking keeps order and loses nothing
#[test]
fn test_split_into_chunks_withManyTexts_shouldPreserveOrderAndCount() {
    let translator = translator_with_budget(100);
    let texts: Vec<String> = (0..10).map(|i| format!("segment number {}", i)).collect();

    let chunks = translator.split_into_chunks(&texts);

    let total: usize = chunks.iter().map(|c| c.len()).sum();
    assert_eq!(total, texts.len());
    assert!(chunks.len() > 1);

    let flattened: Vec<String> = chunks.into_iter().flatten().collect();
    assert_eq!(flattened, texts);
}

/// Test that an oversized entry gets its own chunk
#[test]
fn test_split_into_chunks_withOversizedEntry_shouldIsolateIt() {
    let translator = translator_with_budget(100);
    let big = "x".repeat(500);
    let texts = vec!["small".to_string(), big.clone(), "tiny".to_string()];

    let chunks = translator.split_into_chunks(&texts);

    assert!(chunks.iter().any(|c| c.len() == 1 && c[0] == big));
    let total: usize = chunks.iter().map(|c| c.len()).sum();
    assert_eq!(total, 3);
}

/// Test that everything fits in one chunk under a large budget
#[test]
fn test_split_into_chunks_withLargeBudget_shouldUseSingleChunk() {
    let translator = translator_with_budget(100_000);
    let texts: Vec<String> = (0..5).map(|i| format!("text {}", i)).collect();

    let chunks = translator.split_into_chunks(&texts);
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0], texts);
}
