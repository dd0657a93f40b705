use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for ISO language code handling
///
/// The recognizer reports ISO 639-1 (2-letter) codes; callers may configure
/// the target language as either a 2-letter or 3-letter code. These helpers
/// validate, normalize, and name such codes for prompts and filenames.
/// Validate that a code is a known ISO 639-1 or ISO 639-3 language code
pub fn validate_language_code(code: &str) -> Result<()> {
    let normalized = code.trim().to_lowercase();

    match normalized.len() {
        2 if Language::from_639_1(&normalized).is_some() => Ok(()),
        3 if Language::from_639_3(&normalized).is_some() => Ok(()),
        _ => Err(anyhow!("Invalid language code: {}", code)),
    }
}

/// Normalize a language code to ISO 639-1 (2-letter) where one exists
///
/// Falls back to the 3-letter form for languages without a 639-1 code.
pub fn normalize_to_part1(code: &str) -> Result<String> {
    let normalized = code.trim().to_lowercase();

    let language = match normalized.len() {
        2 => Language::from_639_1(&normalized),
        3 => Language::from_639_3(&normalized),
        _ => None,
    }
    .ok_or_else(|| anyhow!("Cannot normalize invalid language code: {}", code))?;

    Ok(language
        .to_639_1()
        .map(|c| c.to_string())
        .unwrap_or_else(|| language.to_639_3().to_string()))
}

/// English display name for a language code, used in translation prompts
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = code.trim().to_lowercase();

    let language = match normalized.len() {
        2 => Language::from_639_1(&normalized),
        3 => Language::from_639_3(&normalized),
        _ => None,
    }
    .ok_or_else(|| anyhow!("Unknown language code: {}", code))?;

    Ok(language.to_name().to_string())
}

/// Check whether two language codes refer to the same language
pub fn language_codes_match(first: &str, second: &str) -> bool {
    match (normalize_to_part1(first), normalize_to_part1(second)) {
        (Ok(a), Ok(b)) => a == b,
        _ => first.trim().eq_ignore_ascii_case(second.trim()),
    }
}
