/*!
 * Tests for ISO language code utilities
 */

use subvox::language_utils::{
    get_language_name, language_codes_match, normalize_to_part1, validate_language_code,
};

#[test]
fn test_validate_language_code_withTwoLetterCode_shouldPass() {
    assert!(validate_language_code("en").is_ok());
    assert!(validate_language_code("fr").is_ok());
    assert!(validate_language_code("ZH").is_ok());
}

#[test]
fn test_validate_language_code_withThreeLetterCode_shouldPass() {
    assert!(validate_language_code("eng").is_ok());
    assert!(validate_language_code("deu").is_ok());
}

#[test]
fn test_validate_language_code_withUnknownCode_shouldFail() {
    assert!(validate_language_code("xx").is_err());
    assert!(validate_language_code("klingon").is_err());
    assert!(validate_language_code("").is_err());
}

#[test]
fn test_normalize_to_part1_withThreeLetterCode_shouldShorten() {
    assert_eq!(normalize_to_part1("eng").unwrap(), "en");
    assert_eq!(normalize_to_part1("fra").unwrap(), "fr");
}

#[test]
fn test_normalize_to_part1_withTwoLetterCode_shouldKeep() {
    assert_eq!(normalize_to_part1("en").unwrap(), "en");
}

#[test]
fn test_get_language_name_withKnownCodes_shouldReturnEnglishName() {
    assert_eq!(get_language_name("en").unwrap(), "English");
    assert_eq!(get_language_name("fr").unwrap(), "French");
}

#[test]
fn test_get_language_name_withUnknownCode_shouldFail() {
    assert!(get_language_name("zz").is_err());
}

#[test]
fn test_language_codes_match_withEquivalentCodes_shouldMatch() {
    assert!(language_codes_match("en", "eng"));
    assert!(language_codes_match("EN", "en"));
}

#[test]
fn test_language_codes_match_withDifferentLanguages_shouldNotMatch() {
    assert!(!language_codes_match("en", "fr"));
}
