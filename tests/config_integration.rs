//! Integration tests for settings loading and how settings change search
//! behavior.

use lucent::prelude::*;
use lucent::sql::{Filter, SqlBackend};

/// Test that an empty document yields the defaults
#[test]
fn test_settings_empty() {
    let settings = Settings::from_toml_str("").expect("Failed to parse settings");
    assert_eq!(settings, Settings::default());
    assert!(!settings.raise_on_error);
    assert_eq!(settings.cache_time, 6000);
}

/// Test a full settings document
#[test]
fn test_settings_full() {
    let settings = Settings::from_toml_str(
        r#"
        SAVED_SEARCHES_ENABLE = true
        SAVED_SEARCHES_KEY = "saved"
        CACHE_SEARCH_VALUES = false
        CACHE_TIME = 60
        CACHE_MAX_VALUES_COUNT_FOR_ONE_PREFIX = 25
        CACHE_VALUES_MIN_LENGTH = 1
        ALLOW_EMPTY_SUGGESTIONS = true
        SHOW_SUGGESTIONS = false
        ESCAPE_QUOTES_IN_SUGGESTIONS = false
        RAISE_ON_ERROR = true
        EMPTY_VALUES = ["", "-"]
        "#,
    )
    .expect("Failed to parse settings");

    assert_eq!(settings.saved_searches_field(), Some("saved"));
    assert!(!settings.cache_search_values);
    assert_eq!(settings.cache_ttl().as_secs(), 60);
    assert_eq!(settings.cache_max_values_count_for_one_prefix, 25);
    assert!(settings.is_empty_value("-"));
    assert!(settings.raise_on_error);
}

/// Test that unknown keys are rejected
#[test]
fn test_settings_unknown_key() {
    let err = Settings::from_toml_str("CACHE_TIMEOUT = 5").unwrap_err();
    assert!(matches!(err, SearchError::Config(_)));
}

/// Test that enabling saved searches requires a key
#[test]
fn test_settings_saved_searches_need_key() {
    assert!(Settings::from_toml_str("SAVED_SEARCHES_ENABLE = true").is_err());
}

/// Test that strict settings loaded from TOML surface filter errors
#[test]
fn test_settings_drive_error_policy() {
    let strict = Settings::from_toml_str("RAISE_ON_ERROR = true").unwrap();
    let set = lucent::search_set("Article", SqlBackend::postgres())
        .schema(Schema::new().field("views", SemanticType::Integer))
        .settings(strict)
        .build()
        .unwrap();
    assert!(set.filter("views > many").is_err());
    assert_eq!(
        set.filter("views > 5").unwrap(),
        Filter::Gt("views".into(), FilterValue::Int(5))
    );
}

/// Test that hiding suggestions globally clears every suggestion flag
#[test]
fn test_settings_hide_suggestions() {
    let settings = Settings::from_toml_str("SHOW_SUGGESTIONS = false").unwrap();
    let set = lucent::search_set("Article", SqlBackend::postgres())
        .field("author", FieldHandler::char())
        .schema(Schema::new().field("views", SemanticType::Integer))
        .settings(settings)
        .build()
        .unwrap();
    let flags = set.fields_with_suggestions().unwrap();
    assert_eq!(flags.len(), 2);
    assert!(flags.values().all(|shown| !shown));
}
