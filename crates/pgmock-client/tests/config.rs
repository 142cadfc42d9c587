//! Connection string parsing edge cases.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use pgmock_client::config::parse_duration;
use pgmock_client::{Error, PoolConfig, SslMode};
use proptest::prelude::*;

// ============================================================================
// Keyword/Value Form
// ============================================================================

#[test]
fn test_whitespace_only_is_default() {
    let config = PoolConfig::from_connection_string("   \t\n  ").unwrap();
    assert_eq!(config, PoolConfig::default());
}

#[test]
fn test_empty_quoted_value() {
    let config = PoolConfig::from_connection_string("host=h password=''").unwrap();
    assert_eq!(config.password.as_deref(), Some(""));
}

#[test]
fn test_backslash_escape_in_bare_value() {
    let config = PoolConfig::from_connection_string(r"password=a\ b").unwrap();
    assert_eq!(config.password.as_deref(), Some("a b"));
}

#[test]
fn test_key_without_equals() {
    let err = PoolConfig::from_connection_string("host").unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn test_unterminated_quote() {
    let err = PoolConfig::from_connection_string("password='open").unwrap_err();
    assert!(err.to_string().contains("unterminated"));
}

#[test]
fn test_unknown_keys_become_runtime_params() {
    let config =
        PoolConfig::from_connection_string("host=h search_path=app,public timezone=UTC").unwrap();
    assert_eq!(
        config.runtime_params.get("search_path").map(String::as_str),
        Some("app,public")
    );
    assert_eq!(
        config.runtime_params.get("timezone").map(String::as_str),
        Some("UTC")
    );
}

#[test]
fn test_connect_timeout_zero_waits_forever() {
    let config = PoolConfig::from_connection_string("connect_timeout=0").unwrap();
    assert_eq!(config.connect_timeout, None);
    let config = PoolConfig::from_connection_string("connect_timeout=5").unwrap();
    assert_eq!(config.connect_timeout, Some(Duration::from_secs(5)));
}

// ============================================================================
// URL Form
// ============================================================================

#[test]
fn test_url_percent_encoded_credentials() {
    let config =
        PoolConfig::from_connection_string("postgresql://svc:p%40ss%2Fw@db:6432/app").unwrap();
    assert_eq!(config.user.as_deref(), Some("svc"));
    assert_eq!(config.password.as_deref(), Some("p@ss/w"));
    assert_eq!(config.port, 6432);
}

#[test]
fn test_url_ipv6_host() {
    let config = PoolConfig::from_connection_string("postgres://[::1]:7000/db").unwrap();
    assert_eq!(config.host, "::1");
    assert_eq!(config.port, 7000);
}

#[test]
fn test_url_query_parameters() {
    let config = PoolConfig::from_connection_string(
        "postgres://h/db?sslmode=verify-full&application_name=billing&pool_min_conns=2",
    )
    .unwrap();
    assert_eq!(config.ssl_mode, SslMode::VerifyFull);
    assert_eq!(config.application_name.as_deref(), Some("billing"));
    assert_eq!(config.min_conns, 2);
}

#[test]
fn test_url_bad_percent_encoding() {
    assert!(PoolConfig::from_connection_string("postgres://u:%zz@h/db").is_err());
}

#[test]
fn test_url_query_without_value() {
    assert!(PoolConfig::from_connection_string("postgres://h/db?sslmode").is_err());
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_invalid_sslmode() {
    let err = PoolConfig::from_connection_string("sslmode=sometimes").unwrap_err();
    assert_eq!(err.to_string(), "configuration error: invalid sslmode: sometimes");
}

#[test]
fn test_zero_max_conns() {
    assert!(PoolConfig::from_connection_string("pool_max_conns=0").is_err());
}

#[test]
fn test_min_above_max() {
    let err =
        PoolConfig::from_connection_string("pool_max_conns=2 pool_min_conns=3").unwrap_err();
    assert!(err.to_string().contains("exceeds"));
}

#[test]
fn test_invalid_port() {
    assert!(PoolConfig::from_connection_string("port=70000").is_err());
    assert!(PoolConfig::from_connection_string("port=").is_err());
}

#[test]
fn test_durations() {
    assert_eq!(parse_duration("1h30m").unwrap(), Duration::from_secs(5400));
    assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
    assert_eq!(parse_duration("15µs").unwrap(), Duration::from_micros(15));
    assert_eq!(parse_duration("90").unwrap(), Duration::from_secs(90));
    assert!(parse_duration("1h30").is_err());
    assert!(parse_duration("ten minutes").is_err());
    assert!(parse_duration("").is_err());
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #[test]
    fn prop_keyword_and_url_forms_agree(
        host in "[a-z][a-z0-9.-]{0,20}",
        port in 1u16..,
        db in "[a-z_]{1,16}",
        max_conns in 1u32..64,
    ) {
        let kv = PoolConfig::from_connection_string(&format!(
            "host={host} port={port} dbname={db} pool_max_conns={max_conns}"
        ))
        .unwrap();
        let url = PoolConfig::from_connection_string(&format!(
            "postgres://{host}:{port}/{db}?pool_max_conns={max_conns}"
        ))
        .unwrap();
        prop_assert_eq!(kv, url);
    }

    #[test]
    fn prop_parser_never_panics(input in ".{0,64}") {
        let _ = PoolConfig::from_connection_string(&input);
    }

    #[test]
    fn prop_minutes_and_seconds(m in 0u64..10_000, s in 0u64..60) {
        prop_assert_eq!(
            parse_duration(&format!("{m}m{s}s")).unwrap(),
            Duration::from_secs(m * 60 + s)
        );
    }
}
