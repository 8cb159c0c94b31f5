use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use backoffice_core::UserId;
use backoffice_domain::SessionData;
use chrono::{Duration, TimeZone, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Value, json};

use super::{DEFAULT_SESSION_LIFETIME_SECONDS, SessionTokenCodec};

const SECRET: &str = "0123456789abcdef0123456789abcdef";

fn codec() -> SessionTokenCodec {
    match SessionTokenCodec::new(SECRET, DEFAULT_SESSION_LIFETIME_SECONDS) {
        Ok(codec) => codec,
        Err(error) => panic!("invalid test codec: {error}"),
    }
}

fn session(user_id: Option<UserId>) -> SessionData {
    match SessionData::new("xsrf-1", user_id) {
        Ok(data) => data,
        Err(error) => panic!("invalid test session: {error}"),
    }
}

fn claims_of(token: &str) -> Value {
    let claims = token
        .split('.')
        .nth(1)
        .and_then(|segment| URL_SAFE_NO_PAD.decode(segment).ok())
        .and_then(|bytes| serde_json::from_slice(&bytes).ok());
    claims.unwrap_or(Value::Null)
}

#[test]
fn issued_token_parses_back_to_the_same_session() {
    let codec = codec();
    let now = Utc::now();
    let data = session(Some(UserId::new()));

    let token = codec.issue("https://admin.example.com", &data, now);
    let Ok(token) = token else {
        panic!("token should be issued");
    };

    assert_eq!(token.split('.').count(), 3);
    assert_eq!(codec.parse(&token, now), Some(data));
}

#[test]
fn claims_carry_issuer_and_one_year_expiry() {
    let codec = codec();
    let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).single().unwrap_or_default();

    let Ok(token) = codec.issue("https://admin.example.com", &session(None), now) else {
        panic!("token should be issued");
    };
    let claims = claims_of(&token);

    assert_eq!(claims["iss"], "https://admin.example.com");
    assert_eq!(claims["iat"], now.timestamp());
    assert_eq!(claims["nbf"], now.timestamp());
    assert_eq!(claims["exp"], now.timestamp() + 31_536_000);
    assert_eq!(claims["data"]["xsrfToken"], "xsrf-1");
    assert!(claims["data"].get("userId").is_none());
    assert!(claims["jti"].as_str().is_some_and(|jti| jti.len() == 44));
}

#[test]
fn token_ids_are_unique() {
    let codec = codec();
    let now = Utc::now();
    let first = codec.issue("issuer", &session(None), now).unwrap_or_default();
    let second = codec.issue("issuer", &session(None), now).unwrap_or_default();

    assert_ne!(claims_of(&first)["jti"], claims_of(&second)["jti"]);
}

#[test]
fn tampered_claims_are_rejected() {
    let codec = codec();
    let now = Utc::now();
    let Ok(token) = codec.issue("issuer", &session(None), now) else {
        panic!("token should be issued");
    };
    let forged_claims = URL_SAFE_NO_PAD.encode(
        br#"{"iat":0,"jti":"x","iss":"issuer","nbf":0,"exp":9999999999,"data":{"xsrfToken":"evil"}}"#,
    );
    let parts: Vec<&str> = token.split('.').collect();
    let forged = format!("{}.{forged_claims}.{}", parts[0], parts[2]);

    assert_eq!(codec.parse(&forged, now), None);
}

#[test]
fn token_signed_with_another_secret_is_rejected() {
    let now = Utc::now();
    let Ok(other) = SessionTokenCodec::new("another-secret-that-is-long-enough!", 60) else {
        panic!("codec should build");
    };
    let Ok(token) = other.issue("issuer", &session(None), now) else {
        panic!("token should be issued");
    };

    assert_eq!(codec().parse(&token, now), None);
}

#[test]
fn expired_and_premature_tokens_are_rejected() {
    let Ok(short) = SessionTokenCodec::new(SECRET, 60) else {
        panic!("codec should build");
    };
    let now = Utc::now();
    let Ok(token) = short.issue("issuer", &session(None), now) else {
        panic!("token should be issued");
    };

    assert!(short.parse(&token, now + Duration::seconds(59)).is_some());
    assert_eq!(short.parse(&token, now + Duration::seconds(60)), None);
    assert_eq!(short.parse(&token, now - Duration::seconds(1)), None);
}

#[test]
fn tokens_signed_with_another_algorithm_are_rejected() {
    let now = Utc::now().timestamp();
    let claims = json!({
        "iat": now,
        "jti": "x",
        "iss": "issuer",
        "nbf": now,
        "exp": now + 60,
        "data": {"xsrfToken": "xsrf-1"},
    });
    let token = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    );
    let Ok(token) = token else {
        panic!("token should be signed");
    };

    assert_eq!(codec().parse(&token, Utc::now()), None);
}

#[test]
fn tokens_without_time_claims_are_rejected() {
    let token = jsonwebtoken::encode(
        &Header::new(Algorithm::HS512),
        &json!({"iss": "issuer", "jti": "x", "data": {"xsrfToken": "xsrf-1"}}),
        &EncodingKey::from_secret(SECRET.as_bytes()),
    );
    let Ok(token) = token else {
        panic!("token should be signed");
    };

    assert_eq!(codec().parse(&token, Utc::now()), None);
}

#[test]
fn garbage_is_rejected() {
    let codec = codec();
    let now = Utc::now();

    for token in ["", "abc", "a.b", "a.b.c", "a.b.c.d"] {
        assert_eq!(codec.parse(token, now), None, "token {token:?}");
    }
}

#[test]
fn short_secret_and_non_positive_lifetime_are_refused() {
    assert!(SessionTokenCodec::new("short", 60).is_err());
    assert!(SessionTokenCodec::new(SECRET, 0).is_err());
}
