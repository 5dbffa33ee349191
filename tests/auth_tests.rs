use jsonwebtoken::{DecodingKey, Validation, decode};
use obe_portal::{
    auth::{Claims, hash_password, issue_token, verify_password},
    config::AppConfig,
};
use uuid::Uuid;

// --- Password Digests ---

#[test]
fn test_hash_password_is_deterministic_hex() {
    let digest = hash_password("hunter22-hunter22");
    assert_eq!(digest, hash_password("hunter22-hunter22"));
    // SHA-256 hex is 64 lowercase hex chars.
    assert_eq!(digest.len(), 64);
    assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn test_verify_password_roundtrip() {
    let digest = hash_password("correct-password");
    assert!(verify_password("correct-password", &digest));
    assert!(!verify_password("wrong-password", &digest));
}

#[test]
fn test_different_passwords_different_digests() {
    assert_ne!(hash_password("password-one"), hash_password("password-two"));
}

// --- JWT Issuance ---

#[test]
fn test_issue_token_roundtrip() {
    let config = AppConfig::default();
    let user_id = Uuid::from_u128(42);

    let token = issue_token(user_id, &config).unwrap();

    let data = decode::<Claims>(
        &token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .unwrap();

    assert_eq!(data.claims.sub, user_id);
    // Expiry honors the configured window (24h by default).
    let window = data.claims.exp - data.claims.iat;
    assert_eq!(window, 24 * 3600);
}

#[test]
fn test_token_signed_with_other_secret_rejected() {
    let config = AppConfig::default();
    let token = issue_token(Uuid::from_u128(42), &config).unwrap();

    let result = decode::<Claims>(
        &token,
        &DecodingKey::from_secret(b"a-completely-different-secret"),
        &Validation::default(),
    );
    assert!(result.is_err());
}

#[test]
fn test_expired_token_rejected() {
    // A negative expiry window produces a token that is already expired.
    let config = AppConfig {
        token_expiry_hours: -1,
        ..AppConfig::default()
    };
    let token = issue_token(Uuid::from_u128(42), &config).unwrap();

    let result = decode::<Claims>(
        &token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    );
    assert!(result.is_err());
}
