//! Integration tests for session building and variable projection.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use vaulted::credentials::{
    AwsCredentials, AwsKey, CredentialIssuer, DirectIssuer, IssuanceError, MfaChallenge,
    MfaIssuer, TokenService,
};
use vaulted::errors::VaultedError;
use vaulted::session::{build_session, Session, DEFAULT_SESSION_DURATION};
use vaulted::vault::Vault;

/// Issuer that records every request and optionally fails.
#[derive(Default)]
struct RecordingIssuer {
    requests: RefCell<Vec<(String, Duration)>>,
    fail_for: Option<String>,
}

impl CredentialIssuer for RecordingIssuer {
    fn issue(&self, key: &AwsKey, duration: Duration) -> Result<AwsCredentials, IssuanceError> {
        self.requests
            .borrow_mut()
            .push((key.credentials.id.clone(), duration));
        if self.fail_for.as_deref() == Some(key.credentials.id.as_str()) {
            return Err(IssuanceError::InvalidMfaToken);
        }
        Ok(AwsCredentials::temporary(
            format!("{}-session", key.credentials.id),
            "session-secret",
            "session-token",
        ))
    }
}

/// Token service answering every request with the same credentials.
struct StaticTokenService;

impl TokenService for StaticTokenService {
    fn session_token(
        &self,
        _credentials: &AwsCredentials,
        mfa: Option<MfaChallenge<'_>>,
        _duration: Duration,
    ) -> Result<AwsCredentials, IssuanceError> {
        match mfa {
            Some(challenge) if challenge.token != "123456" => Err(IssuanceError::InvalidMfaToken),
            _ => Ok(AwsCredentials::temporary("ASIA", "tmp-secret", "tmp-token")),
        }
    }

    fn assume_role(
        &self,
        _credentials: &AwsCredentials,
        role: &str,
        _mfa: Option<MfaChallenge<'_>>,
        _duration: Duration,
    ) -> Result<AwsCredentials, IssuanceError> {
        Ok(AwsCredentials::temporary(role, "role-secret", "role-token"))
    }
}

fn key(id: &str) -> AwsKey {
    AwsKey::new(AwsCredentials::permanent(id, "sekrit"))
}

fn expected_expiration(session: &Session) -> String {
    session.expiration.to_rfc3339_opts(SecondsFormat::Secs, true)
}

// ---------------------------------------------------------------------------
// Variables
// ---------------------------------------------------------------------------

fn vault_session() -> Session {
    let mut session = Session::new("vault", Utc::now());
    session.vars.insert("TEST".into(), "TESTING".into());
    session.vars.insert("ANOTHER_TEST".into(), "TEST TEST".into());
    session
}

#[test]
fn variables_without_credentials() {
    let session = vault_session();
    let vars = session.variables();

    let expected: BTreeMap<String, String> = [
        ("ANOTHER_TEST", "TEST TEST".to_string()),
        ("TEST", "TESTING".to_string()),
        ("VAULTED_ENV", "vault".to_string()),
        ("VAULTED_ENV_EXPIRATION", expected_expiration(&session)),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();

    assert_eq!(vars.set, expected);
    assert!(vars.unset.is_empty());
}

#[test]
fn variables_with_permanent_credentials() {
    let mut session = vault_session();
    session.aws_creds = Some(AwsCredentials::permanent("an-id", "the-super-sekrit"));
    let vars = session.variables();

    let expected: BTreeMap<String, String> = [
        ("ANOTHER_TEST", "TEST TEST".to_string()),
        ("AWS_ACCESS_KEY_ID", "an-id".to_string()),
        ("AWS_SECRET_ACCESS_KEY", "the-super-sekrit".to_string()),
        ("TEST", "TESTING".to_string()),
        ("VAULTED_ENV", "vault".to_string()),
        ("VAULTED_ENV_EXPIRATION", expected_expiration(&session)),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();
    let expected_unset: BTreeSet<String> = ["AWS_SECURITY_TOKEN", "AWS_SESSION_TOKEN"]
        .into_iter()
        .map(String::from)
        .collect();

    assert_eq!(vars.set, expected);
    assert_eq!(vars.unset, expected_unset);
}

#[test]
fn variables_with_temporary_credentials() {
    let mut session = vault_session();
    session.aws_creds = Some(AwsCredentials::temporary(
        "an-id",
        "the-super-sekrit",
        "my-affections",
    ));
    let vars = session.variables();

    let expected: BTreeMap<String, String> = [
        ("ANOTHER_TEST", "TEST TEST".to_string()),
        ("AWS_ACCESS_KEY_ID", "an-id".to_string()),
        ("AWS_SECRET_ACCESS_KEY", "the-super-sekrit".to_string()),
        ("AWS_SECURITY_TOKEN", "my-affections".to_string()),
        ("AWS_SESSION_TOKEN", "my-affections".to_string()),
        ("TEST", "TESTING".to_string()),
        ("VAULTED_ENV", "vault".to_string()),
        ("VAULTED_ENV_EXPIRATION", expected_expiration(&session)),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();

    assert_eq!(vars.set, expected);
    assert!(vars.unset.is_empty());
}

// ---------------------------------------------------------------------------
// Building
// ---------------------------------------------------------------------------

#[test]
fn parent_child_path_nests_one_sub_session() {
    let parent = Vault::new()
        .with_var("LEVEL", "parent")
        .with_sub_vault("child", Vault::new().with_var("LEVEL", "child"));

    let session = build_session(&parent, "parent/child", &RecordingIssuer::default()).unwrap();

    assert_eq!(session.name, "parent/child");
    assert_eq!(session.sub_sessions.len(), 1);
    let child = &session.sub_sessions["child"];
    assert_eq!(child.name, "child");
    assert_eq!(child.vars["LEVEL"], "child");
}

#[test]
fn unknown_second_segment_yields_no_session() {
    let parent = Vault::new()
        .with_aws_key(key("parent-id"))
        .with_sub_vault("child", Vault::new());
    let issuer = RecordingIssuer::default();

    let result = build_session(&parent, "parent/missing", &issuer);

    assert!(matches!(result, Err(VaultedError::SubvaultNotFound(s)) if s == "missing"));
    assert!(issuer.requests.borrow().is_empty());
}

#[test]
fn credentials_issued_at_every_level_with_a_key() {
    let parent = Vault::new()
        .with_aws_key(key("parent-id"))
        .with_duration(Duration::from_secs(1800))
        .with_sub_vault(
            "child",
            Vault::new()
                .with_aws_key(key("child-id"))
                .with_duration(Duration::from_secs(900)),
        );
    let issuer = RecordingIssuer::default();

    let session = build_session(&parent, "parent/child", &issuer).unwrap();

    assert_eq!(
        issuer.requests.borrow().as_slice(),
        [
            ("parent-id".to_string(), Duration::from_secs(1800)),
            ("child-id".to_string(), Duration::from_secs(900)),
        ]
    );
    assert_eq!(session.aws_creds.as_ref().unwrap().id, "parent-id-session");
    assert_eq!(
        session.sub_sessions["child"].aws_creds.as_ref().unwrap().id,
        "child-id-session"
    );
}

#[test]
fn child_inherits_parent_key() {
    let parent = Vault::new()
        .with_aws_key(key("parent-id"))
        .with_sub_vault("child", Vault::new());
    let issuer = RecordingIssuer::default();

    let session = build_session(&parent, "parent/child", &issuer).unwrap();
    let child = &session.sub_sessions["child"];
    assert_eq!(child.aws_creds.as_ref().unwrap().id, "parent-id-session");
}

#[test]
fn unset_child_duration_falls_back_to_default() {
    // Parent asks for four hours, the child leaves duration unset; the
    // merged duration is zero so the child session gets the default.
    let parent = Vault::new()
        .with_aws_key(key("parent-id"))
        .with_duration(Duration::from_secs(4 * 3600))
        .with_sub_vault("child", Vault::new());
    let issuer = RecordingIssuer::default();

    build_session(&parent, "parent/child", &issuer).unwrap();

    let requests = issuer.requests.borrow();
    assert_eq!(requests[0].1, Duration::from_secs(4 * 3600));
    assert_eq!(requests[1].1, DEFAULT_SESSION_DURATION);
}

#[test]
fn nested_issuance_failure_fails_everything() {
    let parent = Vault::new()
        .with_aws_key(key("parent-id"))
        .with_sub_vault("child", Vault::new().with_aws_key(key("child-id")));
    let issuer = RecordingIssuer {
        fail_for: Some("child-id".into()),
        ..RecordingIssuer::default()
    };

    let err = build_session(&parent, "parent/child", &issuer).unwrap_err();
    assert!(matches!(
        err,
        VaultedError::CredentialIssuanceFailed(IssuanceError::InvalidMfaToken)
    ));
}

#[test]
fn building_leaves_the_tree_untouched() {
    let parent = Vault::new()
        .with_var("A", "parent")
        .with_sub_vault("child", Vault::new().with_var("A", "child"));
    let before = parent.clone();

    let mut session = build_session(&parent, "parent/child", &RecordingIssuer::default()).unwrap();
    session.vars.insert("A".into(), "changed".into());

    assert_eq!(parent, before);
}

#[test]
fn effective_session_carries_full_path_and_leaf_config() {
    let parent = Vault::new()
        .with_var("A", "parent")
        .with_var("P", "only-parent")
        .with_sub_vault("child", Vault::new().with_var("A", "child"));

    let session = build_session(&parent, "parent/child", &RecordingIssuer::default())
        .unwrap()
        .effective()
        .unwrap();
    let vars = session.variables();

    assert_eq!(vars.set["VAULTED_ENV"], "parent/child");
    assert_eq!(vars.set["A"], "child");
    assert_eq!(vars.set["P"], "only-parent");
}

// ---------------------------------------------------------------------------
// Issuer variants through the builder
// ---------------------------------------------------------------------------

#[test]
fn direct_and_mfa_issuers_are_interchangeable() {
    let mut mfa_key = key("an-id");
    mfa_key.mfa = Some("serial".into());
    let vault = Vault::new().with_aws_key(mfa_key);

    let direct = DirectIssuer::new(StaticTokenService);
    assert!(matches!(
        build_session(&vault, "vault", &direct),
        Err(VaultedError::CredentialIssuanceFailed(IssuanceError::MfaRequired))
    ));

    let good = MfaIssuer::new(StaticTokenService, "123456");
    let session = build_session(&vault, "vault", &good).unwrap();
    assert_eq!(session.aws_creds.as_ref().unwrap().token.as_deref(), Some("tmp-token"));

    let bad = MfaIssuer::new(StaticTokenService, "000000");
    assert!(matches!(
        build_session(&vault, "vault", &bad),
        Err(VaultedError::CredentialIssuanceFailed(IssuanceError::InvalidMfaToken))
    ));
}

#[test]
fn role_is_recorded_on_the_session() {
    let mut role_key = key("an-id");
    role_key.role = Some("admin".into());
    let vault = Vault::new().with_aws_key(role_key);

    let session = build_session(&vault, "vault", &DirectIssuer::new(StaticTokenService)).unwrap();
    assert_eq!(session.role.as_deref(), Some("admin"));
    assert_eq!(session.aws_creds.as_ref().unwrap().id, "admin");
}

#[test]
fn session_json_round_trips() {
    let parent = Vault::new()
        .with_aws_key(key("parent-id"))
        .with_sub_vault("child", Vault::new().with_var("A", "1"));
    let session = build_session(&parent, "parent/child", &RecordingIssuer::default()).unwrap();

    let json = serde_json::to_string(&session).unwrap();
    let parsed: Session = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, session);
}
