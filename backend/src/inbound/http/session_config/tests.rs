//! Unit tests for session configuration parsing.

use std::collections::HashMap;

use super::*;
use mockable::MockEnv;
use rstest::{fixture, rstest};
use uuid::Uuid;

struct TempKeyFile {
    path: PathBuf,
}

impl TempKeyFile {
    fn with_len(len: usize) -> Self {
        let path = std::env::temp_dir().join(format!("eventora-session-key-{}", Uuid::new_v4()));
        std::fs::write(&path, vec![b'k'; len]).expect("write temporary key");
        Self { path }
    }

    fn path(&self) -> String {
        self.path.display().to_string()
    }
}

impl Drop for TempKeyFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

#[fixture]
fn key_file() -> TempKeyFile {
    TempKeyFile::with_len(SESSION_KEY_MIN_LEN)
}

fn env_from(vars: &[(&str, &str)]) -> MockEnv {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
        .collect();
    let mut env = MockEnv::new();
    env.expect_string()
        .times(0..)
        .returning(move |key| vars.get(key).cloned());
    env
}

/// Release toggles with one variable overridden or removed.
fn release_env(key_path: &str, name: &str, value: Option<&str>) -> MockEnv {
    let mut vars = vec![
        (KEY_FILE_ENV, key_path),
        (COOKIE_SECURE_ENV, "1"),
        (SAMESITE_ENV, "Strict"),
        (ALLOW_EPHEMERAL_ENV, "0"),
    ];
    vars.retain(|(key, _)| *key != name);
    if let Some(value) = value {
        vars.push((name, value));
    }
    env_from(&vars)
}

fn release_error(env: &MockEnv) -> SessionConfigError {
    match session_settings_from_env(env, BuildMode::Release) {
        Ok(_) => panic!("release settings unexpectedly accepted"),
        Err(err) => err,
    }
}

#[rstest]
#[case(COOKIE_SECURE_ENV)]
#[case(SAMESITE_ENV)]
#[case(ALLOW_EPHEMERAL_ENV)]
fn release_requires_every_toggle(key_file: TempKeyFile, #[case] missing: &'static str) {
    let env = release_env(&key_file.path(), missing, None);
    assert!(matches!(
        release_error(&env),
        SessionConfigError::MissingEnv { name } if name == missing
    ));
}

#[rstest]
#[case(COOKIE_SECURE_ENV, "maybe")]
#[case(COOKIE_SECURE_ENV, "")]
#[case(SAMESITE_ENV, "sometimes")]
#[case(ALLOW_EPHEMERAL_ENV, "2")]
fn release_rejects_invalid_values(
    key_file: TempKeyFile,
    #[case] name: &'static str,
    #[case] value: &str,
) {
    let env = release_env(&key_file.path(), name, Some(value));
    assert!(matches!(
        release_error(&env),
        SessionConfigError::InvalidEnv { name: found, .. } if found == name
    ));
}

#[rstest]
fn release_rejects_ephemeral_keys(key_file: TempKeyFile) {
    let env = release_env(&key_file.path(), ALLOW_EPHEMERAL_ENV, Some("yes"));
    assert!(matches!(
        release_error(&env),
        SessionConfigError::EphemeralNotAllowed
    ));
}

#[rstest]
fn release_rejects_unreadable_and_short_keys() {
    let missing = std::env::temp_dir().join(format!("absent-{}", Uuid::new_v4()));
    let missing = missing.display().to_string();
    let env = release_env(&missing, KEY_FILE_ENV, Some(&missing));
    assert!(matches!(release_error(&env), SessionConfigError::KeyRead { .. }));

    let short = TempKeyFile::with_len(32);
    let env = release_env(&short.path(), KEY_FILE_ENV, Some(&short.path()));
    assert!(matches!(
        release_error(&env),
        SessionConfigError::KeyTooShort { length: 32, .. }
    ));
}

#[rstest]
fn release_rejects_insecure_same_site_none(key_file: TempKeyFile) {
    let env = env_from(&[
        (KEY_FILE_ENV, &key_file.path()),
        (COOKIE_SECURE_ENV, "0"),
        (SAMESITE_ENV, "None"),
        (ALLOW_EPHEMERAL_ENV, "0"),
    ]);
    assert!(matches!(
        release_error(&env),
        SessionConfigError::InsecureSameSiteNone
    ));
}

#[rstest]
fn release_accepts_complete_settings(key_file: TempKeyFile) {
    let env = release_env(&key_file.path(), SAMESITE_ENV, Some("lax"));
    let settings = session_settings_from_env(&env, BuildMode::Release).expect("valid settings");
    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Lax);
}

#[rstest]
fn debug_defaults_to_secure_lax_and_a_temporary_key() {
    let missing = std::env::temp_dir().join(format!("absent-{}", Uuid::new_v4()));
    let env = env_from(&[(KEY_FILE_ENV, &missing.display().to_string())]);
    let settings = session_settings_from_env(&env, BuildMode::Debug).expect("debug defaults");
    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Lax);
}

#[rstest]
#[case("unexpected", SameSite::Lax)]
#[case("STRICT", SameSite::Strict)]
fn debug_same_site_parsing(key_file: TempKeyFile, #[case] raw: &str, #[case] expected: SameSite) {
    let env = env_from(&[(KEY_FILE_ENV, &key_file.path()), (SAMESITE_ENV, raw)]);
    let settings = session_settings_from_env(&env, BuildMode::Debug).expect("debug settings");
    assert_eq!(settings.same_site, expected);
}

#[rstest]
#[case("1", Some(true))]
#[case(" Yes ", Some(true))]
#[case("n", Some(false))]
#[case("off", None)]
fn booleans_accept_common_spellings(#[case] raw: &str, #[case] expected: Option<bool>) {
    assert_eq!(parse_bool(raw), expected);
}
