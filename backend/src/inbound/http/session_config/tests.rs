//! Unit tests for session configuration loading.

use std::collections::HashMap;

use rstest::{fixture, rstest};

use super::test_utils::{TempKeyFile, mock_env};
use super::*;

#[fixture]
fn key_file() -> TempKeyFile {
    TempKeyFile::new(SESSION_KEY_MIN_LEN).expect("key file")
}

fn release_vars(key_path: String) -> HashMap<&'static str, String> {
    HashMap::from([
        (KEY_FILE_ENV, key_path),
        (COOKIE_SECURE_ENV, "1".to_owned()),
        (SAMESITE_ENV, "Strict".to_owned()),
        (ALLOW_EPHEMERAL_ENV, "0".to_owned()),
    ])
}

fn load_err(vars: HashMap<&'static str, String>, mode: BuildMode) -> SessionConfigError {
    match session_settings_from_env(&mock_env(vars), mode) {
        Ok(_) => panic!("expected session configuration to be rejected"),
        Err(err) => err,
    }
}

#[rstest]
#[case(COOKIE_SECURE_ENV)]
#[case(SAMESITE_ENV)]
#[case(ALLOW_EPHEMERAL_ENV)]
fn release_requires_every_toggle(key_file: TempKeyFile, #[case] missing: &'static str) {
    let mut vars = release_vars(key_file.path_str());
    vars.remove(missing);

    let err = load_err(vars, BuildMode::Release);
    assert!(matches!(err, SessionConfigError::MissingEnv { name } if name == missing));
}

#[rstest]
#[case("maybe")]
#[case("")]
fn release_rejects_malformed_cookie_secure(key_file: TempKeyFile, #[case] value: &str) {
    let mut vars = release_vars(key_file.path_str());
    vars.insert(COOKIE_SECURE_ENV, value.to_owned());

    let err = load_err(vars, BuildMode::Release);
    assert!(matches!(
        err,
        SessionConfigError::InvalidEnv {
            name: COOKIE_SECURE_ENV,
            ..
        }
    ));
}

#[rstest]
fn release_rejects_ephemeral_keys(key_file: TempKeyFile) {
    let mut vars = release_vars(key_file.path_str());
    vars.insert(ALLOW_EPHEMERAL_ENV, "yes".to_owned());

    let err = load_err(vars, BuildMode::Release);
    assert!(matches!(err, SessionConfigError::EphemeralNotAllowed));
}

#[rstest]
fn release_rejects_missing_key_file() {
    let vars = release_vars("/nonexistent/clinic-session-key".to_owned());

    let err = load_err(vars, BuildMode::Release);
    assert!(matches!(err, SessionConfigError::KeyRead { .. }));
}

#[rstest]
fn release_rejects_short_key() {
    let short = TempKeyFile::new(16).expect("key file");

    let err = load_err(release_vars(short.path_str()), BuildMode::Release);
    assert!(matches!(
        err,
        SessionConfigError::KeyTooShort { length: 16, .. }
    ));
}

#[rstest]
fn release_rejects_same_site_none_without_secure(key_file: TempKeyFile) {
    let mut vars = release_vars(key_file.path_str());
    vars.insert(COOKIE_SECURE_ENV, "0".to_owned());
    vars.insert(SAMESITE_ENV, "None".to_owned());

    let err = load_err(vars, BuildMode::Release);
    assert!(matches!(err, SessionConfigError::InsecureSameSiteNone));
}

#[rstest]
#[case("0")]
#[case("1000")]
#[case("eight")]
fn release_rejects_out_of_range_ttl(key_file: TempKeyFile, #[case] hours: &str) {
    let mut vars = release_vars(key_file.path_str());
    vars.insert(TTL_HOURS_ENV, hours.to_owned());

    let err = load_err(vars, BuildMode::Release);
    assert!(matches!(
        err,
        SessionConfigError::InvalidEnv {
            name: TTL_HOURS_ENV,
            ..
        }
    ));
}

#[rstest]
fn release_accepts_complete_configuration(key_file: TempKeyFile) {
    let mut vars = release_vars(key_file.path_str());
    vars.insert(TTL_HOURS_ENV, "12".to_owned());

    let settings = session_settings_from_env(&mock_env(vars), BuildMode::Release)
        .expect("valid settings");
    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Strict);
    assert_eq!(settings.ttl, Duration::from_secs(12 * 3600));
}

#[rstest]
fn debug_defaults_to_secure_lax_and_generated_key() {
    let vars = HashMap::from([(KEY_FILE_ENV, "/nonexistent/clinic-session-key".to_owned())]);

    let settings =
        session_settings_from_env(&mock_env(vars), BuildMode::Debug).expect("debug defaults");
    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Lax);
    assert_eq!(settings.ttl, Duration::from_secs(DEFAULT_TTL_HOURS * 3600));
}

#[rstest]
fn debug_tolerates_malformed_values(key_file: TempKeyFile) {
    let mut vars = release_vars(key_file.path_str());
    vars.insert(SAMESITE_ENV, "sideways".to_owned());
    vars.insert(TTL_HOURS_ENV, "-3".to_owned());

    let settings =
        session_settings_from_env(&mock_env(vars), BuildMode::Debug).expect("debug fallback");
    assert_eq!(settings.same_site, SameSite::Lax);
    assert_eq!(settings.ttl, Duration::from_secs(DEFAULT_TTL_HOURS * 3600));
}

#[rstest]
#[case(" TRUE ", Some(true))]
#[case("n", Some(false))]
#[case("2", None)]
fn bool_toggles_accept_common_spellings(#[case] raw: &str, #[case] expected: Option<bool>) {
    assert_eq!(parsing::parse_bool(raw), expected);
}
