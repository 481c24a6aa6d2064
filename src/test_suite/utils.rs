#[macro_export]
macro_rules! skip_in_ci {
    ($test_name:expr) => {
        if std::env::var("CI").is_ok() {
            println!("Skipping {} in CI environment", $test_name);
            return;
        }
    };
    () => {
        if std::env::var("CI").is_ok() {
            println!("Skipping {} in CI environment", module_path!());
            return;
        }
    };
}

/// Parses both sides as JSON before comparing, so key order and whitespace
/// differences don't fail a test that only cares about content.
pub(crate) fn assert_json_eq(actual: &str, expected: &str) {
    let actual_value: serde_json::Value = serde_json::from_str(actual).expect("actual is valid JSON");
    let expected_value: serde_json::Value =
        serde_json::from_str(expected).expect("expected is valid JSON");
    pretty_assertions::assert_eq!(actual_value, expected_value);
}
