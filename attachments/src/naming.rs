use regex::Regex;
use std::sync::OnceLock;

fn whitespace() -> &'static Regex {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("static regex"))
}

/// Replace every run of whitespace with a single underscore.
pub fn underscore_whitespace(s: &str) -> String {
    whitespace().replace_all(s, "_").into_owned()
}

/// Text after the last `.` of a file name, or the whole name when it has no dot.
pub fn original_extension(file_name: &str) -> &str {
    file_name.rsplit('.').next().unwrap_or(file_name)
}

/// Object name for a section screenshot:
/// `<test name>_<section>_<unix millis>.<original extension>`.
pub fn storage_filename(
    test_name: &str,
    section_title: &str,
    timestamp_millis: i64,
    original_file_name: &str,
) -> String {
    format!(
        "{}_{}_{}.{}",
        underscore_whitespace(test_name),
        underscore_whitespace(section_title),
        timestamp_millis,
        original_extension(original_file_name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_underscore_whitespace() {
        assert_eq!(
            underscore_whitespace("Homepage Responsiveness  Test"),
            "Homepage_Responsiveness_Test"
        );
        assert_eq!(underscore_whitespace(" padded\t"), "_padded_");
        assert_eq!(underscore_whitespace("none"), "none");
    }

    #[test]
    fn test_original_extension() {
        assert_eq!(original_extension("shot.final.PNG"), "PNG");
        assert_eq!(original_extension("screenshot"), "screenshot");
        assert_eq!(original_extension("trailing."), "");
    }

    #[test]
    fn test_storage_filename() {
        assert_eq!(
            storage_filename("Smoke test", "Tambah Catatan (flow)", 1_700_000_000_000, "a.jpg"),
            "Smoke_test_Tambah_Catatan_(flow)_1700000000000.jpg"
        );
        assert_eq!(
            storage_filename("Smoke", "Logout/Login scenario", 5, "capture.png"),
            "Smoke_Logout/Login_scenario_5.png"
        );
    }
}
