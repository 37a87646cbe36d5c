//! Artifact naming: `<prefix>_v<unix-millis>.<ext>`.
//!
//! The embedded timestamp is what orders artifacts. Cleanup keeps the newest
//! ones and deletes the rest.

use regex::Regex;

/// Naming convention for downloaded artifacts.
#[derive(Debug, Clone)]
pub struct ArtifactNaming {
    prefix: String,
    ext: String,
    pattern: Regex,
}

impl ArtifactNaming {
    /// Build the naming rule for `prefix` and `ext` (without the leading dot).
    pub fn new(prefix: &str, ext: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(
            r"^{}_v\d+\.{}$",
            regex::escape(prefix),
            regex::escape(ext)
        ))?;
        Ok(Self {
            prefix: prefix.to_string(),
            ext: ext.to_string(),
            pattern,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn ext(&self) -> &str {
        &self.ext
    }

    /// File name for an artifact created at `timestamp_ms`.
    pub fn file_name(&self, timestamp_ms: i64) -> String {
        format!("{}_v{}.{}", self.prefix, timestamp_ms, self.ext)
    }

    /// Whether `name` follows the naming convention.
    pub fn matches(&self, name: &str) -> bool {
        self.pattern.is_match(name)
    }

    /// Numeric sort key of an artifact name.
    ///
    /// Every non-digit character of the whole name is dropped before parsing,
    /// so digits inside the prefix or extension become part of the key.
    /// Names whose digits do not fit yield `0`.
    pub fn timestamp_of(name: &str) -> u128 {
        let digits: String = name.chars().filter(char::is_ascii_digit).collect();
        digits.parse().unwrap_or(0)
    }

    /// Names that should be deleted so that only the `keep` newest artifacts
    /// remain. Entries not matching the convention are never selected.
    pub fn select_stale<'a>(&self, names: &'a [String], keep: usize) -> Vec<&'a str> {
        let mut artifacts: Vec<&'a str> = names
            .iter()
            .map(String::as_str)
            .filter(|name| self.matches(name))
            .collect();
        if artifacts.len() <= keep {
            return Vec::new();
        }

        artifacts.sort_by_key(|name| std::cmp::Reverse(Self::timestamp_of(name)));
        artifacts.split_off(keep)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn naming() -> ArtifactNaming {
        ArtifactNaming::new("MyApp", "apk").unwrap()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn file_name_embeds_timestamp() {
        assert_eq!(naming().file_name(1700000000123), "MyApp_v1700000000123.apk");
    }

    #[rstest]
    #[case::valid("MyApp_v1700000000000.apk", true)]
    #[case::wrong_ext("MyApp_v1700000000000.ipa", false)]
    #[case::wrong_prefix("Other_v1700000000000.apk", false)]
    #[case::no_digits("MyApp_v.apk", false)]
    #[case::letters_in_stamp("MyApp_v17a.apk", false)]
    #[case::trailing("MyApp_v1700000000000.apk.part", false)]
    #[case::leading("old-MyApp_v1700000000000.apk", false)]
    fn matches_naming_convention(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(naming().matches(name), expected);
    }

    #[test]
    fn prefix_is_matched_literally() {
        let naming = ArtifactNaming::new("my.app+", "apk").unwrap();
        assert!(naming.matches("my.app+_v12.apk"));
        assert!(!naming.matches("myXapp+_v12.apk"));
    }

    #[test]
    fn timestamp_strips_every_non_digit() {
        assert_eq!(ArtifactNaming::timestamp_of("MyApp_v42.apk"), 42);
        // digits in the prefix are kept too
        assert_eq!(ArtifactNaming::timestamp_of("App2_v42.apk"), 242);
        assert_eq!(ArtifactNaming::timestamp_of("no-digits"), 0);
    }

    #[test]
    fn keeps_two_newest_regardless_of_listing_order() {
        let listing = names(&[
            "MyApp_v300.apk",
            "MyApp_v1000.apk",
            "MyApp_v20.apk",
            "MyApp_v4000.apk",
            "MyApp_v999.apk",
        ]);
        let mut stale = naming().select_stale(&listing, 2);
        stale.sort();
        assert_eq!(stale, vec!["MyApp_v20.apk", "MyApp_v300.apk", "MyApp_v999.apk"]);
    }

    #[test]
    fn nothing_stale_at_or_below_keep() {
        let listing = names(&["MyApp_v1.apk", "MyApp_v2.apk", "notes.txt", "x.apk"]);
        assert!(naming().select_stale(&listing, 2).is_empty());
        assert!(naming().select_stale(&[], 2).is_empty());
    }

    #[test]
    fn foreign_files_are_never_selected() {
        let listing = names(&[
            "MyApp_v1.apk",
            "MyApp_v2.apk",
            "MyApp_v3.apk",
            "Other_v0.apk",
            "settings.json",
        ]);
        assert_eq!(naming().select_stale(&listing, 2), vec!["MyApp_v1.apk"]);
    }
}
