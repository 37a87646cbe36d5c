//! Version model: remote manifest, version info and comparison.
//!
//! Versions are dot-separated integers with no bound on component count or
//! magnitude, so components are compared as normalized digit strings rather
//! than parsed into a fixed-width integer.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// The remote manifest document (`{ "version": "1.2.3" }`).
///
/// Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteManifest {
    pub version: String,
}

/// The latest available version and where to download it from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    pub download_url: String,
}

/// A single parsed version component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Component<'a> {
    /// Leading digits with leading zeros stripped ("0" for zero).
    Number(&'a str),
    /// No leading digits. Never orders against anything.
    Invalid,
}

impl<'a> Component<'a> {
    const ZERO: Component<'static> = Component::Number("0");

    fn parse(raw: &'a str) -> Self {
        let raw = raw.trim();
        let end = raw
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(raw.len());
        if end == 0 {
            return Component::Invalid;
        }
        let digits = raw[..end].trim_start_matches('0');
        if digits.is_empty() {
            Component::ZERO
        } else {
            Component::Number(digits)
        }
    }

    fn compare(self, other: Component<'_>) -> Option<Ordering> {
        match (self, other) {
            (Component::Number(a), Component::Number(b)) => {
                Some(a.len().cmp(&b.len()).then_with(|| a.cmp(b)))
            }
            _ => None,
        }
    }
}

/// Compare two version strings component by component.
///
/// Missing trailing components count as `0`, so `"1.2"` equals `"1.2.0"`.
/// A component without leading digits compares as neither greater nor less
/// and the comparison moves on to the next component.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let left: Vec<Component<'_>> = a.split('.').map(Component::parse).collect();
    let right: Vec<Component<'_>> = b.split('.').map(Component::parse).collect();

    for i in 0..left.len().max(right.len()) {
        let l = left.get(i).copied().unwrap_or(Component::ZERO);
        let r = right.get(i).copied().unwrap_or(Component::ZERO);
        match l.compare(r) {
            Some(Ordering::Equal) | None => continue,
            Some(ordering) => return ordering,
        }
    }
    Ordering::Equal
}

/// Whether `remote` is strictly newer than `current`.
pub fn is_update_available(remote: &str, current: &str) -> bool {
    compare_versions(remote, current) == Ordering::Greater
}
