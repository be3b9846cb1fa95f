//! RubyGems version parsing and comparison.
//!
//! Gem versions are dot-separated segments:
//! - Numeric segments compare as numbers
//! - Any segment containing letters marks a prerelease (`1.0.0.rc1`,
//!   `2.0.0.beta.2`), which sorts before the release with the same prefix
//! - Trailing zero segments are insignificant (`1.0 == 1.0.0`)

use std::cmp::Ordering;
use std::fmt;

/// A parsed gem version with comparable segments.
#[derive(Debug, Clone)]
pub struct GemVersion {
    pub original: String,
    segments: Vec<Segment>,
}

impl PartialEq for GemVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for GemVersion {}

#[derive(Debug, Clone, Eq, PartialEq)]
enum Segment {
    Numeric(u64),
    Text(String),
}

impl GemVersion {
    pub fn parse(version: &str) -> Self {
        Self {
            original: version.to_string(),
            segments: parse_segments(version.trim()),
        }
    }

    /// The integer before the first `.`, if it is numeric.
    pub fn major(&self) -> Option<u64> {
        major_of(&self.original)
    }

    pub fn is_prerelease(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, Segment::Text(_)))
    }
}

/// The integer before the first `.` of a version string.
pub fn major_of(version: &str) -> Option<u64> {
    version.trim().split('.').next()?.parse().ok()
}

impl fmt::Display for GemVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl Ord for GemVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let max_len = self.segments.len().max(other.segments.len());
        for i in 0..max_len {
            let ord = compare_segments(self.segments.get(i), other.segments.get(i));
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for GemVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn compare_segments(a: Option<&Segment>, b: Option<&Segment>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (Some(s), None) => compare_segment_to_empty(s),
        (None, Some(s)) => compare_segment_to_empty(s).reverse(),
        (Some(a), Some(b)) => compare_two_segments(a, b),
    }
}

fn compare_segment_to_empty(seg: &Segment) -> Ordering {
    match seg {
        Segment::Numeric(0) => Ordering::Equal,
        Segment::Numeric(_) => Ordering::Greater,
        // 1.0.rc < 1.0
        Segment::Text(_) => Ordering::Less,
    }
}

fn compare_two_segments(a: &Segment, b: &Segment) -> Ordering {
    match (a, b) {
        (Segment::Numeric(a), Segment::Numeric(b)) => a.cmp(b),
        (Segment::Numeric(_), Segment::Text(_)) => Ordering::Greater,
        (Segment::Text(_), Segment::Numeric(_)) => Ordering::Less,
        (Segment::Text(a), Segment::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
    }
}

/// Split on `.` and on digit/letter boundaries, so `1.0.rc1` becomes
/// `[1, 0, "rc", 1]` the same way RubyGems does.
fn parse_segments(version: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut current = String::new();

    let flush = |current: &mut String, segments: &mut Vec<Segment>| {
        if !current.is_empty() {
            segments.push(classify(current));
            current.clear();
        }
    };

    for ch in version.chars() {
        if ch == '.' || ch == '-' {
            flush(&mut current, &mut segments);
            continue;
        }
        let boundary = current
            .chars()
            .last()
            .is_some_and(|last| last.is_ascii_digit() != ch.is_ascii_digit());
        if boundary {
            flush(&mut current, &mut segments);
        }
        current.push(ch);
    }
    flush(&mut current, &mut segments);

    segments
}

fn classify(token: &str) -> Segment {
    match token.parse::<u64>() {
        Ok(n) => Segment::Numeric(n),
        Err(_) => Segment::Text(token.to_string()),
    }
}

/// Whether `s` starts like a version literal (`1`, `0.9.2`, `13.0.6.rc1`).
pub fn looks_like_version(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_ordering() {
        assert!(GemVersion::parse("1.0") < GemVersion::parse("2.0"));
    }

    #[test]
    fn three_part_ordering() {
        let v1 = GemVersion::parse("1.0.0");
        let v2 = GemVersion::parse("1.0.1");
        let v3 = GemVersion::parse("1.10.0");
        assert!(v1 < v2);
        assert!(v2 < v3);
    }

    #[test]
    fn prerelease_before_release() {
        let rc = GemVersion::parse("7.1.0.rc1");
        let rel = GemVersion::parse("7.1.0");
        assert!(rc < rel);
        assert!(rc.is_prerelease());
        assert!(!rel.is_prerelease());
    }

    #[test]
    fn prerelease_ordering() {
        assert!(GemVersion::parse("2.0.0.beta1") < GemVersion::parse("2.0.0.beta2"));
        assert!(GemVersion::parse("2.0.0.alpha") < GemVersion::parse("2.0.0.beta"));
    }

    #[test]
    fn trailing_zeros_equal() {
        assert_eq!(GemVersion::parse("1.0"), GemVersion::parse("1.0.0"));
    }

    #[test]
    fn major() {
        assert_eq!(GemVersion::parse("13.0.6").major(), Some(13));
        assert_eq!(major_of("2"), Some(2));
        assert_eq!(major_of("beta"), None);
    }

    #[test]
    fn version_detection() {
        assert!(looks_like_version("1.0.0"));
        assert!(!looks_like_version("Demo::VERSION"));
        assert!(!looks_like_version(""));
    }

    #[test]
    fn display() {
        assert_eq!(GemVersion::parse("1.8.0").to_string(), "1.8.0");
    }
}
