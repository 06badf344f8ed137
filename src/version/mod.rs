// src/version/mod.rs

//! Version handling for compiler checks and dependency version ranges
//!
//! Versions in this domain are rarely semver-compliant: compiler versions
//! look like `11`, `9.4` or `192`, and dependency pins look like `3.3.3`.
//! They are normalized to `semver::Version` for comparison.
//!
//! Version ranges follow the registry reference syntax:
//! - `3.3.3` → exact pin
//! - `[>=1.2.10 <2]` → every bound must hold

use crate::error::{Error, Result};
use semver::Version as SemVersion;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A loosely-formatted version such as `11`, `9.4` or `1.2.13`
#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
    normalized: SemVersion,
}

impl Version {
    /// Parse a version string
    ///
    /// Missing minor/patch components default to zero. Anything after the
    /// first non-numeric character of a component is ignored, so `11.4.0-1ubuntu`
    /// compares as `11.4.0`.
    pub fn parse(s: &str) -> Result<Self> {
        let raw = s.trim();
        if raw.is_empty() {
            return Err(Error::ParseError("Empty version string".to_string()));
        }

        if let Ok(v) = SemVersion::parse(raw) {
            return Ok(Self {
                raw: raw.to_string(),
                normalized: SemVersion::new(v.major, v.minor, v.patch),
            });
        }

        let mut numbers = [0u64; 3];
        for (i, part) in raw.split('.').take(3).enumerate() {
            let digits: String = part.chars().take_while(|c| c.is_ascii_digit()).collect();
            if digits.is_empty() {
                if i == 0 {
                    return Err(Error::ParseError(format!("Invalid version '{}'", raw)));
                }
                break;
            }
            numbers[i] = digits
                .parse()
                .map_err(|e| Error::ParseError(format!("Invalid version '{}': {}", raw, e)))?;
        }

        Ok(Self {
            raw: raw.to_string(),
            normalized: SemVersion::new(numbers[0], numbers[1], numbers[2]),
        })
    }

    /// The version exactly as written
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.normalized == other.normalized
    }
}

impl Eq for Version {}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.normalized.cmp(&other.normalized)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Comparison operator of a single range bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundOp {
    GreaterOrEqual,
    GreaterThan,
    LessOrEqual,
    LessThan,
    Equal,
}

impl BoundOp {
    fn as_str(&self) -> &'static str {
        match self {
            BoundOp::GreaterOrEqual => ">=",
            BoundOp::GreaterThan => ">",
            BoundOp::LessOrEqual => "<=",
            BoundOp::LessThan => "<",
            BoundOp::Equal => "=",
        }
    }
}

/// One bound of a bracketed range, e.g. `>=1.2.10`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bound {
    pub op: BoundOp,
    pub version: Version,
}

impl Bound {
    fn parse(s: &str) -> Result<Self> {
        let (op, rest) = if let Some(rest) = s.strip_prefix(">=") {
            (BoundOp::GreaterOrEqual, rest)
        } else if let Some(rest) = s.strip_prefix("<=") {
            (BoundOp::LessOrEqual, rest)
        } else if let Some(rest) = s.strip_prefix('>') {
            (BoundOp::GreaterThan, rest)
        } else if let Some(rest) = s.strip_prefix('<') {
            (BoundOp::LessThan, rest)
        } else if let Some(rest) = s.strip_prefix('=') {
            (BoundOp::Equal, rest)
        } else {
            (BoundOp::Equal, s)
        };

        Ok(Self {
            op,
            version: Version::parse(rest)?,
        })
    }

    fn holds(&self, version: &Version) -> bool {
        match self.op {
            BoundOp::GreaterOrEqual => version >= &self.version,
            BoundOp::GreaterThan => version > &self.version,
            BoundOp::LessOrEqual => version <= &self.version,
            BoundOp::LessThan => version < &self.version,
            BoundOp::Equal => version == &self.version,
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op.as_str(), self.version)
    }
}

/// Version requirement attached to a dependency reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionRange {
    /// Exact pin, e.g. `3.3.3`
    Exact(Version),
    /// Bracketed range, e.g. `[>=1.1 <4]`
    Range(Vec<Bound>),
}

impl VersionRange {
    /// Parse a range as written after the `/` of a reference
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        let Some(inner) = s.strip_prefix('[').and_then(|r| r.strip_suffix(']')) else {
            return Ok(VersionRange::Exact(Version::parse(s)?));
        };

        let bounds = inner
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .map(Bound::parse)
            .collect::<Result<Vec<_>>>()?;

        if bounds.is_empty() {
            return Err(Error::ParseError(format!("Empty version range '{}'", s)));
        }

        Ok(VersionRange::Range(bounds))
    }

    /// Check if a concrete version satisfies this range
    pub fn satisfies(&self, version: &Version) -> bool {
        match self {
            VersionRange::Exact(v) => version == v,
            VersionRange::Range(bounds) => bounds.iter().all(|b| b.holds(version)),
        }
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionRange::Exact(v) => write!(f, "{}", v),
            VersionRange::Range(bounds) => {
                let parts: Vec<String> = bounds.iter().map(|b| b.to_string()).collect();
                write!(f, "[{}]", parts.join(" "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_version_parse_compiler_styles() {
        assert_eq!(v("11"), v("11.0.0"));
        assert_eq!(v("9.4"), v("9.4.0"));
        assert_eq!(v("192"), v("192.0"));
        assert_eq!(v("11.4.0-1ubuntu1"), v("11.4.0"));
        assert_eq!(v("11").as_str(), "11");
    }

    #[test]
    fn test_version_parse_rejects_garbage() {
        assert!(Version::parse("").is_err());
        assert!(Version::parse("latest").is_err());
    }

    #[test]
    fn test_version_compare() {
        assert!(v("8") < v("9"));
        assert!(v("9.1") > v("9"));
        assert!(v("191") < v("192"));
        assert!(v("1.2.13") > v("1.2.10"));
    }

    #[test]
    fn test_range_exact() {
        let r = VersionRange::parse("3.3.3").unwrap();
        assert!(r.satisfies(&v("3.3.3")));
        assert!(!r.satisfies(&v("3.3.4")));
        assert_eq!(r.to_string(), "3.3.3");
    }

    #[test]
    fn test_range_bracketed() {
        let r = VersionRange::parse("[>=1.2.10 <2]").unwrap();
        assert!(r.satisfies(&v("1.2.10")));
        assert!(r.satisfies(&v("1.3.1")));
        assert!(!r.satisfies(&v("1.2.9")));
        assert!(!r.satisfies(&v("2.0.0")));
        assert_eq!(r.to_string(), "[>=1.2.10 <2]");
    }

    #[test]
    fn test_range_comma_separated() {
        let r = VersionRange::parse("[>=1.1, <4]").unwrap();
        assert!(r.satisfies(&v("3.0.13")));
        assert!(!r.satisfies(&v("1.0.2")));
    }

    #[test]
    fn test_range_empty_brackets() {
        assert!(VersionRange::parse("[]").is_err());
    }
}
