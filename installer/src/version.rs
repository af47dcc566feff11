//! Dotted numeric versions as used by OfficeToPDF tags (`v1.9.0.2`, `v2.0-rc1`).

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex_lite::Regex;

use crate::error::{InstallerError, Result};

static VERSION_IN_TEXT: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"[vV]?\d+(?:\.\d+)*(?:-[0-9A-Za-z]+(?:\.[0-9A-Za-z]+)*)?").ok());

/// A version made of any number of numeric components and an optional
/// pre-release label.
///
/// Missing trailing components compare as zero, so `1.2` equals `1.2.0`.
/// A pre-release sorts below the same numbers without a label, so
/// `2.0-rc1 < 2.0`.
#[derive(Debug, Clone)]
pub struct ReleaseVersion {
    components: Vec<u64>,
    pre: Option<String>,
}

impl ReleaseVersion {
    /// Parse a version such as `1.9.0.2`, `v1.9` or `v2.0-rc1`.
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || InstallerError::InvalidVersion(text.to_string());

        let trimmed = text.trim();
        let unprefixed = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);

        let (numbers, pre) = match unprefixed.split_once('-') {
            Some((numbers, label)) => {
                let valid = label
                    .split('.')
                    .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_alphanumeric()));
                if !valid {
                    return Err(invalid());
                }
                (numbers, Some(label.to_string()))
            }
            None => (unprefixed, None),
        };

        let components = numbers
            .split('.')
            .map(|part| {
                if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                part.parse::<u64>().ok()
            })
            .collect::<Option<Vec<_>>>()
            .ok_or_else(invalid)?;

        Ok(Self { components, pre })
    }

    /// Find the first version-looking token in free text (e.g. `/version` output).
    pub fn find_in(text: &str) -> Result<Self> {
        let found = VERSION_IN_TEXT
            .as_ref()
            .and_then(|re| re.find(text))
            .ok_or_else(|| InstallerError::InvalidVersion(text.trim().to_string()))?;
        Self::parse(found.as_str())
    }

    pub fn components(&self) -> &[u64] {
        &self.components
    }

    /// Pre-release label, e.g. `rc1`.
    pub fn pre_release(&self) -> Option<&str> {
        self.pre.as_deref()
    }

    pub fn is_pre_release(&self) -> bool {
        self.pre.is_some()
    }

    fn cmp_components(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        (0..len)
            .map(|i| {
                let left = self.components.get(i).copied().unwrap_or(0);
                let right = other.components.get(i).copied().unwrap_or(0);
                left.cmp(&right)
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

/// Compare labels run by run, digits numerically, so `rc2 < rc10`.
fn cmp_labels(left: &str, right: &str) -> Ordering {
    let (left, right) = (label_runs(left), label_runs(right));
    for (a, b) in left.iter().zip(&right) {
        let ordering = match (a.parse::<u64>(), b.parse::<u64>()) {
            (Ok(a), Ok(b)) => a.cmp(&b),
            (Ok(_), Err(_)) => Ordering::Less,
            (Err(_), Ok(_)) => Ordering::Greater,
            (Err(_), Err(_)) => a.to_ascii_lowercase().cmp(&b.to_ascii_lowercase()),
        };
        if ordering.is_ne() {
            return ordering;
        }
    }
    left.len().cmp(&right.len())
}

/// Split `rc10.b2` into `["rc", "10", "b", "2"]`.
fn label_runs(label: &str) -> Vec<&str> {
    let mut runs = Vec::new();
    for part in label.split('.') {
        let mut start = 0;
        let bytes = part.as_bytes();
        for i in 1..bytes.len() {
            if bytes[i].is_ascii_digit() != bytes[i - 1].is_ascii_digit() {
                runs.push(&part[start..i]);
                start = i;
            }
        }
        runs.push(&part[start..]);
    }
    runs
}

impl FromStr for ReleaseVersion {
    type Err = InstallerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.components.iter().map(u64::to_string).collect();
        write!(f, "{}", parts.join("."))?;
        if let Some(pre) = &self.pre {
            write!(f, "-{pre}")?;
        }
        Ok(())
    }
}

impl Ord for ReleaseVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_components(other)
            .then_with(|| match (&self.pre, &other.pre) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(left), Some(right)) => cmp_labels(left, right),
            })
    }
}

impl PartialOrd for ReleaseVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ReleaseVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ReleaseVersion {}

/// `installed >= latest`.
pub fn version_is_current(installed: &ReleaseVersion, latest: &ReleaseVersion) -> bool {
    installed >= latest
}
