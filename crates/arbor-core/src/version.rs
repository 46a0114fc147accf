//! Maven version ordering and version-range constraints.
//!
//! Maven versions use a custom ordering that differs from semver:
//! - Segments are split on `.` and `-`
//! - Numeric segments compare as numbers
//! - String qualifiers have a special ordering:
//!   `alpha` < `beta` < `milestone` < `rc` < `snapshot` < `""` (release) < `sp`
//! - Unknown qualifiers sort after numbers are exhausted but before releases
//!
//! A declared version is either a point version (`1.2.0`) or a constraint
//! made of one or more ranges (`[1.0,2.0)`, `[1.1,)`, `(,1.0],[1.2,)`).

use std::cmp::Ordering;
use std::fmt;

/// A parsed Maven version with comparable segments.
#[derive(Debug, Clone)]
pub struct MavenVersion {
    original: String,
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
enum Segment {
    Numeric(u64),
    Qualifier(QualifierKind),
    Text(String),
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
enum QualifierKind {
    Alpha,
    Beta,
    Milestone,
    Rc,
    Snapshot,
    Release,
    Sp,
}

impl MavenVersion {
    pub fn parse(version: &str) -> Self {
        let segments = version
            .split(['.', '-'])
            .filter(|token| !token.is_empty())
            .map(classify)
            .collect();
        Self {
            original: version.to_string(),
            segments,
        }
    }

    /// The version exactly as it was written.
    pub fn as_str(&self) -> &str {
        &self.original
    }
}

impl PartialEq for MavenVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for MavenVersion {}

impl fmt::Display for MavenVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl Ord for MavenVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        (0..len)
            .map(|i| match (self.segments.get(i), other.segments.get(i)) {
                (None, None) => Ordering::Equal,
                (Some(s), None) => against_padding(s),
                (None, Some(s)) => against_padding(s).reverse(),
                (Some(a), Some(b)) => compare_segments(a, b),
            })
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for MavenVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compare a segment against the implicit padding of a shorter version.
fn against_padding(seg: &Segment) -> Ordering {
    match seg {
        Segment::Numeric(n) => n.cmp(&0),
        Segment::Qualifier(q) => q.cmp(&QualifierKind::Release),
        Segment::Text(_) => Ordering::Less,
    }
}

fn compare_segments(a: &Segment, b: &Segment) -> Ordering {
    use Segment::*;
    match (a, b) {
        (Numeric(a), Numeric(b)) => a.cmp(b),
        (Qualifier(a), Qualifier(b)) => a.cmp(b),
        (Text(a), Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
        (Numeric(_), _) => Ordering::Greater,
        (_, Numeric(_)) => Ordering::Less,
        (Qualifier(q), Text(_)) => {
            if *q >= QualifierKind::Release {
                Ordering::Greater
            } else {
                Ordering::Less
            }
        }
        (Text(_), Qualifier(_)) => compare_segments(b, a).reverse(),
    }
}

fn classify(token: &str) -> Segment {
    if let Ok(n) = token.parse::<u64>() {
        return Segment::Numeric(n);
    }
    match token.to_lowercase().as_str() {
        "alpha" | "a" => Segment::Qualifier(QualifierKind::Alpha),
        "beta" | "b" => Segment::Qualifier(QualifierKind::Beta),
        "milestone" | "m" => Segment::Qualifier(QualifierKind::Milestone),
        "rc" | "cr" => Segment::Qualifier(QualifierKind::Rc),
        "snapshot" => Segment::Qualifier(QualifierKind::Snapshot),
        "ga" | "final" | "release" => Segment::Qualifier(QualifierKind::Release),
        "sp" => Segment::Qualifier(QualifierKind::Sp),
        _ => Segment::Text(token.to_string()),
    }
}

/// One bounded or half-open interval of versions.
#[derive(Debug, Clone)]
pub struct VersionRange {
    pub lower: Option<Bound>,
    pub upper: Option<Bound>,
}

#[derive(Debug, Clone)]
pub struct Bound {
    pub version: MavenVersion,
    pub inclusive: bool,
}

impl VersionRange {
    /// Parse a single bracketed range such as `[1.0,2.0)` or `[1.5]`.
    fn parse_one(spec: &str) -> Option<Self> {
        let s = spec.trim();
        let open_inclusive = match s.chars().next()? {
            '[' => true,
            '(' => false,
            _ => return None,
        };
        let close_inclusive = match s.chars().last()? {
            ']' => true,
            ')' => false,
            _ => return None,
        };
        if s.len() < 2 {
            return None;
        }
        let inner = &s[1..s.len() - 1];

        let bound = |text: &str, inclusive: bool| {
            let text = text.trim();
            (!text.is_empty()).then(|| Bound {
                version: MavenVersion::parse(text),
                inclusive,
            })
        };

        match inner.split_once(',') {
            Some((lower, upper)) => {
                if upper.contains(',') {
                    return None;
                }
                Some(Self {
                    lower: bound(lower, open_inclusive),
                    upper: bound(upper, close_inclusive),
                })
            }
            None => {
                // `[1.0]` pins exactly one version
                if !open_inclusive || !close_inclusive || inner.trim().is_empty() {
                    return None;
                }
                let exact = bound(inner, true);
                Some(Self {
                    lower: exact.clone(),
                    upper: exact,
                })
            }
        }
    }

    /// Check if a version satisfies this range.
    pub fn contains(&self, version: &MavenVersion) -> bool {
        let above_lower = self.lower.as_ref().map_or(true, |b| match version.cmp(&b.version) {
            Ordering::Greater => true,
            Ordering::Equal => b.inclusive,
            Ordering::Less => false,
        });
        let below_upper = self.upper.as_ref().map_or(true, |b| match version.cmp(&b.version) {
            Ordering::Less => true,
            Ordering::Equal => b.inclusive,
            Ordering::Greater => false,
        });
        above_lower && below_upper
    }
}

/// A declared version constraint: the union of one or more ranges.
#[derive(Debug, Clone)]
pub struct VersionConstraint {
    original: String,
    ranges: Vec<VersionRange>,
}

impl VersionConstraint {
    /// Whether a declared version string uses range syntax at all.
    pub fn is_range(spec: &str) -> bool {
        spec.trim_start().starts_with(['[', '('])
    }

    /// Parse a range expression.
    ///
    /// Returns `None` for bare versions and for malformed ranges.
    pub fn parse(spec: &str) -> Option<Self> {
        if !Self::is_range(spec) {
            return None;
        }
        let mut ranges = Vec::new();
        let mut start = None;
        for (i, ch) in spec.char_indices() {
            match ch {
                '[' | '(' if start.is_none() => start = Some(i),
                ']' | ')' => {
                    let from = start.take()?;
                    ranges.push(VersionRange::parse_one(&spec[from..=i])?);
                }
                ',' | ' ' if start.is_none() => {}
                _ if start.is_none() => return None,
                _ => {}
            }
        }
        if start.is_some() || ranges.is_empty() {
            return None;
        }
        Some(Self {
            original: spec.trim().to_string(),
            ranges,
        })
    }

    pub fn ranges(&self) -> &[VersionRange] {
        &self.ranges
    }

    /// Check if a version satisfies any range of the constraint.
    pub fn contains(&self, version: &MavenVersion) -> bool {
        self.ranges.iter().any(|r| r.contains(version))
    }

    /// Pick the highest of `candidates` that satisfies the constraint.
    pub fn highest_of<'a, I>(&self, candidates: I) -> Option<MavenVersion>
    where
        I: IntoIterator<Item = &'a str>,
    {
        candidates
            .into_iter()
            .map(MavenVersion::parse)
            .filter(|v| self.contains(v))
            .max()
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}
