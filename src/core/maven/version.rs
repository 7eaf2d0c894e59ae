// ─── Version Ordering ───
// Numeric-aware comparison for dependency version strings.

use std::cmp::Ordering;

/// `None` when a segment does not fit a `u64`.
fn parse_numeric_version_parts(raw: &str) -> Option<Vec<u64>> {
    raw.split(|c: char| !c.is_ascii_digit())
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.parse::<u64>().ok())
        .collect()
}

/// Compare two version strings by their numeric segments, falling back to the
/// raw string when the numbers are identical (`"1.0"` vs `"1.0.0"` vs `"1.0-rc"`)
/// or a segment is too long to compare numerically.
///
/// `"9" < "10"` and `"1.9" < "1.20"`, unlike a plain string comparison.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let (Some(a_parts), Some(b_parts)) =
        (parse_numeric_version_parts(a), parse_numeric_version_parts(b))
    else {
        return a.cmp(b);
    };

    let max_len = a_parts.len().max(b_parts.len());
    for idx in 0..max_len {
        let a_val = a_parts.get(idx).copied().unwrap_or(0);
        let b_val = b_parts.get(idx).copied().unwrap_or(0);
        match a_val.cmp(&b_val) {
            Ordering::Equal => continue,
            non_eq => return non_eq,
        }
    }

    a.cmp(b)
}

/// The lower of two versions under [`compare_versions`].
pub fn lower_version<'a>(a: &'a str, b: &'a str) -> &'a str {
    match compare_versions(a, b) {
        Ordering::Greater => b,
        _ => a,
    }
}
