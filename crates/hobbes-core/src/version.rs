//! Loose version comparison for update checks.
//!
//! Release tags in the wild are not all semver. Comparison here is
//! deliberately forgiving: numeric dot-segments compared left to right,
//! with a stable release ranking above a prerelease of the same number.

/// Strip a leading `v` from a tag when it precedes a digit.
pub fn strip_tag_prefix(tag: &str) -> &str {
    tag.strip_prefix('v')
        .filter(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
        .unwrap_or(tag)
}

fn split(version: &str) -> (Vec<u64>, Option<&str>) {
    let version = strip_tag_prefix(version);
    let (core, pre) = match version.split_once('-') {
        Some((core, pre)) => (core, Some(pre)),
        None => (version, None),
    };
    let nums = core
        .split('.')
        .map(|s| {
            s.chars()
                .take_while(char::is_ascii_digit)
                .collect::<String>()
                .parse()
                .unwrap_or(0)
        })
        .collect();
    (nums, pre)
}

/// True when `candidate` is strictly newer than `current`.
///
/// Unequal-length segment lists are padded with zeros, so `1.2` and
/// `1.2.0` compare equal. When the numeric cores tie, a version without a
/// prerelease suffix beats one with it; two prerelease suffixes compare
/// lexicographically.
pub fn is_newer(candidate: &str, current: &str) -> bool {
    let (cand_nums, cand_pre) = split(candidate);
    let (cur_nums, cur_pre) = split(current);

    let len = cand_nums.len().max(cur_nums.len());
    for i in 0..len {
        let a = cand_nums.get(i).copied().unwrap_or(0);
        let b = cur_nums.get(i).copied().unwrap_or(0);
        if a != b {
            return a > b;
        }
    }

    match (cand_pre, cur_pre) {
        (None, Some(_)) => true,
        (Some(_), None) | (None, None) => false,
        (Some(a), Some(b)) => a > b,
    }
}
