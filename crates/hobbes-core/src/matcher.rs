//! Selects the release asset that fits the local platform.
//!
//! Matching is driven entirely by the alias tables in [`crate::platform`]
//! and a total-order score per candidate, so any two runs over the same
//! asset list pick the same winner. Ties fall to the earlier-listed asset.

use std::cmp::Reverse;
use std::collections::BTreeSet;

use crate::platform::{arch_in_name, contains_token, os_in_name, Arch, Libc, Os, Platform};
use crate::release::Asset;

/// Extensions that can never be an installable binary.
const SKIP_EXTENSIONS: &[&str] = &[
    ".txt", ".md", ".sha256", ".sha512", ".sig", ".asc", ".sbom", ".json", ".pem",
];

/// Tokens marking an asset as something other than a release binary.
const PENALTY_TOKENS: &[&str] = &["debug", "src", "source", "sources", "symbols"];

/// Result of matching a release's assets against a platform.
#[derive(Debug)]
pub enum MatchOutcome<'a> {
    /// The single best-scoring compatible asset.
    Match(&'a Asset),
    /// Nothing was compatible; `available` lists the platforms the release
    /// does ship, for the error message.
    NoMatch { available: Vec<(Os, Option<Arch>)> },
}

/// Score of one candidate asset. Higher compares greater.
///
/// Field order is the comparison order: architecture match dominates,
/// then libc fit, then the absence of penalty tokens, then archive format
/// preference, and finally the shorter name wins.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Score {
    arch_matched: bool,
    libc_ok: bool,
    clean: bool,
    format_pref: u8,
    name_len: Reverse<usize>,
}

fn format_preference(name: &str) -> u8 {
    let lower = name.to_lowercase();
    if lower.ends_with(".tar.gz") || lower.ends_with(".tgz") {
        4
    } else if lower.ends_with(".zip") {
        3
    } else if lower.ends_with(".tar.xz") || lower.ends_with(".txz") {
        2
    } else if lower.ends_with(".gz") {
        1
    } else {
        0
    }
}

fn is_skipped(name: &str) -> bool {
    let lower = name.to_lowercase();
    SKIP_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

fn libc_fits(name: &str, libc: Option<Libc>) -> bool {
    let mentions_musl = contains_token(name, "musl");
    let mentions_gnu = contains_token(name, "gnu") || contains_token(name, "glibc");
    match libc {
        Some(Libc::Musl) => !mentions_gnu,
        Some(Libc::Gnu) => !mentions_musl,
        // Non-Linux platforms ignore libc markers entirely
        None => true,
    }
}

/// Pick the asset for `platform` out of `assets`.
///
/// An asset qualifies when its name carries an OS alias for the platform
/// and, unless the release names at most one architecture across all its
/// assets, an architecture alias too. Among qualifiers the highest
/// [`Score`] wins; a strictly-greater score is required to displace the
/// current best, so the first-listed asset wins exact ties.
pub fn select<'a>(platform: Platform, assets: &'a [Asset]) -> MatchOutcome<'a> {
    // Releases that only build for one architecture often leave it out of
    // the filename. Require an arch token only when the set is ambiguous.
    let distinct_arches: BTreeSet<&str> = assets
        .iter()
        .filter(|a| !is_skipped(&a.name))
        .filter_map(|a| arch_in_name(&a.name))
        .map(Arch::as_str)
        .collect();
    let arch_required = distinct_arches.len() > 1;

    let mut best: Option<(&Asset, Score)> = None;

    for asset in assets {
        if is_skipped(&asset.name) {
            continue;
        }
        if os_in_name(&asset.name) != Some(platform.os) {
            continue;
        }
        let asset_arch = arch_in_name(&asset.name);
        let arch_matched = asset_arch == Some(platform.arch);
        if !arch_matched && (arch_required || asset_arch.is_some()) {
            continue;
        }

        let score = Score {
            arch_matched,
            libc_ok: libc_fits(&asset.name, platform.libc),
            clean: !PENALTY_TOKENS.iter().any(|t| contains_token(&asset.name, t)),
            format_pref: format_preference(&asset.name),
            name_len: Reverse(asset.name.len()),
        };

        match &best {
            Some((_, top)) if score <= *top => {}
            _ => best = Some((asset, score)),
        }
    }

    match best {
        Some((asset, _)) => MatchOutcome::Match(asset),
        None => MatchOutcome::NoMatch {
            available: available_platforms(assets),
        },
    }
}

/// Deduplicated (os, arch) pairs a release's assets name, in listing order.
fn available_platforms(assets: &[Asset]) -> Vec<(Os, Option<Arch>)> {
    let mut seen = Vec::new();
    for asset in assets {
        if is_skipped(&asset.name) {
            continue;
        }
        if let Some(os) = os_in_name(&asset.name) {
            let pair = (os, arch_in_name(&asset.name));
            if !seen.contains(&pair) {
                seen.push(pair);
            }
        }
    }
    seen
}
