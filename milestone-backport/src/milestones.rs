//! Milestone resolution.
//!
//! Open milestones are ordered by coercing their titles to semantic versions.
//! Backports go to the source pull request's milestone and every open
//! milestone sorted after it.
//!
//! The coercion rule: take the first run of ASCII digits in the title; it
//! must be followed by a `.<digits>` minor group, optionally by a third
//! `.<digits>` patch group. A missing patch is zero and oversized components
//! saturate. Titles without a `MAJOR.MINOR` prefix (no digits at all, or a
//! bare number such as a year) are degenerate and coerce to `0.0.0`, so they
//! sort before every release line.
//!
//! | title        | version    |
//! |--------------|------------|
//! | `2.16.x`     | `2.16.0`   |
//! | `v1.2.3-rc1` | `1.2.3`    |
//! | `2023`       | `0.0.0`    |
//! | `next`       | `0.0.0`    |

use crate::context::BackportContext;
use crate::forge::ForgeError;
use semver::Version;
use tracing::{debug, info, info_span, warn, Instrument};

/// Coerces a milestone title to a comparable version.
#[must_use]
pub fn coerce_version(title: &str) -> Version {
    let bytes = title.as_bytes();
    let Some(start) = bytes.iter().position(u8::is_ascii_digit) else {
        return Version::new(0, 0, 0);
    };

    let mut parts = [0u64; 3];
    let mut pos = start;
    for (index, part) in parts.iter_mut().enumerate() {
        if index > 0 {
            let has_group = bytes.get(pos) == Some(&b'.')
                && bytes.get(pos + 1).is_some_and(u8::is_ascii_digit);
            if !has_group {
                if index == 1 {
                    return Version::new(0, 0, 0);
                }
                break;
            }
            pos += 1;
        }

        let digits = bytes[pos..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        *part = parse_saturating(&bytes[pos..pos + digits]);
        pos += digits;
    }

    Version::new(parts[0], parts[1], parts[2])
}

fn parse_saturating(digits: &[u8]) -> u64 {
    digits.iter().fold(0u64, |acc, digit| {
        acc.saturating_mul(10)
            .saturating_add(u64::from(digit - b'0'))
    })
}

/// Orders `titles` by coerced version and returns the suffix starting at `start`.
///
/// The sort is stable, so titles with equal versions keep their input order.
/// `start` is matched by exact string; an absent `start` yields an empty list.
#[must_use]
pub fn order_from(titles: &[String], start: &str) -> Vec<String> {
    let mut sorted: Vec<&String> = titles.iter().collect();
    sorted.sort_by_cached_key(|title| coerce_version(title));

    match sorted.iter().position(|title| title.as_str() == start) {
        Some(index) => sorted[index..].iter().map(|t| (*t).clone()).collect(),
        None => Vec::new(),
    }
}

/// Resolves the milestones a pull request in milestone `start` should be backported to.
///
/// Returns an empty list when `start` is not among the open milestones.
///
/// # Errors
///
/// Returns [`ForgeError`] if the open milestones can't be listed.
pub async fn resolve_milestones(
    ctx: &BackportContext,
    start: &str,
) -> Result<Vec<String>, ForgeError> {
    let span = info_span!("resolve_milestones", start = %start);

    async {
        let records = ctx.forge().open_milestones().await?;

        let mut titles = Vec::with_capacity(records.len());
        for record in records {
            match record.title {
                Some(title) if !title.trim().is_empty() => titles.push(title),
                _ => warn!("Skipping open milestone without a title"),
            }
        }
        debug!(open = ?titles, "Open milestones");

        let relevant = order_from(&titles, start);
        if relevant.is_empty() {
            let start_version = coerce_version(start);
            if let Some(similar) = titles.iter().find(|t| coerce_version(t) == start_version) {
                // Matching stays exact; surface the near miss for a human.
                warn!(
                    similar = %similar,
                    "Milestone is not open, but an open milestone has the same version"
                );
            } else {
                warn!("Milestone is not open");
            }
        } else {
            info!(milestones = ?relevant, "Resolved milestones");
        }

        Ok(relevant)
    }
    .instrument(span)
    .await
}
