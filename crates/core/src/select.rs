//! Representative variant selection.
//!
//! A collection's variants describe the same family, so one of them is
//! enough to derive fallback metrics. The choice must not depend on input
//! order (except in the documented no-numeric-weight case) so that re-runs
//! after a cache miss reproduce the same CSS.

use fontfall_types::{FontVariant, FontWeight, ParsedFontMetadata};
use std::cmp::Ordering;

/// CSS `normal` weight.
pub const NORMAL_WEIGHT: f32 = 400.0;
/// CSS `bold` weight.
pub const BOLD_WEIGHT: f32 = 700.0;

/// Knobs for interpreting configured weights.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SelectionPolicy {
    /// Map the `normal` and `bold` keywords to 400 and 700. When disabled,
    /// any non-numeric weight counts as unresolvable.
    pub resolve_keywords: bool,
}

impl SelectionPolicy {
    pub fn with_keywords(mut self, resolve_keywords: bool) -> Self {
        self.resolve_keywords = resolve_keywords;
        self
    }
}

/// A successfully parsed variant.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub variant: FontVariant,
    pub metadata: ParsedFontMetadata,
}

impl Candidate {
    pub fn new(variant: FontVariant, metadata: ParsedFontMetadata) -> Self {
        Self { variant, metadata }
    }
}

fn resolve_token(token: &str, policy: SelectionPolicy) -> Option<f32> {
    match token.to_ascii_lowercase().as_str() {
        "normal" if policy.resolve_keywords => Some(NORMAL_WEIGHT),
        "bold" if policy.resolve_keywords => Some(BOLD_WEIGHT),
        other => other.parse::<f32>().ok().filter(|n| n.is_finite()),
    }
}

/// Signed distance of a weight from 400, or `None` if it cannot be read as
/// a number.
///
/// A range such as `"100 900"` (variable fonts) has distance 0 when it
/// covers 400, otherwise the distance of its nearer end.
pub fn distance_from_normal(weight: Option<&FontWeight>, policy: SelectionPolicy) -> Option<f32> {
    match weight? {
        FontWeight::Number(n) => n.is_finite().then(|| n - NORMAL_WEIGHT),
        FontWeight::Text(text) => {
            let mut parts = text.split_whitespace();
            let first = resolve_token(parts.next()?, policy)?;
            let Some(second) = parts.next() else {
                return Some(first - NORMAL_WEIGHT);
            };
            if parts.next().is_some() {
                return None;
            }
            let second = resolve_token(second, policy)?;
            let (low, high) = if first <= second { (first, second) } else { (second, first) };
            if low <= NORMAL_WEIGHT && high >= NORMAL_WEIGHT {
                Some(0.0)
            } else if low > NORMAL_WEIGHT {
                Some(low - NORMAL_WEIGHT)
            } else {
                Some(high - NORMAL_WEIGHT)
            }
        }
    }
}

fn style_rank(style: &str) -> u8 {
    let style = style.trim();
    if style.is_empty() || style.eq_ignore_ascii_case("normal") { 0 } else { 1 }
}

/// Ordering of two resolvable candidates; `Less` means `a` is preferred.
fn preference(a: (&Candidate, f32), b: (&Candidate, f32)) -> Ordering {
    let (ca, da) = a;
    let (cb, db) = b;
    da.abs()
        .total_cmp(&db.abs())
        // Equidistant weights: the thinner one.
        .then_with(|| da.total_cmp(&db))
        .then_with(|| style_rank(&ca.variant.style).cmp(&style_rank(&cb.variant.style)))
        // Only reached for equal-looking variants; keeps the result order independent.
        .then_with(|| ca.variant.style.cmp(&cb.variant.style))
        .then_with(|| {
            let ka = ca.variant.weight.as_ref().map(FontWeight::canonical_key);
            let kb = cb.variant.weight.as_ref().map(FontWeight::canonical_key);
            ka.cmp(&kb)
        })
}

/// Picks the candidate whose metrics represent the whole collection.
///
/// Closest weight to 400 wins, then the thinner of two equidistant weights,
/// then `normal` style over italic/oblique. If no candidate has a numeric
/// weight, the first candidate is used. Returns `None` only for an empty
/// slice.
pub fn select_representative(candidates: &[Candidate], policy: SelectionPolicy) -> Option<&Candidate> {
    let first = candidates.first()?;

    let best = candidates
        .iter()
        .filter_map(|c| distance_from_normal(c.variant.weight.as_ref(), policy).map(|d| (c, d)))
        .reduce(|best, current| {
            if preference(current, best) == Ordering::Less { current } else { best }
        });

    Some(best.map(|(c, _)| c).unwrap_or(first))
}
