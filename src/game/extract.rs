//! Free-text response extraction
//!
//! Turns natural-language replies into typed values. Nothing here fails: a
//! reply without a usable answer yields the caller's default. Bounds are the
//! caller's job (see [`clip`]), since they depend on earlier decisions in the
//! same round.

use regex::Regex;
use tracing::warn;

use crate::domain::BusinessMode;

/// Clamp `value` into `[lower, upper]` as `max(lower, min(upper, value))`.
///
/// Unlike `f64::clamp` this never panics; if `lower > upper` the lower bound wins.
pub fn clip(value: f64, lower: f64, upper: f64) -> f64 {
    value.min(upper).max(lower)
}

fn key_pattern(key: &str, tail: &str) -> Option<Regex> {
    let pattern = format!(r"(?i){}{}", regex::escape(key), tail);
    match Regex::new(&pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!("Invalid extraction pattern for key '{}': {}", key, e);
            None
        }
    }
}

/// Find `<key> [:=] <number>` and return the first number, else `default`.
///
/// Only ASCII digits count, so every match parses.
pub fn extract_number(text: &str, key: &str, default: f64) -> f64 {
    let parsed = key_pattern(key, r"\s*[:=]\s*(-?[0-9]+(?:\.[0-9]+)?)")
        .and_then(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok());

    match parsed {
        Some(value) => value,
        None => {
            warn!(
                "Could not extract {} from response '{}', fallback={}",
                key, text, default
            );
            default
        }
    }
}

/// Pick a business mode out of a reply.
///
/// The first allowed label contained in the text wins (in `allowed` order).
/// Failing that, shorthand keywords are tried, restricted to allowed modes.
pub fn extract_mode(text: &str, allowed: &[BusinessMode], default: BusinessMode) -> BusinessMode {
    let lower = text.to_lowercase();

    if let Some(mode) = allowed.iter().find(|m| lower.contains(m.as_str())) {
        return *mode;
    }

    let shorthand = [
        ("dual", BusinessMode::Dual),
        ("market", BusinessMode::Marketplace),
        ("seller", BusinessMode::Seller),
    ];
    for (keyword, mode) in shorthand {
        if lower.contains(keyword) && allowed.contains(&mode) {
            return mode;
        }
    }

    warn!("Mode not found in '{}', fallback={}", text, default);
    default
}

/// Read a yes/no answer.
///
/// Looks for `<key> [:=]? (yes|no|true|false)` first. Otherwise any "yes" or
/// `keyword` in the text means true, any "no" means false.
pub fn extract_choice(text: &str, key: &str, keyword: &str, default: bool) -> bool {
    let explicit = key_pattern(key, r"\s*[:=]?\s*(yes|no|true|false)")
        .and_then(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| matches!(m.as_str().to_lowercase().as_str(), "yes" | "true"));

    if let Some(value) = explicit {
        return value;
    }

    let lower = text.to_lowercase();
    if lower.contains("yes") || (!keyword.is_empty() && lower.contains(&keyword.to_lowercase())) {
        return true;
    }
    if lower.contains("no") {
        return false;
    }

    warn!(
        "Could not parse boolean {} from '{}', fallback={}",
        key, text, default
    );
    default
}
