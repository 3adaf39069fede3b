//! Image-name normalization and human-readable size parsing.
//!
//! Both are pure functions that key the rest of the scheduler's lookups
//! (image caches are keyed by normalized name; several pod labels carry
//! sizes as strings), so their exact behavior matters more than their
//! brevity suggests.

use crate::error::SchedulerError;

const DEFAULT_IMAGE_TAG: &str = "latest";

/// Returns the CRI-compliant name for a given image: if the last `:` occurs
/// before the last `/` (or not at all), append `:latest`.
///
/// <https://github.com/kubernetes/kubernetes/blob/e318642946daab9e0330757a3556a1913bb3fc5c/pkg/scheduler/algorithm/priorities/image_locality.go#L104>
pub fn normalize_image_name(image_name: &str) -> String {
    let last_colon = image_name.rfind(':');
    let last_slash = image_name.rfind('/');
    let needs_tag = match (last_colon, last_slash) {
        (Some(c), Some(s)) => c <= s,
        (Some(_), None) => false,
        (None, _) => true,
    };
    if needs_tag {
        format!("{image_name}:{DEFAULT_IMAGE_TAG}")
    } else {
        image_name.to_string()
    }
}

fn size_conversion(unit: &str) -> u64 {
    match unit {
        "K" => 10u64.pow(3),
        "M" => 10u64.pow(6),
        "G" => 10u64.pow(9),
        "T" => 10u64.pow(12),
        "P" => 10u64.pow(15),
        "E" => 10u64.pow(18),
        "Ki" => 1u64 << 10,
        "Mi" => 1u64 << 20,
        "Gi" => 1u64 << 30,
        "Ti" => 1u64 << 40,
        "Pi" => 1u64 << 50,
        "Ei" => 1u64 << 60,
        _ => 1,
    }
}

/// Parses a human-size string of the form `^([0-9]+)([A-Za-z]*)$`. Unknown
/// suffixes fall back to a factor of 1 (bytes); malformed input (no leading
/// digits, or trailing characters that don't form a clean number+suffix) is
/// an [`SchedulerError::InvalidSize`].
pub fn parse_size_string(size_string: &str) -> Result<u64, SchedulerError> {
    let digits_end = size_string
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(size_string.len());
    if digits_end == 0 {
        return Err(SchedulerError::InvalidSize(size_string.to_string()));
    }
    let (number, unit) = size_string.split_at(digits_end);
    if !unit.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(SchedulerError::InvalidSize(size_string.to_string()));
    }
    let number: u64 = number
        .parse()
        .map_err(|_| SchedulerError::InvalidSize(size_string.to_string()))?;
    Ok(number * size_conversion(unit))
}
