//! Input parsing and validation helpers.
//!
//! These functions turn raw user input (a target URL, newline-delimited
//! keyword and location lists) into validated values. Location parsing is
//! all-or-nothing: one malformed line rejects the whole list.

use crate::error::RankCheckError;
use crate::types::Location;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref ZIP_RE: Regex = Regex::new(r"^\d{5}$").expect("valid ZIP pattern");
}

/// Normalize a target website into the bare domain used for matching.
///
/// Lower-cases the input and strips the scheme, a leading `www.` and any
/// trailing slashes, so `https://www.Acme.com/` becomes `acme.com`.
///
/// # Errors
///
/// Returns `RankCheckError::InvalidInput` if nothing is left after stripping.
pub fn normalize_target_domain(input: &str) -> Result<String, RankCheckError> {
    let mut domain = input.trim().to_lowercase();

    for scheme in ["https://", "http://"] {
        if let Some(rest) = domain.strip_prefix(scheme) {
            domain = rest.to_string();
            break;
        }
    }
    if let Some(rest) = domain.strip_prefix("www.") {
        domain = rest.to_string();
    }
    let domain = domain.trim_end_matches('/').to_string();

    if domain.is_empty() {
        return Err(RankCheckError::invalid_input(
            "target domain",
            "target website cannot be empty",
        ));
    }
    if domain.chars().any(char::is_whitespace) {
        return Err(RankCheckError::invalid_input(
            "target domain",
            format!("'{}' contains whitespace", domain),
        ));
    }

    Ok(domain)
}

/// Split newline-delimited keywords, trimming each and skipping blank lines.
pub fn parse_keywords(input: &str) -> Vec<String> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Parse a single location line.
///
/// Accepts `City, State` (exactly two non-empty comma-separated parts) or a
/// 5-digit ZIP code. `line_number` is 1-based and only used for the error.
pub fn parse_location_line(line_number: usize, line: &str) -> Result<Location, RankCheckError> {
    let trimmed = line.trim();

    if ZIP_RE.is_match(trimmed) {
        return Ok(Location::Zip(trimmed.to_string()));
    }

    let parts: Vec<&str> = trimmed.split(',').map(str::trim).collect();
    match parts.as_slice() {
        [city, state] if !city.is_empty() && !state.is_empty() => Ok(Location::CityState {
            city: city.to_string(),
            state: state.to_string(),
        }),
        _ => Err(RankCheckError::invalid_location(
            line_number,
            trimmed,
            "expected 'City, State' or a 5-digit ZIP code",
        )),
    }
}

/// Parse newline-delimited locations.
///
/// Blank lines are skipped, but line numbers in errors still refer to the
/// original input.
///
/// # Errors
///
/// - `InvalidLocation` for the first malformed line
/// - `InvalidInput` if no locations are present at all
pub fn parse_locations(input: &str) -> Result<Vec<Location>, RankCheckError> {
    let mut locations = Vec::new();

    for (index, line) in input.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        locations.push(parse_location_line(index + 1, line)?);
    }

    if locations.is_empty() {
        return Err(RankCheckError::invalid_input(
            "locations",
            "at least one location is required",
        ));
    }

    Ok(locations)
}

/// Case-insensitive substring match of `target` inside `haystack`.
///
/// `target` is expected to be normalized (lower-case) already.
pub(crate) fn contains_domain(haystack: &str, target: &str) -> bool {
    !target.is_empty() && haystack.to_lowercase().contains(target)
}
