//! Expansion of keywords × locations into query units.

use crate::types::{Location, QueryUnit};

/// Build one [`QueryUnit`] per (location, keyword) pair.
///
/// Locations are iterated in the outer loop and keywords in the inner loop,
/// so the output is grouped by location in input order. Nothing is filtered
/// or deduplicated; duplicate inputs yield duplicate units.
pub fn build_queries(keywords: &[String], locations: &[Location]) -> Vec<QueryUnit> {
    let mut units = Vec::with_capacity(keywords.len() * locations.len());

    for location in locations {
        let location = location.to_display_string();
        for keyword in keywords {
            units.push(QueryUnit {
                keyword: keyword.clone(),
                location: location.clone(),
                raw_query: format!("{} {}", keyword, location),
            });
        }
    }

    units
}
