//! Summary metrics, rankings matrix and competitor table.
//!
//! Everything here is a pure function of the record set: input order does not
//! matter and repeated calls give identical output.

use crate::types::{LocalResult, ResultRecord, TargetPosition};
use crate::utils::contains_domain;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Headline metrics for one analysis run.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Summary {
    /// Number of successful records
    pub total_queries: usize,
    /// Records where the target is on the first page
    pub ranked_queries: usize,
    /// `ranked_queries / total_queries * 100`
    pub ranking_rate: f64,
    /// Records with at least one local listing
    pub local_queries: usize,
    /// Records whose top local listings include the target
    pub local_appearances: usize,
    /// `local_appearances / local_queries * 100`
    pub local_rate: f64,
}

/// Location × keyword grid of target positions.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RankingMatrix {
    /// Sorted, de-duplicated keyword axis
    pub keywords: Vec<String>,
    /// Sorted, de-duplicated location axis
    pub locations: Vec<String>,
    /// location → keyword → best position seen
    pub cells: BTreeMap<String, BTreeMap<String, TargetPosition>>,
}

impl RankingMatrix {
    /// Position for one cell, `None` when no record covers it.
    pub fn get(&self, location: &str, keyword: &str) -> Option<TargetPosition> {
        self.cells.get(location)?.get(keyword).copied()
    }
}

/// One organic competitor seen for a (keyword, location) pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct CompetitorRow {
    pub keyword: String,
    pub location: String,
    pub rank: usize,
    pub domain: String,
}

/// Complete aggregation output.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Aggregate {
    pub summary: Summary,
    pub matrix: RankingMatrix,
    pub competitors: Vec<CompetitorRow>,
}

/// Aggregate a record set for `target` (already normalized).
pub fn aggregate(records: &[ResultRecord], target: &str) -> Aggregate {
    Aggregate {
        summary: summarize(records, target),
        matrix: ranking_matrix(records),
        competitors: competitors(records),
    }
}

/// Compute headline metrics. Rates over an empty denominator are `0.0`.
pub fn summarize(records: &[ResultRecord], target: &str) -> Summary {
    let total_queries = records.len();
    let ranked_queries = records
        .iter()
        .filter(|r| r.target_position.is_ranked())
        .count();
    let with_local: Vec<&ResultRecord> = records
        .iter()
        .filter(|r| !r.local_results.is_empty())
        .collect();
    let local_appearances = with_local
        .iter()
        .filter(|r| r.local_results.iter().any(|l| local_matches(l, target)))
        .count();

    Summary {
        total_queries,
        ranked_queries,
        ranking_rate: percentage(ranked_queries, total_queries),
        local_queries: with_local.len(),
        local_appearances,
        local_rate: percentage(local_appearances, with_local.len()),
    }
}

/// Build the rankings grid. When two records share a cell the better
/// position wins.
pub fn ranking_matrix(records: &[ResultRecord]) -> RankingMatrix {
    let keywords: BTreeSet<&str> = records.iter().map(|r| r.keyword.as_str()).collect();
    let locations: BTreeSet<&str> = records.iter().map(|r| r.location.as_str()).collect();

    let mut cells: BTreeMap<String, BTreeMap<String, TargetPosition>> = BTreeMap::new();
    for record in records {
        cells
            .entry(record.location.clone())
            .or_default()
            .entry(record.keyword.clone())
            .and_modify(|pos| *pos = (*pos).min(record.target_position))
            .or_insert(record.target_position);
    }

    RankingMatrix {
        keywords: keywords.into_iter().map(str::to_string).collect(),
        locations: locations.into_iter().map(str::to_string).collect(),
        cells,
    }
}

/// Top organic domains per record, sorted by keyword, location and rank.
pub fn competitors(records: &[ResultRecord]) -> Vec<CompetitorRow> {
    let mut rows: Vec<CompetitorRow> = records
        .iter()
        .flat_map(|record| {
            record
                .organic_results
                .iter()
                .enumerate()
                .map(move |(idx, result)| CompetitorRow {
                    keyword: record.keyword.clone(),
                    location: record.location.clone(),
                    rank: idx + 1,
                    domain: result.domain.clone(),
                })
        })
        .collect();
    rows.sort();
    rows
}

/// A local listing belongs to the target when the target domain appears in
/// its website, link or title.
fn local_matches(listing: &LocalResult, target: &str) -> bool {
    [
        listing.website.as_deref(),
        listing.link.as_deref(),
        Some(listing.title.as_str()),
    ]
    .into_iter()
    .flatten()
    .any(|field| contains_domain(field, target))
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OrganicResult;

    fn record(keyword: &str, location: &str, position: TargetPosition) -> ResultRecord {
        ResultRecord {
            keyword: keyword.to_string(),
            location: location.to_string(),
            target_position: position,
            organic_results: vec![
                OrganicResult {
                    domain: "rival.com".to_string(),
                    title: "Rival".to_string(),
                    link: None,
                },
                OrganicResult {
                    domain: "acme.com".to_string(),
                    title: "Acme".to_string(),
                    link: None,
                },
            ],
            local_results: Vec::new(),
        }
    }

    fn listing(title: &str, website: Option<&str>) -> LocalResult {
        LocalResult {
            title: title.to_string(),
            rating: Some(4.8),
            reviews: Some(10),
            website: website.map(str::to_string),
            link: None,
        }
    }

    #[test]
    fn test_summary_rates() {
        let records = vec![
            record("plumber", "Austin, TX", TargetPosition::Ranked(2)),
            record("plumber", "Dallas, TX", TargetPosition::NotOnPageOne),
            record("electrician", "Austin, TX", TargetPosition::Ranked(1)),
            record("electrician", "Dallas, TX", TargetPosition::NotOnPageOne),
        ];
        let summary = summarize(&records, "acme.com");
        assert_eq!(summary.total_queries, 4);
        assert_eq!(summary.ranked_queries, 2);
        assert_eq!(summary.ranking_rate, 50.0);
        assert_eq!(summary.local_queries, 0);
        assert_eq!(summary.local_rate, 0.0);
    }

    #[test]
    fn test_summary_of_nothing_is_zero() {
        let summary = summarize(&[], "acme.com");
        assert_eq!(summary, Summary::default());
    }

    #[test]
    fn test_local_rate_counts_records_with_listings_only() {
        let mut with_target = record("plumber", "Austin, TX", TargetPosition::Ranked(1));
        with_target.local_results = vec![
            listing("Rival Plumbing", Some("https://rival.com")),
            listing("Acme Plumbing", Some("https://www.acme.com/austin")),
        ];
        let mut without_target = record("plumber", "Dallas, TX", TargetPosition::Ranked(1));
        without_target.local_results = vec![listing("Rival Plumbing", None)];
        let mut by_title = record("electrician", "Dallas, TX", TargetPosition::Ranked(1));
        by_title.local_results = vec![listing("ACME.COM Electric", None)];
        let no_local = record("electrician", "Austin, TX", TargetPosition::Ranked(1));

        let summary = summarize(&[with_target, without_target, by_title, no_local], "acme.com");
        assert_eq!(summary.total_queries, 4);
        assert_eq!(summary.local_queries, 3);
        assert_eq!(summary.local_appearances, 2);
        assert!((summary.local_rate - 66.666).abs() < 0.01);
    }

    #[test]
    fn test_matrix_axes_sorted_and_best_position_wins() {
        let records = vec![
            record("plumber", "Dallas, TX", TargetPosition::NotOnPageOne),
            record("electrician", "Austin, TX", TargetPosition::Ranked(4)),
            record("electrician", "Austin, TX", TargetPosition::Ranked(2)),
            record("electrician", "Austin, TX", TargetPosition::NotOnPageOne),
        ];
        let matrix = ranking_matrix(&records);

        assert_eq!(matrix.keywords, vec!["electrician", "plumber"]);
        assert_eq!(matrix.locations, vec!["Austin, TX", "Dallas, TX"]);
        assert_eq!(
            matrix.get("Austin, TX", "electrician"),
            Some(TargetPosition::Ranked(2))
        );
        assert_eq!(
            matrix.get("Dallas, TX", "plumber"),
            Some(TargetPosition::NotOnPageOne)
        );
        assert_eq!(matrix.get("Dallas, TX", "electrician"), None);
    }

    #[test]
    fn test_competitors_sorted_by_keyword_location_rank() {
        let records = vec![
            record("plumber", "Dallas, TX", TargetPosition::Ranked(2)),
            record("electrician", "Austin, TX", TargetPosition::Ranked(2)),
        ];
        let rows = competitors(&records);

        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].keyword, "electrician");
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[0].domain, "rival.com");
        assert_eq!(rows[1].rank, 2);
        assert_eq!(rows[3].keyword, "plumber");
    }

    #[test]
    fn test_aggregate_is_order_independent() {
        let mut records = vec![
            record("plumber", "Austin, TX", TargetPosition::Ranked(2)),
            record("plumber", "Dallas, TX", TargetPosition::NotOnPageOne),
            record("electrician", "Austin, TX", TargetPosition::Ranked(1)),
        ];
        let forward = aggregate(&records, "acme.com");
        records.reverse();
        let reversed = aggregate(&records, "acme.com");

        assert_eq!(forward, reversed);
        assert_eq!(forward, aggregate(&records, "acme.com"));
    }
}
