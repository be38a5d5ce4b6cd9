//! Report rendering.
//!
//! An [`AnalysisReport`] bundles the records of one run with their aggregate
//! and can be rendered as a standalone HTML page, a CSV table or JSON.

use crate::aggregate::{aggregate, Aggregate};
use crate::types::{QueryFailure, ResultRecord, TargetPosition};
use chrono::{DateTime, Local, NaiveDate, TimeZone};
use serde::Serialize;
use std::fmt::Write as _;

/// Default label used in report filenames.
pub const REPORT_LABEL: &str = "SEO_Analysis_Report";

/// The complete result of one analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// Normalized target domain
    pub target: String,
    pub generated_at: DateTime<Local>,
    pub records: Vec<ResultRecord>,
    /// Queries that failed and have no record
    pub failures: Vec<QueryFailure>,
    /// Locations removed by address validation
    pub dropped_locations: Vec<String>,
    #[serde(flatten)]
    pub aggregate: Aggregate,
}

impl AnalysisReport {
    /// Aggregate `records` for `target` and stamp the report with the current time.
    pub fn new(
        target: impl Into<String>,
        records: Vec<ResultRecord>,
        failures: Vec<QueryFailure>,
        dropped_locations: Vec<String>,
    ) -> Self {
        let target = target.into();
        let aggregate = aggregate(&records, &target);
        Self {
            target,
            generated_at: Local::now(),
            records,
            failures,
            dropped_locations,
            aggregate,
        }
    }
}

/// Build a report filename: `{clean_domain}_{label}_{YYYYMMDD}.{ext}`.
///
/// The domain loses every `/` and `:` and has its dots replaced by
/// underscores, so `acme.com` becomes `acme_com`.
pub fn report_filename(target: &str, label: &str, date: NaiveDate, ext: &str) -> String {
    let clean_domain: String = target
        .chars()
        .filter(|c| *c != '/' && *c != ':')
        .map(|c| if c == '.' { '_' } else { c })
        .collect();
    format!(
        "{}_{}_{}.{}",
        clean_domain,
        label,
        date.format("%Y%m%d"),
        ext
    )
}

/// Pretty-printed JSON of the whole report.
pub fn render_json(report: &AnalysisReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

/// One CSV row per record.
///
/// Columns: `keyword,location,target_position,top_organic_domains,top_local_titles`.
/// Multi-valued cells are joined with `; `.
pub fn render_csv(records: &[ResultRecord]) -> String {
    let mut out = String::from("keyword,location,target_position,top_organic_domains,top_local_titles\n");
    for record in records {
        let domains: Vec<&str> = record
            .organic_results
            .iter()
            .map(|r| r.domain.as_str())
            .collect();
        let titles: Vec<&str> = record
            .local_results
            .iter()
            .map(|l| l.title.as_str())
            .collect();

        let position = record.target_position.to_string();
        let domains = domains.join("; ");
        let titles = titles.join("; ");
        out.push_str(&csv_row(&[
            record.keyword.as_str(),
            record.location.as_str(),
            position.as_str(),
            domains.as_str(),
            titles.as_str(),
        ]));
        out.push('\n');
    }
    out
}

/// Join fields into one CSV line (no trailing newline), quoting where needed.
pub fn csv_row(fields: &[&str]) -> String {
    fields
        .iter()
        .map(|field| csv_field(field))
        .collect::<Vec<_>>()
        .join(",")
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// `2024-03-09 02:05:07 PM (UTC-06:00)`
fn format_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%Y-%m-%d %I:%M:%S %p (UTC%:z)").to_string()
}

/// Standalone HTML report with metric cards, the rankings overview and the
/// competitor tables.
pub fn render_html(report: &AnalysisReport) -> String {
    let summary = &report.aggregate.summary;
    let matrix = &report.aggregate.matrix;
    let mut html = String::with_capacity(8 * 1024);

    html.push_str(HTML_HEAD);
    html.push_str("<body>\n<div class=\"container\">\n");

    // write! into a String cannot fail
    let _ = write!(
        html,
        "<div class=\"header\">\n<h1>SEO Rankings Analysis Report</h1>\n<p>{}</p>\n<p>Generated on {}</p>\n</div>\n",
        escape_html(&report.target),
        format_timestamp(&report.generated_at)
    );

    html.push_str("<div class=\"metrics\">\n");
    metric_card(&mut html, "Total Queries", &summary.total_queries.to_string());
    metric_card(
        &mut html,
        "First Page Rankings",
        &summary.ranked_queries.to_string(),
    );
    metric_card(
        &mut html,
        "Ranking Rate",
        &format!("{:.1}%", summary.ranking_rate),
    );
    metric_card(
        &mut html,
        "Queries With Local Results",
        &summary.local_queries.to_string(),
    );
    metric_card(
        &mut html,
        "Local Pack Appearances",
        &summary.local_appearances.to_string(),
    );
    metric_card(&mut html, "Local Rate", &format!("{:.1}%", summary.local_rate));
    html.push_str("</div>\n");

    html.push_str("<div class=\"section-title\">Rankings Overview</div>\n<table>\n<thead>\n<tr><th>Location</th>");
    for keyword in &matrix.keywords {
        let _ = write!(html, "<th>{}</th>", escape_html(keyword));
    }
    html.push_str("</tr>\n</thead>\n<tbody>\n");
    for location in &matrix.locations {
        let _ = write!(
            html,
            "<tr><td class=\"location-cell\">{}</td>",
            escape_html(location)
        );
        for keyword in &matrix.keywords {
            html.push_str("<td style=\"text-align: center\">");
            match matrix.get(location, keyword) {
                None => html.push_str("<span style=\"color: #94a3b8\">-</span>"),
                Some(pos @ TargetPosition::Ranked(_)) => {
                    let _ = write!(html, "<span class=\"ranking-good\">{}</span>", pos);
                }
                Some(pos) => {
                    let _ = write!(html, "<span class=\"ranking-bad\">{}</span>", pos);
                }
            }
            html.push_str("</td>");
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>\n");

    html.push_str("<div class=\"section-title\">Top Competitors by Keyword</div>\n");
    for keyword in &matrix.keywords {
        let _ = write!(
            html,
            "<table class=\"competitors-table\">\n<thead>\n<tr><th colspan=\"3\">{}</th></tr>\n\
             <tr><th style=\"width: 80px\">Rank</th><th>Domain</th><th style=\"width: 120px\">Location</th></tr>\n\
             </thead>\n<tbody>\n",
            escape_html(keyword)
        );
        for row in report
            .aggregate
            .competitors
            .iter()
            .filter(|row| &row.keyword == keyword)
        {
            let _ = writeln!(
                html,
                "<tr><td class=\"competitor-rank\">#{}</td><td>{}</td><td>{}</td></tr>",
                row.rank,
                escape_html(&row.domain),
                escape_html(&row.location)
            );
        }
        html.push_str("</tbody>\n</table>\n");
    }

    html.push_str("</div>\n</body>\n</html>\n");
    html
}

fn metric_card(html: &mut String, title: &str, value: &str) {
    let _ = writeln!(
        html,
        "<div class=\"metric-card\"><h3>{}</h3><div class=\"metric-value\">{}</div></div>",
        title,
        escape_html(value)
    );
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const HTML_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>SEO Analysis Report</title>
<style>
body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; line-height: 1.6; color: #333; margin: 0 auto; padding: 2rem; max-width: 800px; background-color: #f8fafc; }
.container { background: white; padding: 2rem; border-radius: 8px; box-shadow: 0 1px 3px rgba(0,0,0,0.1); }
.header { text-align: center; margin-bottom: 2rem; }
.header h1 { color: #1e3a8a; font-size: 24px; margin-bottom: 8px; }
.header p { color: #64748b; margin: 4px 0; }
.metrics { display: grid; grid-template-columns: repeat(3, 1fr); gap: 1rem; margin-bottom: 2rem; }
.metric-card { background: #f8fafc; padding: 1rem; border-radius: 6px; text-align: center; }
.metric-card h3 { font-size: 14px; color: #64748b; margin: 0 0 8px 0; }
.metric-value { font-size: 24px; font-weight: bold; color: #1e3a8a; }
.section-title { color: #1e3a8a; font-size: 18px; margin: 2rem 0 1rem 0; padding-bottom: 0.5rem; border-bottom: 2px solid #e2e8f0; }
table { width: 100%; border-collapse: collapse; margin: 1rem 0; font-size: 14px; background: white; }
th, td { padding: 8px 12px; border: 1px solid #e2e8f0; }
th { background: #f1f5f9; font-weight: 600; text-align: left; color: #1e293b; }
.location-cell { font-weight: 500; }
.ranking-good { color: #166534; background: #dcfce7; padding: 2px 6px; border-radius: 4px; font-weight: 500; }
.ranking-bad { color: #991b1b; background: #fee2e2; padding: 2px 6px; border-radius: 4px; font-weight: 500; }
.competitors-table { margin-top: 2rem; }
.competitor-rank { color: #64748b; font-weight: 500; text-align: center; width: 60px; }
</style>
</head>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LocalResult, OrganicResult};

    fn sample_records() -> Vec<ResultRecord> {
        vec![
            ResultRecord {
                keyword: "plumber".to_string(),
                location: "Austin, TX".to_string(),
                target_position: TargetPosition::Ranked(2),
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
                local_results: vec![LocalResult {
                    title: "Joe's \"Best\" Plumbing".to_string(),
                    rating: Some(4.7),
                    reviews: Some(88),
                    website: None,
                    link: None,
                }],
            },
            ResultRecord {
                keyword: "electrician".to_string(),
                location: "78701".to_string(),
                target_position: TargetPosition::NotOnPageOne,
                organic_results: Vec::new(),
                local_results: Vec::new(),
            },
        ]
    }

    #[test]
    fn test_report_filename_cleans_domain() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(
            report_filename("acme.com", REPORT_LABEL, date, "html"),
            "acme_com_SEO_Analysis_Report_20240309.html"
        );
        assert_eq!(
            report_filename("https://shop.acme.com/", "Rankings", date, "csv"),
            "httpsshop_acme_com_Rankings_20240309.csv"
        );
    }

    #[test]
    fn test_render_csv_quotes_fields() {
        let csv = render_csv(&sample_records());
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(
            lines[0],
            "keyword,location,target_position,top_organic_domains,top_local_titles"
        );
        assert_eq!(
            lines[1],
            "plumber,\"Austin, TX\",#2,rival.com; acme.com,\"Joe's \"\"Best\"\" Plumbing\""
        );
        assert_eq!(lines[2], "electrician,78701,Not on Page 1,,");
    }

    #[test]
    fn test_csv_row_quotes_only_when_needed() {
        assert_eq!(
            csv_row(&["water heater", "Austin, TX", "say \"hi\""]),
            "water heater,\"Austin, TX\",\"say \"\"hi\"\"\""
        );
    }

    #[test]
    fn test_timestamp_shows_utc_offset() {
        let offset = chrono::FixedOffset::west_opt(6 * 3600).unwrap();
        let at = offset.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(format_timestamp(&at), "2024-03-09 02:05:07 PM (UTC-06:00)");
    }

    #[test]
    fn test_render_html_sections() {
        let report = AnalysisReport::new("acme.com", sample_records(), Vec::new(), Vec::new());
        let html = render_html(&report);

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<p>acme.com</p>"));
        assert!(html.contains("Rankings Overview"));
        assert!(html.contains("Top Competitors by Keyword"));
        assert!(html.contains("<span class=\"ranking-good\">#2</span>"));
        assert!(html.contains("<span class=\"ranking-bad\">Not on Page 1</span>"));
        // Austin has no electrician record
        assert!(html.contains("<span style=\"color: #94a3b8\">-</span>"));
        assert!(html.contains("50.0%"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<a href=\"x\">&</a>"),
            "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_render_json_includes_summary() {
        let report = AnalysisReport::new("acme.com", sample_records(), Vec::new(), Vec::new());
        let json: serde_json::Value = serde_json::from_str(&render_json(&report).unwrap()).unwrap();

        assert_eq!(json["target"], "acme.com");
        assert_eq!(json["summary"]["total_queries"], 2);
        assert_eq!(json["records"][0]["target_position"], "#2");
        assert_eq!(json["matrix"]["cells"]["78701"]["electrician"], "Not on Page 1");
    }
}
