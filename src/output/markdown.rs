use reqwest::Url;

use crate::models::{MatchMode, QuickSearchDecision, bug_url};
use crate::pipeline::QueryResults;

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

pub fn format_query_results(results: &QueryResults, bug_url_prefix: &str) -> String {
    let mut output = String::new();
    let params = &results.params;

    output.push_str("# Search Results\n\n");
    output.push_str(&format!("- **Product:** {}\n", params.product.join(", ")));
    if !params.version.is_empty() {
        output.push_str(&format!("- **Version:** {}\n", params.version.join(", ")));
    }
    output.push_str(&format!(
        "- **Window:** {} {} ending {}\n",
        params.range_value,
        params.range_unit.as_str(),
        params.date
    ));
    if !params.query.is_empty() {
        output.push_str(&format!(
            "- **Search:** {} {} `{}`\n",
            params.query_search.as_str(),
            params.query_type.as_str(),
            params.query
        ));
    }
    output.push('\n');

    if !results.executed() {
        output.push_str("Query not run. Pass `do_query=1` or `--run`.\n");
        return output;
    }

    output.push_str(&format!("Found **{}** signatures\n\n", results.reports.len()));

    if !results.reports.is_empty() {
        let show_name = results.flags.show_plugin_name;
        let show_filename = results.flags.show_plugin_filename;

        output.push_str("| # | Count | Signature | Hang | Plugin |");
        if show_name {
            output.push_str(" Plugin Name |");
        }
        if show_filename {
            output.push_str(" Plugin Filename |");
        }
        output.push_str(" Bugs |\n");
        output.push_str("|---|-------|-----------|------|--------|");
        if show_name {
            output.push_str("-------------|");
        }
        if show_filename {
            output.push_str("-----------------|");
        }
        output.push_str("------|\n");

        for (rank, report) in results.reports.iter().enumerate() {
            let signature = if report.missing_sig_reason.needs_help() {
                format!("*{}*", report.display_signature)
            } else {
                format!("`{}`", escape_cell(&report.display_signature))
            };
            output.push_str(&format!(
                "| {} | {} | {} | {} | {} |",
                rank + 1,
                report.report.count,
                signature,
                if report.is_hang { "yes" } else { "" },
                if report.is_plugin { "yes" } else { "" },
            ));
            if show_name {
                let name = report.report.pluginname.as_deref().unwrap_or("");
                let version = report.report.pluginversion.as_deref().unwrap_or("");
                output.push_str(&format!(" {} |", escape_cell(format!("{} {}", name, version).trim())));
            }
            if show_filename {
                let filename = report.report.pluginfilename.as_deref().unwrap_or("");
                output.push_str(&format!(" {} |", escape_cell(filename)));
            }

            let links: Vec<String> = if report.missing_sig_reason.needs_help() {
                Vec::new()
            } else {
                results
                    .sig2bugs
                    .bugs_for(&report.display_signature)
                    .iter()
                    .map(|id| format!("[{}]({})", id, bug_url(bug_url_prefix, *id)))
                    .collect()
            };
            output.push_str(&format!(" {} |\n", links.join(" ")));
        }
        output.push('\n');
    }

    if results.bugs_unavailable {
        output.push_str("> Bug links unavailable: the bug tracker lookup failed.\n");
    }

    output
}

pub fn format_quick_search(decision: &QuickSearchDecision, url: &Url) -> String {
    let mut output = String::new();
    output.push_str("# Quick Search\n\n");
    match decision {
        QuickSearchDecision::RedirectToCrash { id } => {
            output.push_str(&format!("**Crash ID:** `{}`\n\n", id));
        }
        QuickSearchDecision::RedirectToSignatureSearch { term, match_mode, scope } => {
            let mode = match match_mode {
                MatchMode::Exact => "exact match",
                MatchMode::Prefix => "starts with",
            };
            output.push_str(&format!("**Signature:** `{}` ({})\n\n", term, mode));
            output.push_str(&format!("**Product:** {}", scope.product));
            if let Some(version) = &scope.version {
                output.push_str(&format!(" {}", version));
            }
            output.push_str("\n\n");
        }
    }
    output.push_str(&format!("[Open in crash-stats]({})\n", url));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BugAssociation, DoQuery, RawReport, SearchParams, classify, correlate};
    use crate::sources::BugLookup;

    struct OneBug;

    impl BugLookup for OneBug {
        fn bugs_for_signatures(&self, signatures: &[String]) -> crate::Result<Vec<BugAssociation>> {
            Ok(signatures
                .iter()
                .map(|s| BugAssociation { id: 1234, signature: s.clone() })
                .collect())
        }
    }

    fn results(rows: Vec<RawReport>) -> QueryResults {
        let classification = classify(rows);
        let sig2bugs = correlate(&classification.signatures, &OneBug).unwrap();
        QueryResults {
            params: SearchParams {
                product: vec!["Firefox".to_string()],
                date: "10/16/2026 09:05:03".to_string(),
                do_query: DoQuery::Execute,
                ..Default::default()
            },
            reports: classification.reports,
            flags: classification.flags,
            sig2bugs,
            bugs_unavailable: false,
        }
    }

    #[test]
    fn test_table_escapes_pipes_and_links_bugs() {
        let rows = vec![RawReport {
            signature: Some("OOM | small".to_string()),
            count: 7,
            ..Default::default()
        }];
        let output = format_query_results(&results(rows), "https://bugzilla.mozilla.org/show_bug.cgi?id=");
        assert!(output.contains("Found **1** signatures"));
        assert!(output.contains("`OOM \\| small`"));
        assert!(output.contains("[1234](https://bugzilla.mozilla.org/show_bug.cgi?id=1234)"));
        assert!(!output.contains("Plugin Name"));
    }

    #[test]
    fn test_plugin_columns_follow_flags() {
        let rows = vec![
            RawReport {
                signature: Some("a".to_string()),
                pluginfilename: Some("NPSWF32.dll".to_string()),
                ..Default::default()
            },
            RawReport::default(),
        ];
        let output = format_query_results(&results(rows), "");
        assert!(output.contains("Plugin Filename"));
        assert!(!output.contains("Plugin Name"));
        assert!(output.contains("*(null signature)*"));
    }

    #[test]
    fn test_not_run() {
        let mut r = results(vec![]);
        r.params.do_query = DoQuery::Skip;
        assert!(format_query_results(&r, "").contains("Query not run"));
    }
}
