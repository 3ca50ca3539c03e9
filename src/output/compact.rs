use reqwest::Url;

use crate::models::{ClassifiedReport, MatchMode, QuickSearchDecision, ResultSetFlags, SearchParams};
use crate::pipeline::QueryResults;

fn format_scope(params: &SearchParams) -> String {
    let mut parts = vec![format!("product={}", params.product.join(","))];
    if !params.version.is_empty() {
        parts.push(format!("version={}", params.version.join(",")));
    }
    if !params.platform.is_empty() {
        parts.push(format!("platform={}", params.platform.join(",")));
    }
    parts.push(format!(
        "window={} {} to {}",
        params.range_value,
        params.range_unit.as_str(),
        params.date
    ));
    parts.join(" ")
}

fn format_markers(report: &ClassifiedReport) -> String {
    let mut markers = String::new();
    if report.is_hang {
        markers.push_str(" [hang]");
    }
    if report.is_plugin {
        markers.push_str(" [plugin]");
    }
    if let Some(code) = report.missing_sig_reason.param_code() {
        markers.push_str(&format!(" missing_sig={}", code));
    }
    markers
}

fn format_plugin(report: &ClassifiedReport, flags: ResultSetFlags) -> Option<String> {
    let mut parts = Vec::new();
    if flags.show_plugin_name {
        let name = report.report.pluginname.as_deref().unwrap_or("");
        let version = report.report.pluginversion.as_deref().unwrap_or("");
        let label = format!("{} {}", name, version).trim().to_string();
        if !label.is_empty() {
            parts.push(label);
        }
    }
    if flags.show_plugin_filename {
        if let Some(filename) = report.report.pluginfilename.as_deref().filter(|f| !f.is_empty()) {
            parts.push(format!("({})", filename));
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

pub fn format_query_results(results: &QueryResults) -> String {
    let mut output = String::new();
    let params = &results.params;

    output.push_str(&format!("QUERY {}\n", format_scope(params)));
    if !params.query.is_empty() {
        output.push_str(&format!(
            "search: {} {} \"{}\"\n",
            params.query_search.as_str(),
            params.query_type.as_str(),
            params.query
        ));
    }
    if params.admin {
        output.push_str("admin: yes\n");
    }

    if !results.executed() {
        output.push_str("NOT RUN (pass do_query=1 or --run)\n");
        return output;
    }

    output.push_str(&format!("FOUND {} signatures\n\n", results.reports.len()));

    for (rank, report) in results.reports.iter().enumerate() {
        let bugs = results.sig2bugs.bugs_for(&report.display_signature);
        let bugs_str = if bugs.is_empty() || report.missing_sig_reason.needs_help() {
            String::new()
        } else {
            let ids: Vec<String> = bugs.iter().map(|id| id.to_string()).collect();
            format!(" | bugs: {}", ids.join(", "))
        };
        output.push_str(&format!(
            "{}. {} | {}{}{}\n",
            rank + 1,
            report.report.count,
            report.display_signature,
            format_markers(report),
            bugs_str
        ));
        if let Some(plugin) = format_plugin(report, results.flags) {
            output.push_str(&format!("   plugin: {}\n", plugin));
        }
    }

    if results.bugs_unavailable {
        output.push_str("\nbugs: unavailable (bug tracker lookup failed)\n");
    }

    output
}

pub fn format_quick_search(decision: &QuickSearchDecision, url: &Url) -> String {
    let mut output = String::new();
    match decision {
        QuickSearchDecision::RedirectToCrash { id } => {
            output.push_str(&format!("CRASH {}\n", id));
        }
        QuickSearchDecision::RedirectToSignatureSearch { term, match_mode, scope } => {
            let mode = match match_mode {
                MatchMode::Exact => "exact",
                MatchMode::Prefix => "prefix",
            };
            let version = scope.version.as_deref().map(|v| format!(" {}", v)).unwrap_or_default();
            output.push_str(&format!(
                "SIGNATURE SEARCH {} \"{}\" in {}{}\n",
                mode, term, scope.product, version
            ));
        }
    }
    output.push_str(&format!("url: {}\n", url));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        DoQuery, MissingSignature, ProductVersion, RawReport, SignatureBugMap, classify,
        parse_crash_id,
    };

    fn results(rows: Vec<RawReport>, executed: bool) -> QueryResults {
        let classification = classify(rows);
        QueryResults {
            params: SearchParams {
                product: vec!["Firefox".to_string()],
                version: vec!["Firefox:52.0".to_string()],
                date: "10/16/2026 09:05:03".to_string(),
                do_query: if executed { DoQuery::Execute } else { DoQuery::Skip },
                ..Default::default()
            },
            reports: classification.reports,
            flags: classification.flags,
            sig2bugs: SignatureBugMap::default(),
            bugs_unavailable: false,
        }
    }

    fn row(signature: Option<&str>) -> RawReport {
        RawReport {
            signature: signature.map(str::to_string),
            count: 42,
            ..Default::default()
        }
    }

    #[test]
    fn test_header() {
        let output = format_query_results(&results(vec![], true));
        assert!(output.contains("QUERY product=Firefox version=Firefox:52.0 window=1 weeks to 10/16/2026 09:05:03"));
        assert!(output.contains("FOUND 0 signatures"));
    }

    #[test]
    fn test_not_run() {
        let output = format_query_results(&results(vec![row(Some("a"))], false));
        assert!(output.contains("NOT RUN"));
        assert!(!output.contains("FOUND"));
    }

    #[test]
    fn test_rows_with_markers() {
        let mut hang = row(Some("mozilla::Foo"));
        hang.numhang = 1;
        hang.numplugin = 1;
        let output = format_query_results(&results(vec![hang, row(None)], true));
        assert!(output.contains("1. 42 | mozilla::Foo [hang] [plugin]"));
        assert!(output.contains("2. 42 | (null signature) missing_sig=##null##"));
    }

    #[test]
    fn test_plugin_line_only_when_flagged() {
        let mut plugin = row(Some("a"));
        plugin.pluginname = Some("Shockwave Flash".to_string());
        plugin.pluginversion = Some("10.1".to_string());
        plugin.pluginfilename = Some("NPSWF32.dll".to_string());
        let output = format_query_results(&results(vec![plugin], true));
        assert!(output.contains("   plugin: Shockwave Flash 10.1 (NPSWF32.dll)"));

        let output = format_query_results(&results(vec![row(Some("a"))], true));
        assert!(!output.contains("plugin:"));
    }

    #[test]
    fn test_bugs_unavailable() {
        let mut r = results(vec![row(Some("a"))], true);
        r.bugs_unavailable = true;
        assert!(format_query_results(&r).contains("bugs: unavailable"));
    }

    #[test]
    fn test_missing_reason_has_code() {
        let r = results(vec![row(Some(""))], true);
        assert_eq!(r.reports[0].missing_sig_reason, MissingSignature::EmptySignature);
        assert!(format_query_results(&r).contains("(empty signature) missing_sig=##empty##"));
    }

    #[test]
    fn test_quick_search_crash() {
        let decision = QuickSearchDecision::RedirectToCrash {
            id: parse_crash_id("247653e8-7a18-4836-97d1-42a720260120").unwrap(),
        };
        let url = decision.redirect_url("https://crash-stats.mozilla.org/").unwrap();
        let output = format_quick_search(&decision, &url);
        assert!(output.contains("CRASH 247653e8-7a18-4836-97d1-42a720260120"));
        assert!(output.contains("url: https://crash-stats.mozilla.org/report/index/"));
    }

    #[test]
    fn test_quick_search_signature() {
        let decision = QuickSearchDecision::RedirectToSignatureSearch {
            term: "foo".to_string(),
            match_mode: MatchMode::Prefix,
            scope: ProductVersion::new("Firefox", Some("52.0".to_string())),
        };
        let url = decision.redirect_url("https://crash-stats.mozilla.org/").unwrap();
        let output = format_quick_search(&decision, &url);
        assert!(output.contains("SIGNATURE SEARCH prefix \"foo\" in Firefox 52.0"));
    }
}
