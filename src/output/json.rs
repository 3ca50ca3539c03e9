use reqwest::Url;

use crate::Result;
use crate::models::QuickSearchDecision;
use crate::pipeline::QueryResults;

pub fn format_query_results(results: &QueryResults) -> Result<String> {
    Ok(serde_json::to_string_pretty(results)?)
}

pub fn format_quick_search(decision: &QuickSearchDecision, url: &Url) -> Result<String> {
    let result = serde_json::json!({
        "decision": decision,
        "url": url.as_str(),
    });
    Ok(serde_json::to_string_pretty(&result)?)
}
