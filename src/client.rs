// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::models::{
    BugAssociation, BugsResponse, HangType, PluginField, ProcessType, ProductVersion, QuerySearch,
    QueryType, RawReport, SIGNATURE_AGGREGATIONS, SearchParams, SearchResponse,
};
use crate::sources::{BugLookup, ReportSource};
use crate::{Error, Result, auth};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;

pub const DEFAULT_FACETS_SIZE: usize = 100;

const WIRE_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub struct SocorroClient {
    base_url: String,
    client: Client,
    facets_size: usize,
}

impl SocorroClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
            facets_size: DEFAULT_FACETS_SIZE,
        }
    }

    /// Number of signatures a top-signatures query returns.
    pub fn with_facets_size(mut self, facets_size: usize) -> Self {
        self.facets_size = facets_size.max(1);
        self
    }

    fn get_auth_header(&self) -> Option<String> {
        auth::get_token()
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}/", self.base_url, endpoint)
    }

    fn get_json<T: DeserializeOwned>(&self, endpoint: &str, query: Vec<(&str, String)>) -> Result<T> {
        let url = self.endpoint_url(endpoint);
        let mut request = self.client.get(&url);
        for (key, value) in query {
            request = request.query(&[(key, value)]);
        }

        if let Some(token) = self.get_auth_header() {
            request = request.header("Auth-Token", token);
        }

        tracing::debug!(url = %url, "sending request");
        let response = request.send()?;

        match response.status() {
            StatusCode::OK => {
                let text = response.text()?;
                serde_json::from_str(&text).map_err(|e| {
                    let head: String = text.chars().take(200).collect();
                    Error::ParseError(format!("{}: {}", e, head))
                })
            }
            StatusCode::TOO_MANY_REQUESTS => Err(Error::RateLimited),
            status => match response.error_for_status() {
                Err(e) => Err(Error::Http(e)),
                Ok(_) => Err(Error::ParseError(format!("unexpected status {} from {}", status, url))),
            },
        }
    }

    pub fn search(&self, query: Vec<(&str, String)>) -> Result<SearchResponse> {
        self.get_json("SuperSearch", query)
    }

    pub fn bugs(&self, signatures: &[String]) -> Result<BugsResponse> {
        let query = signatures
            .iter()
            .map(|s| ("signatures", s.clone()))
            .collect();
        self.get_json("Bugs", query)
    }
}

impl ReportSource for SocorroClient {
    fn fetch_top_signatures(&self, params: &SearchParams) -> Result<Vec<RawReport>> {
        let response = self.search(top_signatures_query(params, self.facets_size))?;
        Ok(response.top_signatures())
    }

    fn signature_exists(&self, term: &str, scope: &ProductVersion) -> Result<bool> {
        let response = self.search(signature_exists_query(term, scope))?;
        Ok(response.total > 0)
    }
}

impl BugLookup for SocorroClient {
    fn bugs_for_signatures(&self, signatures: &[String]) -> Result<Vec<BugAssociation>> {
        Ok(self.bugs(signatures)?.hits)
    }
}

fn operator(query_type: QueryType) -> &'static str {
    match query_type {
        QueryType::Exact => "=",
        QueryType::Contains | QueryType::Simple => "~",
        QueryType::StartsWith => "^",
    }
}

/// `product:version` entries carry the product too; the API wants the version alone.
fn wire_version(version: &str) -> &str {
    version.split_once(':').map(|(_, v)| v).unwrap_or(version)
}

fn wire_platform(platform: &str) -> &str {
    match platform {
        "win" => "Windows",
        "mac" => "Mac OS X",
        "lin" => "Linux",
        other => other,
    }
}

/// SuperSearch parameters for a top-signatures aggregation.
pub fn top_signatures_query(params: &SearchParams, facets_size: usize) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("_results_number", "0".to_string()),
        ("_facets", "signature".to_string()),
        ("_facets_size", facets_size.to_string()),
    ];
    for agg in SIGNATURE_AGGREGATIONS {
        query.push(("_aggs.signature", agg.to_string()));
    }

    for product in &params.product {
        query.push(("product", product.clone()));
    }
    for version in &params.version {
        query.push(("version", wire_version(version).to_string()));
    }
    for platform in &params.platform {
        query.push(("platform", wire_platform(platform).to_string()));
    }

    if !params.query.is_empty() {
        let field = match params.query_search {
            QuerySearch::Signature => "signature",
            QuerySearch::Stack => "proto_signature",
        };
        query.push((field, format!("{}{}", operator(params.query_type), params.query)));
    }

    if !params.signature.is_empty() {
        query.push(("signature", format!("={}", params.signature)));
    }

    match params.missing_sig.as_str() {
        "##null##" => query.push(("signature", "__null__".to_string())),
        "##empty##" => query.push(("signature", "=".to_string())),
        _ => {}
    }

    if let Some(end) = params.end_date() {
        query.push(("date", format!("<{}", end.format(WIRE_DATE_FORMAT))));
        let start = params
            .range_unit
            .duration(params.range_value)
            .and_then(|window| end.checked_sub_signed(window));
        match start {
            Some(start) => query.push(("date", format!(">={}", start.format(WIRE_DATE_FORMAT)))),
            None => tracing::debug!(
                range_value = params.range_value,
                range_unit = params.range_unit.as_str(),
                "search window out of range, omitting lower date bound"
            ),
        }
    }

    match params.hang_type {
        HangType::Any => {}
        HangType::Crash => query.push(("hang_type", "0".to_string())),
        HangType::Hang => query.push(("hang_type", "!0".to_string())),
    }

    match params.process_type {
        ProcessType::Any => {}
        ProcessType::Browser => query.push(("process_type", "parent".to_string())),
        ProcessType::Plugin => {
            query.push(("process_type", "plugin".to_string()));
            if !params.plugin_query.is_empty() {
                let field = match params.plugin_field {
                    PluginField::Filename => "plugin_filename",
                    PluginField::Name => "plugin_name",
                };
                query.push((field, format!("{}{}", operator(params.plugin_query_type), params.plugin_query)));
            }
        }
        ProcessType::Content => query.push(("process_type", "content".to_string())),
    }

    query
}

/// SuperSearch parameters counting reports with exactly this signature.
pub fn signature_exists_query(term: &str, scope: &ProductVersion) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("signature", format!("={}", term)),
        ("product", scope.product.clone()),
    ];
    if let Some(version) = &scope.version {
        query.push(("version", version.clone()));
    }
    query.push(("_results_number", "0".to_string()));
    query
}
