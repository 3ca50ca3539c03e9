// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::common::deserialize_term;
use super::reports::RawReport;

/// Sub-aggregations requested under each signature bucket.
pub const SIGNATURE_AGGREGATIONS: &[&str] = &[
    "hang_type",
    "process_type",
    "plugin_name",
    "plugin_version",
    "plugin_filename",
];

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub total: u64,
    #[serde(default)]
    pub facets: HashMap<String, Vec<FacetBucket>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FacetBucket {
    /// `None` when the server reports a `null` term.
    #[serde(default, deserialize_with = "deserialize_term")]
    pub term: Option<String>,
    pub count: u64,
    #[serde(default)]
    pub facets: HashMap<String, Vec<FacetBucket>>,
}

impl FacetBucket {
    fn sub(&self, field: &str) -> &[FacetBucket] {
        self.facets.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    fn top_term(&self, field: &str) -> Option<String> {
        self.sub(field)
            .iter()
            .filter_map(|b| b.term.as_deref())
            .find(|t| !t.is_empty())
            .map(str::to_string)
    }

    /// Reports whose `hang_type` is anything but 0 were hangs.
    fn hang_count(&self) -> u64 {
        self.sub("hang_type")
            .iter()
            .filter(|b| b.term.as_deref().is_some_and(|t| t != "0"))
            .map(|b| b.count)
            .sum()
    }

    fn plugin_count(&self) -> u64 {
        self.sub("process_type")
            .iter()
            .filter(|b| b.term.as_deref().is_some_and(|t| t.eq_ignore_ascii_case("plugin")))
            .map(|b| b.count)
            .sum()
    }

    pub fn to_raw_report(&self) -> RawReport {
        RawReport {
            signature: self.term.clone(),
            count: self.count,
            numhang: self.hang_count(),
            numplugin: self.plugin_count(),
            pluginname: self.top_term("plugin_name"),
            pluginversion: self.top_term("plugin_version"),
            pluginfilename: self.top_term("plugin_filename"),
        }
    }
}

impl SearchResponse {
    /// Signature buckets as report rows, in the order the server ranked them.
    pub fn top_signatures(&self) -> Vec<RawReport> {
        self.facets
            .get("signature")
            .map(|buckets| buckets.iter().map(FacetBucket::to_raw_report).collect())
            .unwrap_or_default()
    }
}
