// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::common::deserialize_id;
use crate::sources::BugLookup;
use crate::{Error, Result};

/// One signature/bug link as returned by the `Bugs` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BugAssociation {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: u64,
    pub signature: String,
}

#[derive(Debug, Deserialize)]
pub struct BugsResponse {
    pub hits: Vec<BugAssociation>,
    #[serde(default)]
    pub total: u64,
}

/// Bug IDs per signature. IDs keep the order the tracker returned them in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SignatureBugMap(BTreeMap<String, Vec<u64>>);

impl SignatureBugMap {
    pub fn bugs_for(&self, signature: &str) -> &[u64] {
        self.0.get(signature).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<u64>)> {
        self.0.iter()
    }

    fn from_associations(requested: &BTreeSet<&str>, rows: Vec<BugAssociation>) -> Self {
        let mut map: BTreeMap<String, Vec<u64>> = BTreeMap::new();
        for row in rows {
            if !requested.contains(row.signature.as_str()) {
                tracing::debug!(signature = %row.signature, "dropping bug association for unrequested signature");
                continue;
            }
            let ids = map.entry(row.signature).or_default();
            if !ids.contains(&row.id) {
                ids.push(row.id);
            }
        }
        SignatureBugMap(map)
    }
}

/// Link to a bug, given the tracker's URL prefix.
pub fn bug_url(base: &str, id: u64) -> String {
    format!("{}{}", base, id)
}

/// Maps signatures to bugs. An empty input never reaches the tracker; a
/// tracker failure comes back as [`Error::ExternalLookupFailed`].
pub fn correlate<L>(signatures: &[String], lookup: &L) -> Result<SignatureBugMap>
where
    L: BugLookup + ?Sized,
{
    let unique: BTreeSet<&str> = signatures.iter().map(String::as_str).collect();
    if unique.is_empty() {
        return Ok(SignatureBugMap::default());
    }

    let request: Vec<String> = unique.iter().map(|s| s.to_string()).collect();
    let rows = lookup
        .bugs_for_signatures(&request)
        .map_err(Error::external_lookup_failed)?;

    Ok(SignatureBugMap::from_associations(&unique, rows))
}
