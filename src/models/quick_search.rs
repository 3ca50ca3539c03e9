// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use reqwest::Url;
use serde::Serialize;

use super::crash_id::CrashId;
use super::navigation::ProductVersion;
use super::params::{ParamValue, QueryType, RawParams};
use crate::sources::ReportSource;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    Exact,
    Prefix,
}

impl MatchMode {
    pub fn query_type(self) -> QueryType {
        match self {
            MatchMode::Exact => QueryType::Exact,
            MatchMode::Prefix => QueryType::StartsWith,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum QuickSearchDecision {
    RedirectToCrash {
        id: CrashId,
    },
    RedirectToSignatureSearch {
        term: String,
        match_mode: MatchMode,
        scope: ProductVersion,
    },
}

impl QuickSearchDecision {
    fn follow_up_pairs(&self) -> Option<Vec<(&'static str, String)>> {
        let QuickSearchDecision::RedirectToSignatureSearch { term, match_mode, scope } = self else {
            return None;
        };
        let mut pairs = vec![
            ("do_query", "1".to_string()),
            ("product", scope.product.clone()),
        ];
        if let Some(version) = scope.version_param() {
            pairs.push(("version", version));
        }
        pairs.push(("query_search", "signature".to_string()));
        pairs.push(("query_type", match_mode.query_type().as_str().to_string()));
        pairs.push(("query", term.clone()));
        Some(pairs)
    }

    /// Advanced-search request for a signature decision, ready to normalize.
    pub fn follow_up_params(&self) -> Option<RawParams> {
        let pairs = self.follow_up_pairs()?;
        Some(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), ParamValue::One(v)))
                .collect(),
        )
    }

    /// Where a web front end would send the user, relative to `site_root`.
    pub fn redirect_url(&self, site_root: &str) -> Result<Url> {
        let mut base = Url::parse(site_root)
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", site_root, e)))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let target = match self {
            QuickSearchDecision::RedirectToCrash { id } => format!("report/index/{}", id),
            QuickSearchDecision::RedirectToSignatureSearch { .. } => "query/query".to_string(),
        };
        let mut url = base
            .join(&target)
            .map_err(|e| Error::InvalidUrl(format!("{}{}: {}", base, target, e)))?;

        if let Some(pairs) = self.follow_up_pairs() {
            let mut query = url.query_pairs_mut();
            for (key, value) in &pairs {
                query.append_pair(key, value);
            }
        }
        Ok(url)
    }
}

/// Decides between a crash lookup and a signature search for one free-text
/// term. A term that parses as a crash ID never reaches `index`.
pub fn resolve_quick_search<P, S>(
    term: &str,
    parse_crash_id: P,
    index: &S,
    current: &ProductVersion,
) -> Result<QuickSearchDecision>
where
    P: Fn(&str) -> Option<CrashId>,
    S: ReportSource + ?Sized,
{
    let term = term.trim();
    if term.is_empty() {
        return Err(Error::EmptyTerm);
    }

    if let Some(id) = parse_crash_id(term) {
        return Ok(QuickSearchDecision::RedirectToCrash { id });
    }

    let exists = index
        .signature_exists(term, current)
        .map_err(Error::query_failed)?;
    let match_mode = if exists { MatchMode::Exact } else { MatchMode::Prefix };
    tracing::debug!(term, ?match_mode, product = %current.product, "quick search resolved to signature search");

    Ok(QuickSearchDecision::RedirectToSignatureSearch {
        term: term.to_string(),
        match_mode,
        scope: current.clone(),
    })
}
