// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use clap::ValueEnum;
use serde::Serialize;

use crate::models::{
    ClassifiedReport, DoQuery, ResultSetFlags, SearchParams, SignatureBugMap, classify, correlate,
};
use crate::sources::{BugLookup, ReportSource};
use crate::{Error, Result};

/// What to do when the bug tracker cannot be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CorrelationPolicy {
    /// Return results without bug links and flag them as unavailable
    #[default]
    Degrade,
    /// Fail the whole query
    Propagate,
}

#[derive(Debug, Serialize)]
pub struct QueryResults {
    pub params: SearchParams,
    pub reports: Vec<ClassifiedReport>,
    #[serde(flatten)]
    pub flags: ResultSetFlags,
    pub sig2bugs: SignatureBugMap,
    /// The lookup failed and `sig2bugs` is empty for that reason.
    pub bugs_unavailable: bool,
}

impl QueryResults {
    pub fn executed(&self) -> bool {
        self.params.do_query == DoQuery::Execute
    }
}

pub fn run_query<R, B>(
    params: SearchParams,
    source: &R,
    bugs: &B,
    policy: CorrelationPolicy,
) -> Result<QueryResults>
where
    R: ReportSource + ?Sized,
    B: BugLookup + ?Sized,
{
    if params.do_query == DoQuery::Skip {
        tracing::debug!("do_query not set, skipping report query");
        return Ok(QueryResults {
            params,
            reports: Vec::new(),
            flags: ResultSetFlags::default(),
            sig2bugs: SignatureBugMap::default(),
            bugs_unavailable: false,
        });
    }

    let rows = source
        .fetch_top_signatures(&params)
        .map_err(Error::query_failed)?;
    let classification = classify(rows);

    let (sig2bugs, bugs_unavailable) = match correlate(&classification.signatures, bugs) {
        Ok(map) => (map, false),
        Err(err) if policy == CorrelationPolicy::Degrade => {
            tracing::warn!(error = %err, "bug correlation unavailable, continuing without it");
            (SignatureBugMap::default(), true)
        }
        Err(err) => return Err(err),
    };

    tracing::info!(
        reports = classification.reports.len(),
        correlated = sig2bugs.len(),
        "query complete"
    );

    Ok(QueryResults {
        params,
        reports: classification.reports,
        flags: classification.flags,
        sig2bugs,
        bugs_unavailable,
    })
}
