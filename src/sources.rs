// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Collaborators the core depends on but does not implement. All calls are
//! blocking; timeouts and retries belong to the implementor's transport.

use crate::Result;
use crate::models::{BugAssociation, ProductVersion, RawReport, SearchParams};

/// The crash report data store.
pub trait ReportSource {
    /// Aggregated top-signature rows for a normalized search, in rank order.
    fn fetch_top_signatures(&self, params: &SearchParams) -> Result<Vec<RawReport>>;

    /// Whether any report within `scope` has exactly this signature.
    fn signature_exists(&self, term: &str, scope: &ProductVersion) -> Result<bool>;
}

/// The bug tracker.
pub trait BugLookup {
    /// Raw signature/bug association rows for the given signatures.
    fn bugs_for_signatures(&self, signatures: &[String]) -> Result<Vec<BugAssociation>>;
}

pub trait SessionState {
    fn is_logged_in(&self) -> bool;
}
