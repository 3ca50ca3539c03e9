// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use serde::{Deserialize, Serialize};

use super::params::SearchParams;

/// A product and, optionally, one of its versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVersion {
    pub product: String,
    #[serde(default)]
    pub version: Option<String>,
}

impl ProductVersion {
    pub fn new(product: impl Into<String>, version: Option<String>) -> Self {
        Self {
            product: product.into(),
            version,
        }
    }

    /// The `product:version` form used by the `version` search option.
    pub fn version_param(&self) -> Option<String> {
        self.version
            .as_ref()
            .map(|v| format!("{}:{}", self.product, v))
    }
}

/// Reads the navigation selection out of the first `version` entry when it
/// has the `product:version` shape. Anything else yields `None`.
pub fn parse_navigation_version(params: &SearchParams) -> Option<ProductVersion> {
    let first = params.version.first()?;
    if first.matches(':').count() != 1 {
        return None;
    }
    let (product, version) = first.split_once(':')?;
    Some(ProductVersion::new(product.trim(), Some(version.trim().to_string())))
}
