// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use clap::{ArgAction, Args};

use crate::client::{DEFAULT_FACETS_SIZE, SocorroClient};
use crate::pipeline::CorrelationPolicy;

pub const DEFAULT_API_URL: &str = "https://crash-stats.mozilla.org/api";
pub const DEFAULT_SITE_URL: &str = "https://crash-stats.mozilla.org/";
pub const DEFAULT_BUG_URL: &str = "https://bugzilla.mozilla.org/show_bug.cgi?id=";
pub const DEFAULT_PRODUCT: &str = "Firefox";

/// Runtime settings shared by every command.
#[derive(Debug, Clone, Args)]
pub struct Config {
    /// Base URL of the crash-stats API
    #[arg(long, env = "CRASHSTATS_API_URL", default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    /// Site root that redirect URLs are built under
    #[arg(long, env = "CRASHSTATS_SITE_URL", default_value = DEFAULT_SITE_URL, global = true)]
    pub site_url: String,

    /// Prefix that a bug ID is appended to when linking
    #[arg(long, env = "CRASHSTATS_BUG_URL", default_value = DEFAULT_BUG_URL, global = true)]
    pub bug_url: String,

    /// Whether a stored API token grants admin context
    #[arg(long, env = "CRASHSTATS_AUTH_ACTIVE", default_value_t = true, action = ArgAction::Set, global = true)]
    pub auth_active: bool,

    /// Product used when neither the request nor a saved selection names one
    #[arg(long, default_value = DEFAULT_PRODUCT, global = true)]
    pub default_product: String,

    /// What to do when the bug tracker cannot be reached
    #[arg(long, value_enum, default_value_t = CorrelationPolicy::Degrade, global = true)]
    pub on_bug_lookup_failure: CorrelationPolicy,

    /// Number of signatures returned by a search
    #[arg(long, default_value_t = DEFAULT_FACETS_SIZE, global = true)]
    pub facets_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            site_url: DEFAULT_SITE_URL.to_string(),
            bug_url: DEFAULT_BUG_URL.to_string(),
            auth_active: true,
            default_product: DEFAULT_PRODUCT.to_string(),
            on_bug_lookup_failure: CorrelationPolicy::Degrade,
            facets_size: DEFAULT_FACETS_SIZE,
        }
    }
}

impl Config {
    pub fn client(&self) -> SocorroClient {
        SocorroClient::new(self.api_url.clone()).with_facets_size(self.facets_size)
    }
}
