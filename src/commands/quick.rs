// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use super::query;
use crate::auth::KeychainSession;
use crate::models::{ProductVersion, parse_crash_id, resolve_quick_search};
use crate::output::{OutputFormat, compact, json, markdown};
use crate::pipeline::run_query;
use crate::state::ChosenVersionStore;
use crate::{Config, Result};

/// The selection a quick search is scoped to. Flags beat the saved selection,
/// which beats the configured default product.
pub fn current_selection(
    product: Option<String>,
    version: Option<String>,
    chosen: Option<ProductVersion>,
    default_product: &str,
) -> ProductVersion {
    match (product, chosen) {
        (Some(product), _) => ProductVersion::new(product, version),
        (None, Some(chosen)) if version.is_some() => ProductVersion::new(chosen.product, version),
        (None, Some(chosen)) => chosen,
        (None, None) => ProductVersion::new(default_product, version),
    }
}

pub fn execute(
    config: &Config,
    term: &str,
    product: Option<String>,
    version: Option<String>,
    run: bool,
    format: OutputFormat,
) -> Result<()> {
    let chosen = ChosenVersionStore::open_default().and_then(|store| store.load());
    let current = current_selection(product, version, chosen, &config.default_product);

    let client = config.client();
    let decision = resolve_quick_search(term, parse_crash_id, &client, &current)?;

    if run {
        if let Some(raw) = decision.follow_up_params() {
            let params = query::build_params(&raw, None, config, &KeychainSession);
            let results = run_query(params, &client, &client, config.on_bug_lookup_failure)?;
            print!("{}", query::render(&results, config, format)?);
            return Ok(());
        }
    }

    let url = decision.redirect_url(&config.site_url)?;
    let output = match format {
        OutputFormat::Compact => compact::format_quick_search(&decision, &url),
        OutputFormat::Json => json::format_quick_search(&decision, &url)?,
        OutputFormat::Markdown => markdown::format_quick_search(&decision, &url),
    };

    print!("{}", output);
    Ok(())
}
