// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::auth::{KeychainSession, is_admin};
use crate::models::{
    ParamValue, ProductVersion, RawParams, RequestContext, SearchParams, normalize,
    parse_navigation_version, parse_pairs,
};
use crate::output::{OutputFormat, compact, json, markdown};
use crate::pipeline::{QueryResults, run_query};
use crate::sources::SessionState;
use crate::state::ChosenVersionStore;
use crate::{Config, Result};

/// Normalizes a request, falling back to the saved product when none is given.
pub fn build_params<S: SessionState + ?Sized>(
    raw: &RawParams,
    chosen: Option<&ProductVersion>,
    config: &Config,
    session: &S,
) -> SearchParams {
    let fallback = chosen
        .map(|c| c.product.clone())
        .unwrap_or_else(|| config.default_product.clone());
    let ctx = RequestContext::for_request(raw, fallback, is_admin(config.auth_active, session));
    normalize(raw, &SearchParams::default(), &ctx)
}

/// Saves the `product:version` selection carried by the request, if any.
pub fn update_navigation(params: &SearchParams, store: Option<&ChosenVersionStore>) -> Option<ProductVersion> {
    let Some(chosen) = parse_navigation_version(params) else {
        tracing::debug!("no product:version in params, navigation unchanged");
        return None;
    };
    if let Some(store) = store {
        store.save(&chosen);
    }
    Some(chosen)
}

pub fn render(results: &QueryResults, config: &Config, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Compact => compact::format_query_results(results),
        OutputFormat::Json => json::format_query_results(results)?,
        OutputFormat::Markdown => markdown::format_query_results(results, &config.bug_url),
    })
}

pub fn execute(config: &Config, pairs: &[String], run: bool, format: OutputFormat) -> Result<()> {
    let mut raw = parse_pairs(pairs);
    if run {
        raw.insert("do_query".to_string(), ParamValue::One("1".to_string()));
    }

    let store = ChosenVersionStore::open_default();
    let chosen = store.as_ref().and_then(ChosenVersionStore::load);
    let params = build_params(&raw, chosen.as_ref(), config, &KeychainSession);
    update_navigation(&params, store.as_ref());

    let client = config.client();
    let results = run_query(params, &client, &client, config.on_bug_lookup_failure)?;

    print!("{}", render(&results, config, format)?);
    Ok(())
}
