// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Canonical format of the `date` option.
pub const SEARCH_DATE_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// Longest search window a request may ask for, in days. Longer windows
/// fall back to the default `range_value`.
pub const MAX_RANGE_DAYS: i64 = 3660;

/// A raw request value: a single string or a repeated key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    One(String),
    Many(Vec<String>),
}

impl ParamValue {
    pub fn first(&self) -> Option<&str> {
        match self {
            ParamValue::One(s) => Some(s),
            ParamValue::Many(v) => v.first().map(String::as_str),
        }
    }

    pub fn values(&self) -> &[String] {
        match self {
            ParamValue::One(s) => std::slice::from_ref(s),
            ParamValue::Many(v) => v,
        }
    }
}

pub type RawParams = BTreeMap<String, ParamValue>;

/// Builds raw params from `key=value` pairs. A repeated key becomes a list;
/// a pair without `=` is a key with an empty value.
pub fn parse_pairs<I, S>(pairs: I) -> RawParams
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut raw = RawParams::new();
    for pair in pairs {
        let pair = pair.as_ref();
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = key.trim().to_string();
        let value = value.to_string();
        match raw.remove(&key) {
            None => {
                raw.insert(key, ParamValue::One(value));
            }
            Some(ParamValue::One(prev)) => {
                raw.insert(key, ParamValue::Many(vec![prev, value]));
            }
            Some(ParamValue::Many(mut prev)) => {
                prev.push(value);
                raw.insert(key, ParamValue::Many(prev));
            }
        }
    }
    raw
}

/// Whether the search should be executed at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DoQuery {
    Execute,
    #[default]
    Skip,
}

impl DoQuery {
    pub fn from_param(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "0" | "false" | "no" | "off" => DoQuery::Skip,
            _ => DoQuery::Execute,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DoQuery::Execute => "1",
            DoQuery::Skip => "0",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuerySearch {
    #[default]
    Signature,
    Stack,
}

impl QuerySearch {
    pub fn from_param(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "signature" => Some(QuerySearch::Signature),
            "stack" => Some(QuerySearch::Stack),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QuerySearch::Signature => "signature",
            QuerySearch::Stack => "stack",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    Exact,
    #[default]
    Contains,
    StartsWith,
    Simple,
}

impl QueryType {
    pub fn from_param(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "exact" => Some(QueryType::Exact),
            "contains" => Some(QueryType::Contains),
            "startswith" => Some(QueryType::StartsWith),
            "simple" => Some(QueryType::Simple),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QueryType::Exact => "exact",
            QueryType::Contains => "contains",
            QueryType::StartsWith => "startswith",
            QueryType::Simple => "simple",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeUnit {
    Hours,
    Days,
    #[default]
    Weeks,
    Months,
}

impl RangeUnit {
    pub fn from_param(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "hours" => Some(RangeUnit::Hours),
            "days" => Some(RangeUnit::Days),
            "weeks" => Some(RangeUnit::Weeks),
            "months" => Some(RangeUnit::Months),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RangeUnit::Hours => "hours",
            RangeUnit::Days => "days",
            RangeUnit::Weeks => "weeks",
            RangeUnit::Months => "months",
        }
    }

    /// Length of `value` units, or `None` if it does not fit a `TimeDelta`.
    /// A month counts as 30 days.
    pub fn duration(self, value: u32) -> Option<TimeDelta> {
        let value = i64::from(value);
        match self {
            RangeUnit::Hours => TimeDelta::try_hours(value),
            RangeUnit::Days => TimeDelta::try_days(value),
            RangeUnit::Weeks => TimeDelta::try_weeks(value),
            RangeUnit::Months => value.checked_mul(30).and_then(TimeDelta::try_days),
        }
    }

    /// Whether `value` units stay within [`MAX_RANGE_DAYS`].
    pub fn fits_window(self, value: u32) -> bool {
        match (self.duration(value), TimeDelta::try_days(MAX_RANGE_DAYS)) {
            (Some(window), Some(max)) => window <= max,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HangType {
    #[default]
    Any,
    Crash,
    Hang,
}

impl HangType {
    pub fn from_param(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "any" => Some(HangType::Any),
            "crash" => Some(HangType::Crash),
            "hang" => Some(HangType::Hang),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HangType::Any => "any",
            HangType::Crash => "crash",
            HangType::Hang => "hang",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessType {
    #[default]
    Any,
    Browser,
    Plugin,
    Content,
}

impl ProcessType {
    pub fn from_param(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "any" => Some(ProcessType::Any),
            "browser" => Some(ProcessType::Browser),
            "plugin" => Some(ProcessType::Plugin),
            "content" => Some(ProcessType::Content),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProcessType::Any => "any",
            ProcessType::Browser => "browser",
            ProcessType::Plugin => "plugin",
            ProcessType::Content => "content",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginField {
    #[default]
    Filename,
    Name,
}

impl PluginField {
    pub fn from_param(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "filename" => Some(PluginField::Filename),
            "name" => Some(PluginField::Name),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PluginField::Filename => "filename",
            PluginField::Name => "name",
        }
    }
}

/// Normalized advanced-search options. `Default` holds the baseline value
/// of every recognized option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchParams {
    pub product: Vec<String>,
    pub version: Vec<String>,
    pub platform: Vec<String>,
    pub query_search: QuerySearch,
    pub query_type: QueryType,
    pub query: String,
    pub date: String,
    pub range_value: u32,
    pub range_unit: RangeUnit,
    pub hang_type: HangType,
    pub process_type: ProcessType,
    pub plugin_field: PluginField,
    pub plugin_query_type: QueryType,
    pub plugin_query: String,
    pub signature: String,
    pub missing_sig: String,
    pub do_query: DoQuery,
    pub admin: bool,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            product: Vec::new(),
            version: Vec::new(),
            platform: Vec::new(),
            query_search: QuerySearch::Signature,
            query_type: QueryType::Contains,
            query: String::new(),
            date: String::new(),
            range_value: 1,
            range_unit: RangeUnit::Weeks,
            hang_type: HangType::Any,
            process_type: ProcessType::Any,
            plugin_field: PluginField::Filename,
            plugin_query_type: QueryType::Exact,
            plugin_query: String::new(),
            signature: String::new(),
            missing_sig: String::new(),
            do_query: DoQuery::Skip,
            admin: false,
        }
    }
}

const RECOGNIZED_KEYS: &[&str] = &[
    "product",
    "version",
    "platform",
    "query_search",
    "query_type",
    "query",
    "date",
    "range_value",
    "range_unit",
    "hang_type",
    "process_type",
    "plugin_field",
    "plugin_query_type",
    "plugin_query",
    "signature",
    "missing_sig",
    "do_query",
    "admin",
];

impl SearchParams {
    /// Renders the params back into request form. Normalizing the result
    /// yields the same params.
    pub fn to_raw(&self) -> RawParams {
        let mut raw = RawParams::new();
        let mut one = |key: &str, value: &str| {
            raw.insert(key.to_string(), ParamValue::One(value.to_string()));
        };
        one("query_search", self.query_search.as_str());
        one("query_type", self.query_type.as_str());
        one("query", &self.query);
        one("date", &self.date);
        one("range_value", &self.range_value.to_string());
        one("range_unit", self.range_unit.as_str());
        one("hang_type", self.hang_type.as_str());
        one("process_type", self.process_type.as_str());
        one("plugin_field", self.plugin_field.as_str());
        one("plugin_query_type", self.plugin_query_type.as_str());
        one("plugin_query", &self.plugin_query);
        one("signature", &self.signature);
        one("missing_sig", &self.missing_sig);
        one("do_query", self.do_query.as_str());
        raw.insert("product".to_string(), ParamValue::Many(self.product.clone()));
        raw.insert("version".to_string(), ParamValue::Many(self.version.clone()));
        raw.insert("platform".to_string(), ParamValue::Many(self.platform.clone()));
        raw
    }

    /// End of the search window, from the canonical `date` option.
    pub fn end_date(&self) -> Option<NaiveDateTime> {
        parse_search_date(&self.date)
    }
}

/// Parses a `date` option in canonical form or as a bare `YYYY-MM-DD` day.
pub fn parse_search_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, SEARCH_DATE_FORMAT)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Request facts that do not come from the parameter map itself.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// The client sent a `product` key, as opposed to it being absent.
    pub explicit_product: bool,
    /// Product used when none was requested, usually the last chosen one.
    pub fallback_product: String,
    /// Auth is active and the session is logged in.
    pub admin: bool,
}

impl RequestContext {
    pub fn for_request(raw: &RawParams, fallback_product: impl Into<String>, admin: bool) -> Self {
        Self {
            explicit_product: raw.contains_key("product"),
            fallback_product: fallback_product.into(),
            admin,
        }
    }
}

/// Fills defaults and coerces every recognized option. Never fails:
/// malformed values fall back to `defaults`.
pub fn normalize(raw: &RawParams, defaults: &SearchParams, ctx: &RequestContext) -> SearchParams {
    normalize_at(raw, defaults, ctx, Utc::now())
}

/// [`normalize`] with an explicit clock for the `date` default.
pub fn normalize_at(
    raw: &RawParams,
    defaults: &SearchParams,
    ctx: &RequestContext,
    now: DateTime<Utc>,
) -> SearchParams {
    for key in raw.keys() {
        if !RECOGNIZED_KEYS.contains(&key.as_str()) {
            tracing::debug!(key = %key, "ignoring unrecognized search parameter");
        }
    }

    let list = |key: &str, default: &[String]| -> Vec<String> {
        match raw.get(key) {
            Some(value) => clean_list(value.values()),
            None => default.to_vec(),
        }
    };
    let text = |key: &str, default: &str| -> String {
        raw.get(key)
            .and_then(ParamValue::first)
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| default.to_string())
    };
    let choice = |key: &str| raw.get(key).and_then(ParamValue::first);

    let mut product = list("product", &defaults.product);
    if !ctx.explicit_product || product.is_empty() {
        product = vec![ctx.fallback_product.clone()];
    }

    let range_unit = choice("range_unit")
        .and_then(RangeUnit::from_param)
        .unwrap_or(defaults.range_unit);
    let range_value = choice("range_value")
        .and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|v| *v >= 1 && range_unit.fits_window(*v))
        .unwrap_or(defaults.range_value);

    let date = match choice("date").and_then(parse_search_date) {
        Some(parsed) => parsed.format(SEARCH_DATE_FORMAT).to_string(),
        None => match parse_search_date(&defaults.date) {
            Some(parsed) => parsed.format(SEARCH_DATE_FORMAT).to_string(),
            None => now.format(SEARCH_DATE_FORMAT).to_string(),
        },
    };

    SearchParams {
        product,
        version: list("version", &defaults.version),
        platform: list("platform", &defaults.platform),
        query_search: choice("query_search")
            .and_then(QuerySearch::from_param)
            .unwrap_or(defaults.query_search),
        query_type: choice("query_type")
            .and_then(QueryType::from_param)
            .unwrap_or(defaults.query_type),
        query: text("query", &defaults.query),
        date,
        range_value,
        range_unit,
        hang_type: choice("hang_type")
            .and_then(HangType::from_param)
            .unwrap_or(defaults.hang_type),
        process_type: choice("process_type")
            .and_then(ProcessType::from_param)
            .unwrap_or(defaults.process_type),
        plugin_field: choice("plugin_field")
            .and_then(PluginField::from_param)
            .unwrap_or(defaults.plugin_field),
        plugin_query_type: choice("plugin_query_type")
            .and_then(QueryType::from_param)
            .unwrap_or(defaults.plugin_query_type),
        plugin_query: text("plugin_query", &defaults.plugin_query),
        signature: choice("signature")
            .map(str::to_string)
            .unwrap_or_else(|| defaults.signature.clone()),
        missing_sig: text("missing_sig", &defaults.missing_sig),
        do_query: choice("do_query")
            .map(DoQuery::from_param)
            .unwrap_or(defaults.do_query),
        admin: ctx.admin,
    }
}

fn clean_list(values: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        let value = value.trim();
        if !value.is_empty() && !out.iter().any(|v| v == value) {
            out.push(value.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 9, 5, 3).unwrap()
    }

    fn ctx(raw: &RawParams) -> RequestContext {
        RequestContext::for_request(raw, "Firefox", false)
    }

    fn run(pairs: &[&str]) -> SearchParams {
        let raw = parse_pairs(pairs.iter().copied());
        normalize_at(&raw, &SearchParams::default(), &ctx(&raw), fixed_now())
    }

    #[test]
    fn test_parse_pairs_repeated_keys() {
        let raw = parse_pairs(["product=Firefox", "product=Thunderbird", "query=foo", "do_query"]);
        assert_eq!(
            raw.get("product"),
            Some(&ParamValue::Many(vec!["Firefox".to_string(), "Thunderbird".to_string()]))
        );
        assert_eq!(raw.get("query"), Some(&ParamValue::One("foo".to_string())));
        assert_eq!(raw.get("do_query"), Some(&ParamValue::One(String::new())));
    }

    #[test]
    fn test_parse_pairs_keeps_equals_in_value() {
        let raw = parse_pairs(["query=a=b"]);
        assert_eq!(raw.get("query").and_then(ParamValue::first), Some("a=b"));
    }

    #[test]
    fn test_missing_product_uses_fallback() {
        let params = run(&["query=foo"]);
        assert_eq!(params.product, vec!["Firefox".to_string()]);
    }

    #[test]
    fn test_explicit_empty_product_uses_fallback() {
        let params = run(&["product="]);
        assert_eq!(params.product, vec!["Firefox".to_string()]);
    }

    #[test]
    fn test_product_present_in_map_but_not_in_request() {
        let raw = parse_pairs(["product=Thunderbird"]);
        let ctx = RequestContext {
            explicit_product: false,
            fallback_product: "Firefox".to_string(),
            admin: false,
        };
        let params = normalize_at(&raw, &SearchParams::default(), &ctx, fixed_now());
        assert_eq!(params.product, vec!["Firefox".to_string()]);
    }

    #[test]
    fn test_explicit_products_are_kept_in_order() {
        let params = run(&["product= Thunderbird ", "product=Firefox", "product=Thunderbird"]);
        assert_eq!(params.product, vec!["Thunderbird".to_string(), "Firefox".to_string()]);
    }

    #[test]
    fn test_admin_comes_from_context() {
        let raw = parse_pairs(["admin=1"]);
        let params = normalize_at(&raw, &SearchParams::default(), &ctx(&raw), fixed_now());
        assert!(!params.admin);

        let admin_ctx = RequestContext::for_request(&raw, "Firefox", true);
        let params = normalize_at(&raw, &SearchParams::default(), &admin_ctx, fixed_now());
        assert!(params.admin);
    }

    #[test]
    fn test_defaults_for_all_options() {
        let params = run(&[]);
        let defaults = SearchParams::default();
        assert_eq!(params.query_search, defaults.query_search);
        assert_eq!(params.query_type, QueryType::Contains);
        assert_eq!(params.range_value, 1);
        assert_eq!(params.range_unit, RangeUnit::Weeks);
        assert_eq!(params.hang_type, HangType::Any);
        assert_eq!(params.process_type, ProcessType::Any);
        assert_eq!(params.do_query, DoQuery::Skip);
        assert!(params.version.is_empty());
    }

    #[test]
    fn test_missing_date_is_now() {
        let params = run(&[]);
        assert_eq!(params.date, "10/16/2026 09:05:03");
    }

    #[test]
    fn test_iso_day_date_is_canonicalized() {
        let params = run(&["date=2026-01-02"]);
        assert_eq!(params.date, "01/02/2026 00:00:00");
    }

    #[test]
    fn test_malformed_date_degrades_to_now() {
        let params = run(&["date=yesterday-ish"]);
        assert_eq!(params.date, "10/16/2026 09:05:03");
    }

    #[test]
    fn test_invalid_enumerations_degrade_to_defaults() {
        let params = run(&["query_type=regex", "range_unit=fortnights", "hang_type=maybe", "range_value=-3"]);
        assert_eq!(params.query_type, QueryType::Contains);
        assert_eq!(params.range_unit, RangeUnit::Weeks);
        assert_eq!(params.hang_type, HangType::Any);
        assert_eq!(params.range_value, 1);
    }

    #[test]
    fn test_zero_range_value_degrades() {
        assert_eq!(run(&["range_value=0"]).range_value, 1);
        assert_eq!(run(&["range_value= 4 "]).range_value, 4);
    }

    #[test]
    fn test_oversized_range_value_degrades() {
        let params = run(&["range_value=100000000", "range_unit=weeks", "date=2026-01-01"]);
        assert_eq!(params.range_value, 1);
        assert_eq!(params.range_unit, RangeUnit::Weeks);

        let params = run(&["range_value=4294967295", "range_unit=months"]);
        assert_eq!(params.range_value, 1);
        assert_eq!(params.range_unit, RangeUnit::Months);
    }

    #[test]
    fn test_range_value_limit_depends_on_unit() {
        assert_eq!(run(&["range_value=120", "range_unit=months"]).range_value, 120);
        assert_eq!(run(&["range_value=123", "range_unit=months"]).range_value, 1);
        assert_eq!(run(&["range_value=3660", "range_unit=days"]).range_value, 3660);
        assert_eq!(run(&["range_value=3661", "range_unit=days"]).range_value, 1);
        assert_eq!(run(&["range_value=87840", "range_unit=hours"]).range_value, 87840);
    }

    #[test]
    fn test_enumerations_are_case_insensitive() {
        let params = run(&["query_type=StartsWith", "process_type=PLUGIN"]);
        assert_eq!(params.query_type, QueryType::StartsWith);
        assert_eq!(params.process_type, ProcessType::Plugin);
    }

    #[test]
    fn test_versions_are_trimmed() {
        let params = run(&["version= Firefox:52.0 ", "version=", "version=Firefox:53.0"]);
        assert_eq!(params.version, vec!["Firefox:52.0".to_string(), "Firefox:53.0".to_string()]);
    }

    #[test]
    fn test_do_query_intent() {
        assert_eq!(run(&["do_query=1"]).do_query, DoQuery::Execute);
        assert_eq!(run(&["do_query=true"]).do_query, DoQuery::Execute);
        assert_eq!(run(&["do_query=0"]).do_query, DoQuery::Skip);
        assert_eq!(run(&["do_query=false"]).do_query, DoQuery::Skip);
        assert_eq!(run(&["do_query="]).do_query, DoQuery::Skip);
    }

    #[test]
    fn test_signature_kept_verbatim() {
        let params = run(&["signature= js::Foo "]);
        assert_eq!(params.signature, " js::Foo ");
    }

    #[test]
    fn test_normalize_is_a_fixed_point() {
        let first = run(&[
            "product=Firefox",
            "version=Firefox:52.0",
            "query=  nsFoo::Bar ",
            "query_type=exact",
            "range_value=3",
            "range_unit=days",
            "do_query=1",
            "platform=win",
        ]);
        let raw = first.to_raw();
        let ctx = RequestContext::for_request(&raw, "Thunderbird", first.admin);
        let second = normalize_at(&raw, &SearchParams::default(), &ctx, fixed_now());
        assert_eq!(first, second);
    }

    #[test]
    fn test_fixed_point_ignores_clock() {
        let first = run(&[]);
        let raw = first.to_raw();
        let later = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let second = normalize_at(&raw, &SearchParams::default(), &ctx(&raw), later);
        assert_eq!(first, second);
    }

    #[test]
    fn test_range_unit_duration() {
        assert_eq!(RangeUnit::Weeks.duration(2), Some(TimeDelta::days(14)));
        assert_eq!(RangeUnit::Months.duration(1), Some(TimeDelta::days(30)));
        assert_eq!(RangeUnit::Hours.duration(5), Some(TimeDelta::hours(5)));
        assert!(RangeUnit::Months.duration(u32::MAX).is_none());
        assert!(!RangeUnit::Months.fits_window(u32::MAX));
    }
}
