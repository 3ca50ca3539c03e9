// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use serde::{Deserialize, Serialize};

/// Shown in place of a signature that is absent.
pub const NULL_SIGNATURE_DISPLAY: &str = "(null signature)";
/// Shown in place of a signature that is present but blank.
pub const EMPTY_SIGNATURE_DISPLAY: &str = "(empty signature)";

/// One row of the top-signatures aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawReport {
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub numhang: u64,
    #[serde(default)]
    pub numplugin: u64,
    #[serde(default)]
    pub pluginname: Option<String>,
    #[serde(default)]
    pub pluginversion: Option<String>,
    #[serde(default)]
    pub pluginfilename: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingSignature {
    None,
    NullSignature,
    EmptySignature,
}

impl MissingSignature {
    /// Value of the `missing_sig` search option that finds these reports.
    pub fn param_code(self) -> Option<&'static str> {
        match self {
            MissingSignature::None => None,
            MissingSignature::NullSignature => Some("##null##"),
            MissingSignature::EmptySignature => Some("##empty##"),
        }
    }

    pub fn needs_help(self) -> bool {
        self != MissingSignature::None
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedReport {
    #[serde(flatten)]
    pub report: RawReport,
    pub display_signature: String,
    pub missing_sig_reason: MissingSignature,
    pub is_hang: bool,
    pub is_plugin: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResultSetFlags {
    pub show_plugin_name: bool,
    pub show_plugin_filename: bool,
}

/// Classified rows in input order, plus the signatures they carry.
#[derive(Debug, Clone, Default)]
pub struct Classification {
    pub reports: Vec<ClassifiedReport>,
    pub flags: ResultSetFlags,
    /// Every real signature seen, in row order, duplicates included.
    pub signatures: Vec<String>,
}

pub fn resolve_display(report: &RawReport) -> (String, MissingSignature) {
    match report.signature.as_deref() {
        None => (NULL_SIGNATURE_DISPLAY.to_string(), MissingSignature::NullSignature),
        Some(sig) if sig.trim().is_empty() => {
            (EMPTY_SIGNATURE_DISPLAY.to_string(), MissingSignature::EmptySignature)
        }
        Some(sig) => (sig.to_string(), MissingSignature::None),
    }
}

fn non_empty(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

pub fn classify(raw_reports: Vec<RawReport>) -> Classification {
    let mut classification = Classification {
        reports: Vec::with_capacity(raw_reports.len()),
        ..Default::default()
    };

    for report in raw_reports {
        let (display_signature, missing_sig_reason) = resolve_display(&report);

        if non_empty(&report.pluginname) || non_empty(&report.pluginversion) {
            classification.flags.show_plugin_name = true;
        }
        if non_empty(&report.pluginfilename) {
            classification.flags.show_plugin_filename = true;
        }
        if missing_sig_reason == MissingSignature::None {
            classification.signatures.push(display_signature.clone());
        }

        classification.reports.push(ClassifiedReport {
            is_hang: report.numhang > 0,
            is_plugin: report.numplugin > 0,
            report,
            display_signature,
            missing_sig_reason,
        });
    }

    classification
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(signature: Option<&str>) -> RawReport {
        RawReport {
            signature: signature.map(str::to_string),
            count: 10,
            ..Default::default()
        }
    }

    #[test]
    fn test_null_signature() {
        let mut r = report(None);
        r.numhang = 3;
        r.pluginname = Some("Flash".to_string());
        let (display, reason) = resolve_display(&r);
        assert_eq!(display, NULL_SIGNATURE_DISPLAY);
        assert_eq!(reason, MissingSignature::NullSignature);
    }

    #[test]
    fn test_empty_signature() {
        let (display, reason) = resolve_display(&report(Some("")));
        assert_eq!(display, EMPTY_SIGNATURE_DISPLAY);
        assert_eq!(reason, MissingSignature::EmptySignature);
        assert_ne!(EMPTY_SIGNATURE_DISPLAY, NULL_SIGNATURE_DISPLAY);
    }

    #[test]
    fn test_whitespace_signature_is_empty() {
        let (_, reason) = resolve_display(&report(Some("  \t")));
        assert_eq!(reason, MissingSignature::EmptySignature);
    }

    #[test]
    fn test_real_signature_verbatim() {
        let (display, reason) = resolve_display(&report(Some(" OOM | small")));
        assert_eq!(display, " OOM | small");
        assert_eq!(reason, MissingSignature::None);
    }

    #[test]
    fn test_param_codes() {
        assert_eq!(MissingSignature::None.param_code(), None);
        assert_eq!(MissingSignature::NullSignature.param_code(), Some("##null##"));
        assert_eq!(MissingSignature::EmptySignature.param_code(), Some("##empty##"));
        assert!(MissingSignature::EmptySignature.needs_help());
        assert!(!MissingSignature::None.needs_help());
    }

    #[test]
    fn test_classify_preserves_order_and_flags_hangs() {
        let mut hang = report(Some("hang_sig"));
        hang.numhang = 2;
        let mut plugin = report(Some("plugin_sig"));
        plugin.numplugin = 1;
        let plain = report(Some("plain_sig"));

        let result = classify(vec![hang, plugin, plain]);
        let names: Vec<&str> = result.reports.iter().map(|r| r.display_signature.as_str()).collect();
        assert_eq!(names, vec!["hang_sig", "plugin_sig", "plain_sig"]);
        assert!(result.reports[0].is_hang && !result.reports[0].is_plugin);
        assert!(!result.reports[1].is_hang && result.reports[1].is_plugin);
        assert!(!result.reports[2].is_hang && !result.reports[2].is_plugin);
    }

    #[test]
    fn test_show_plugin_name_false_for_all_absent() {
        let result = classify(vec![report(Some("a")), report(Some("b"))]);
        assert_eq!(result.flags, ResultSetFlags::default());
    }

    #[test]
    fn test_show_plugin_name_from_version_alone() {
        let mut r = report(Some("a"));
        r.pluginversion = Some("10.1".to_string());
        let result = classify(vec![report(Some("b")), r]);
        assert!(result.flags.show_plugin_name);
        assert!(!result.flags.show_plugin_filename);
    }

    #[test]
    fn test_empty_plugin_strings_do_not_count() {
        let mut r = report(Some("a"));
        r.pluginname = Some(String::new());
        r.pluginfilename = Some(String::new());
        let result = classify(vec![r]);
        assert!(!result.flags.show_plugin_name);
        assert!(!result.flags.show_plugin_filename);
    }

    #[test]
    fn test_show_plugin_filename() {
        let mut r = report(None);
        r.pluginfilename = Some("NPSWF32.dll".to_string());
        let result = classify(vec![r]);
        assert!(result.flags.show_plugin_filename);
    }

    #[test]
    fn test_signatures_handoff_skips_missing_and_keeps_duplicates() {
        let result = classify(vec![
            report(Some("a")),
            report(None),
            report(Some("")),
            report(Some("b")),
            report(Some("a")),
        ]);
        assert_eq!(result.signatures, vec!["a", "b", "a"]);
        assert_eq!(result.reports.len(), 5);
    }

    #[test]
    fn test_classified_report_serializes_flat() {
        let result = classify(vec![report(None)]);
        let value = serde_json::to_value(&result.reports[0]).unwrap();
        assert_eq!(value["signature"], serde_json::Value::Null);
        assert_eq!(value["count"], 10);
        assert_eq!(value["missing_sig_reason"], "null_signature");
    }
}
