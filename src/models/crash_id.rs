// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use serde::Serialize;
use std::fmt;

/// Length of a hyphenated UUID, the only form crash IDs are accepted in.
const HYPHENATED_LEN: usize = 36;

/// Prefix the crash reporter puts in front of submitted crash IDs.
const BREAKPAD_PREFIX: &str = "bp-";

/// A validated crash report identifier in lowercase hyphenated form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CrashId(String);

impl CrashId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CrashId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn extract_from_url(input: &str) -> &str {
    if input.starts_with("http://") || input.starts_with("https://") {
        // Handle trailing slashes by filtering empty segments
        input.rsplit('/').find(|s| !s.is_empty()).unwrap_or(input)
    } else {
        input
    }
}

fn strip_breakpad_prefix(input: &str) -> &str {
    match input.get(..BREAKPAD_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(BREAKPAD_PREFIX) => &input[BREAKPAD_PREFIX.len()..],
        _ => input,
    }
}

/// Recognizes a crash ID in free text. Accepts a bare UUID, a `bp-` prefixed
/// one, or a report URL ending in one. Never fails; returns `None` on anything
/// else.
pub fn parse_crash_id(input: &str) -> Option<CrashId> {
    let candidate = strip_breakpad_prefix(extract_from_url(input.trim()));
    if candidate.len() != HYPHENATED_LEN {
        return None;
    }
    let uuid = uuid::Uuid::try_parse(candidate).ok()?;
    Some(CrashId(uuid.hyphenated().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_id() {
        let id = parse_crash_id("247653e8-7a18-4836-97d1-42a720260120").unwrap();
        assert_eq!(id.as_str(), "247653e8-7a18-4836-97d1-42a720260120");
    }

    #[test]
    fn test_parse_all_zero_id() {
        assert!(parse_crash_id("00000000-0000-0000-0000-000000000000").is_some());
    }

    #[test]
    fn test_parse_uppercase_is_lowered() {
        let id = parse_crash_id("247653E8-7A18-4836-97D1-42A720260120").unwrap();
        assert_eq!(id.to_string(), "247653e8-7a18-4836-97d1-42a720260120");
    }

    #[test]
    fn test_parse_breakpad_prefix() {
        let id = parse_crash_id("bp-247653e8-7a18-4836-97d1-42a720260120").unwrap();
        assert_eq!(id.as_str(), "247653e8-7a18-4836-97d1-42a720260120");
        assert!(parse_crash_id("BP-247653e8-7a18-4836-97d1-42a720260120").is_some());
    }

    #[test]
    fn test_parse_from_report_url() {
        let url = "https://crash-stats.mozilla.org/report/index/247653e8-7a18-4836-97d1-42a720260120/";
        let id = parse_crash_id(url).unwrap();
        assert_eq!(id.as_str(), "247653e8-7a18-4836-97d1-42a720260120");
    }

    #[test]
    fn test_parse_surrounding_whitespace() {
        assert!(parse_crash_id("  247653e8-7a18-4836-97d1-42a720260120\n").is_some());
    }

    #[test]
    fn test_reject_signatures_and_garbage() {
        assert!(parse_crash_id("foo").is_none());
        assert!(parse_crash_id("mozilla::dom::Foo").is_none());
        assert!(parse_crash_id("").is_none());
        assert!(parse_crash_id("abc123; DROP TABLE crashes;").is_none());
    }

    #[test]
    fn test_reject_non_hyphenated_forms() {
        // uuid accepts these, crash IDs do not
        assert!(parse_crash_id("247653e87a18483697d142a720260120").is_none());
        assert!(parse_crash_id("{247653e8-7a18-4836-97d1-42a720260120}").is_none());
    }

    #[test]
    fn test_reject_non_hex() {
        assert!(parse_crash_id("247653e8-7a18-4836-97d1-42a72026012g").is_none());
    }
}
