pub mod bugs;
pub mod common;
pub mod crash_id;
pub mod navigation;
pub mod params;
pub mod quick_search;
pub mod reports;
pub mod search;

pub use bugs::{BugAssociation, BugsResponse, SignatureBugMap, bug_url, correlate};
pub use crash_id::{CrashId, parse_crash_id};
pub use navigation::{ProductVersion, parse_navigation_version};
pub use params::*;
pub use quick_search::{MatchMode, QuickSearchDecision, resolve_quick_search};
pub use reports::*;
pub use search::*;
