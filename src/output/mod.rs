// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

pub mod compact;
pub mod json;
pub mod markdown;

use clap::ValueEnum;

/// How query results and quick-search decisions are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per signature, suited to terminals and agents
    #[default]
    Compact,
    /// The full result object, including normalized parameters
    Json,
    /// Tables with bug links
    Markdown,
}
