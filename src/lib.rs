// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

pub mod auth;
pub mod client;
pub mod commands;
pub mod config;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod sources;
pub mod state;

pub use auth::{KeychainSession, get_token, has_token};
pub use client::SocorroClient;
pub use config::Config;
pub use models::*;
pub use output::OutputFormat;
pub use pipeline::{CorrelationPolicy, QueryResults, run_query};
pub use sources::{BugLookup, ReportSource, SessionState};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Search term is empty")]
    EmptyTerm,

    #[error("Report query failed: {0}")]
    QueryFailed(#[source] Box<Error>),

    #[error("Bug lookup failed: {0}")]
    ExternalLookupFailed(#[source] Box<Error>),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Rate limited. Ask a human to run 'crashstats-query auth login' to set an API token that has no permissions attached to it")]
    RateLimited,

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Keyring error: {0}")]
    Keyring(String),
}

impl Error {
    /// Classifies a failure of the report data source.
    pub fn query_failed(err: Error) -> Error {
        match err {
            Error::QueryFailed(_) => err,
            other => Error::QueryFailed(Box::new(other)),
        }
    }

    /// Classifies a failure of the bug tracker lookup.
    pub fn external_lookup_failed(err: Error) -> Error {
        match err {
            Error::ExternalLookupFailed(_) => err,
            other => Error::ExternalLookupFailed(Box::new(other)),
        }
    }
}
