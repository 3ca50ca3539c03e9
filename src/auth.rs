// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};

use crate::sources::SessionState;
use crate::{Error, Result};

const SERVICE_NAME: &str = "crashstats-query";
const TOKEN_KEY: &str = "api-token";

/// Environment variable pointing to a file containing the API token.
/// Used for CI/headless environments where no system keychain is available.
/// Keep the file outside any checkout, with restricted permissions.
pub const TOKEN_PATH_ENV_VAR: &str = "CRASHSTATS_API_TOKEN_PATH";

/// Where a token was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    Keychain,
    File(PathBuf),
}

/// Finds the API token, preferring the system keychain over the token file.
pub fn find_token() -> Option<(String, TokenSource)> {
    if let Some(token) = get_from_keychain() {
        return Some((token, TokenSource::Keychain));
    }

    let (token, path) = token_from_env(TOKEN_PATH_ENV_VAR)?;
    Some((token, TokenSource::File(path)))
}

/// Reads the token file named by the environment variable `var`.
fn token_from_env(var: &str) -> Option<(String, PathBuf)> {
    let path = PathBuf::from(std::env::var_os(var)?);
    let token = read_token_file(&path)?;
    Some((token, path))
}

pub fn get_token() -> Option<String> {
    find_token().map(|(token, _)| token)
}

pub fn has_token() -> bool {
    get_token().is_some()
}

fn read_token_file(path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    let token = content.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

fn entry() -> Result<keyring::Entry> {
    keyring::Entry::new(SERVICE_NAME, TOKEN_KEY)
        .map_err(|e| Error::Keyring(format!("Failed to create entry: {}", e)))
}

fn get_from_keychain() -> Option<String> {
    match entry().ok()?.get_password() {
        Ok(password) => Some(password),
        Err(keyring::Error::NoEntry) => None,
        Err(e) => {
            tracing::debug!(error = %e, "keychain lookup failed");
            None
        }
    }
}

#[derive(Debug)]
pub enum KeychainStatus {
    HasToken,
    NoToken,
    Error(String),
}

/// Detailed keychain state, for `auth status`.
pub fn keychain_status() -> KeychainStatus {
    let entry = match entry() {
        Ok(entry) => entry,
        Err(e) => return KeychainStatus::Error(e.to_string()),
    };
    match entry.get_password() {
        Ok(_) => KeychainStatus::HasToken,
        Err(keyring::Error::NoEntry) => KeychainStatus::NoToken,
        Err(e) => KeychainStatus::Error(format!("get_password failed: {:?}", e)),
    }
}

/// Stores the API token in the system keychain and reads it back.
pub fn store_token(token: &str) -> Result<()> {
    entry()?
        .set_password(token)
        .map_err(|e| Error::Keyring(format!("Failed to store: {}", e)))?;

    // Verify with a fresh entry (same instance may cache)
    match entry()?.get_password() {
        Ok(stored) if stored == token => Ok(()),
        Ok(_) => Err(Error::Keyring("Token mismatch after storage".to_string())),
        Err(e) => Err(Error::Keyring(format!(
            "Storage appeared to succeed but verification failed: {}. \
             This may be a Windows Credential Manager issue.",
            e
        ))),
    }
}

pub fn delete_token() -> Result<()> {
    match entry()?.delete_credential() {
        Ok(()) => Ok(()),
        Err(keyring::Error::NoEntry) => Ok(()), // Already deleted
        Err(e) => Err(Error::Keyring(e.to_string())),
    }
}

/// A session is logged in when an API token is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeychainSession;

impl SessionState for KeychainSession {
    fn is_logged_in(&self) -> bool {
        has_token()
    }
}

/// Admin context for a request: auth must be active and the session logged in.
pub fn is_admin<S: SessionState + ?Sized>(auth_active: bool, session: &S) -> bool {
    auth_active && session.is_logged_in()
}
