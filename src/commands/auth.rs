use crate::auth::{self, TOKEN_PATH_ENV_VAR};
use crate::{Config, Result};
use std::io::{self, Write};

/// What a query run with this session and auth setting can see.
pub fn admin_context_message(auth_active: bool, logged_in: bool) -> &'static str {
    match (auth_active, logged_in) {
        (false, _) => "Authentication is disabled; queries run without admin context.",
        (true, true) => "Queries run with admin context.",
        (true, false) => "Queries run without admin context.",
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

pub fn login(config: &Config) -> Result<()> {
    if auth::has_token() && !confirm("An API token is already stored. Replace it?")? {
        println!("Kept the existing token.");
        return Ok(());
    }

    println!("A crash-stats API token lets queries run with admin context.");
    print!("API token: ");
    io::stdout().flush()?;

    let token = rpassword::read_password().unwrap_or_default();
    let token = token.trim();
    if token.is_empty() {
        println!("No token entered; nothing stored.");
        return Ok(());
    }

    auth::store_token(token)?;
    println!("Token saved to the system keychain.");
    println!("{}", admin_context_message(config.auth_active, true));
    Ok(())
}

pub fn logout(config: &Config) -> Result<()> {
    if !auth::has_token() {
        println!("No API token stored.");
        return Ok(());
    }

    auth::delete_token()?;
    println!("Token removed from the system keychain.");
    println!("{}", admin_context_message(config.auth_active, auth::has_token()));
    Ok(())
}

fn check_token_path_fallback() {
    if let Ok(path) = std::env::var(TOKEN_PATH_ENV_VAR) {
        if std::path::Path::new(&path).exists() {
            println!("{} points at an existing token file.", TOKEN_PATH_ENV_VAR);
        } else {
            println!("{} points at a missing file: {}", TOKEN_PATH_ENV_VAR, path);
        }
    }
}

pub fn status(config: &Config) -> Result<()> {
    match auth::keychain_status() {
        auth::KeychainStatus::HasToken => {
            println!("API token stored in the system keychain.");
        }
        auth::KeychainStatus::NoToken => {
            println!("No API token in the system keychain.");
            check_token_path_fallback();
        }
        auth::KeychainStatus::Error(e) => {
            println!("Keychain error: {}", e);
            check_token_path_fallback();
        }
    }

    println!("{}", admin_context_message(config.auth_active, auth::has_token()));
    Ok(())
}
