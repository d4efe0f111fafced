use std::{io::Write, time::Duration};

use colored::Colorize;
use comfy_table::{Table, presets::UTF8_FULL};
use tracing::info;

use crate::{
    cli::PostArgs,
    error::AppError,
    message::annotate,
    profile::ProfileConfig,
    prompt::Prompter,
    session::KtistecSession,
    storage::ProfileStore,
    validation::{prompt_until_valid, validate_profile_name, validate_server_url, validate_user_name},
};

/// Table headers for `profile list`
const LIST_HEADERS: [&str; 3] = ["Profile Name", "Server URL", "User Name"];

/// Posts a message as the requested (or default) profile
pub fn post<P: Prompter + ?Sized>(
    store: &ProfileStore,
    prompter: &P,
    args: &PostArgs,
    timeout: Duration,
) -> Result<(), AppError> {
    let profiles = store.load_all()?;
    let profile = profiles.resolve(args.profile.as_deref())?;

    let message = match &args.message {
        Some(message) => message.clone(),
        None => prompter.editor("compose message:")?,
    };
    let message = message.trim_end();
    if message.trim().is_empty() {
        return Err(AppError::Validation("empty message, nothing posted".to_string()));
    }

    let session = KtistecSession::new(profile, timeout)?;
    session.post(&annotate(message), &args.links)?;

    info!(server = profile.server_url(), user = profile.user_name(), "posted");
    println!(
        "{} {} as {}.",
        "Posted to".green(),
        profile.server_url(),
        profile.user_name()
    );
    Ok(())
}

/// Adds or updates a profile from interactive prompts
pub fn add_profile<P: Prompter + ?Sized>(store: &ProfileStore, prompter: &P) -> Result<(), AppError> {
    let mut profiles = store.load_or_default()?;

    let name = prompt_until_valid(prompter, "profile name:", validate_profile_name)?;
    let server_url = prompt_until_valid(prompter, "ktistec server url:", validate_server_url)?;
    let user_name = prompt_until_valid(prompter, "user name:", validate_user_name)?;
    let password = prompter.password("password:")?;

    let config = ProfileConfig::new(server_url, user_name, password)?;
    profiles.insert(&name, config)?;
    store.save(&profiles)?;

    println!("{}", format!("Profile `{name}` saved.").green());
    Ok(())
}

/// Removes a profile after confirmation. Returns whether it was removed.
pub fn remove_profile<P: Prompter + ?Sized>(
    store: &ProfileStore,
    prompter: &P,
    name: &str,
) -> Result<bool, AppError> {
    let mut profiles = store.load_all()?;
    if profiles.find_key(name).is_none() {
        return Err(AppError::ProfileNotFound(name.to_string()));
    }

    if !prompter.confirm(&format!("Do you really want to remove profile `{name}` ?"))? {
        return Ok(false);
    }

    profiles.remove(name)?;
    store.save(&profiles)?;

    println!("{}", format!("Profile `{name}` removed.").green());
    Ok(true)
}

/// Writes the profile table to `out`
pub fn list_profiles(store: &ProfileStore, out: &mut dyn Write) -> Result<(), AppError> {
    let profiles = store.load_all()?;
    if profiles.is_empty() {
        writeln!(out, "{}", "no profiles to show".red())?;
        return Ok(());
    }

    let mut table = get_table();
    table.set_header(LIST_HEADERS.to_vec());
    for (key, server_url, user_name) in profiles.list() {
        table.add_row(vec![key, server_url, user_name]);
    }
    writeln!(out, "{table}")?;
    Ok(())
}

/// Marks a profile as default, asking before replacing an existing default.
/// Returns whether the default changed.
pub fn set_default_profile<P: Prompter + ?Sized>(
    store: &ProfileStore,
    prompter: &P,
    name: &str,
) -> Result<bool, AppError> {
    let mut profiles = store.load_all()?;

    if let Some(current) = profiles.check_set_default(name)? {
        let question = format!(
            "Profile {current} is already set as default. Do you want to set profile {name} as default?"
        );
        if !prompter.confirm(&question)? {
            return Ok(false);
        }
    }

    profiles.set_default(name)?;
    store.save(&profiles)?;

    println!("{}", format!("Set profile `{name}` as default.").green());
    Ok(true)
}

/// Table with the styling used for every listing
fn get_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table
}
