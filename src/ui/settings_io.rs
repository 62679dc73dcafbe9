use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::model::contact::{Contact, ContactRoster};
use crate::model::settings::FlingSettings;
use crate::ui::settings::UiSettings;

const UI_SETTINGS_FILE: &str = "ui_settings.json";
const SETTINGS_FILE: &str = "settings.json";
const CONTACTS_FILE: &str = "contacts.json";

fn config_path(file: &str) -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("fling");
    fs::create_dir_all(&path).ok();
    path.push(file);
    path
}

/// Reads `path` as JSON; a missing or broken file yields the default.
pub fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    fs::read_to_string(path)
        .ok()
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

fn write_json<T: Serialize>(path: &Path, value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            if let Err(e) = fs::write(path, json) {
                tracing::warn!(path = %path.display(), error = %e, "could not write settings");
            }
        }
        Err(e) => tracing::warn!(error = %e, "could not serialize settings"),
    }
}

pub fn load_ui_settings() -> UiSettings {
    read_json_or_default(&config_path(UI_SETTINGS_FILE))
}

pub fn save_ui_settings(settings: &UiSettings) {
    write_json(&config_path(UI_SETTINGS_FILE), settings);
}

pub fn load_settings() -> FlingSettings {
    read_json_or_default(&config_path(SETTINGS_FILE))
}

pub fn save_settings(settings: &FlingSettings) {
    write_json(&config_path(SETTINGS_FILE), settings);
}

pub fn load_contacts() -> ContactRoster {
    read_json_or_default(&config_path(CONTACTS_FILE))
}

/// Reads a contact list picked by the user and keeps a copy in the config dir.
pub fn import_contacts(path: &Path) -> anyhow::Result<ContactRoster> {
    let text = fs::read_to_string(path)?;
    let contacts: Vec<Contact> = serde_json::from_str(&text)?;
    let roster = ContactRoster::new(contacts);
    write_json(&config_path(CONTACTS_FILE), &roster);
    Ok(roster)
}
