// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structural checks for settings whose value is itself a pattern.
//!
//! A settings-change payload looks like `{"setting": "<name>", "value": ...}`.
//! When the setting name ends in a recognized suffix the generic schema check
//! of `value` is replaced by a dedicated one: a regular-expression setting
//! must compile, a phone-mask setting must only use mask characters.

use regex::Regex;
use serde_json::Value;

/// Payload key holding the setting name
pub const SETTING_KEY: &str = "setting";
/// Payload key holding the setting value
pub const VALUE_KEY: &str = "value";

const REGEX_SUFFIXES: [&str; 3] = ["_regex", "Regex", ".regex"];
const PHONE_MASK_SUFFIXES: [&str; 3] = ["_phone_mask", "PhoneMask", ".phone_mask"];

/// Placeholder characters a phone mask may use for a digit
const MASK_PLACEHOLDERS: [char; 4] = ['9', '#', 'X', '0'];
/// Literal characters allowed between placeholders
const MASK_LITERALS: [char; 6] = [' ', '(', ')', '+', '-', '.'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKind {
    Regex,
    PhoneMask,
}

impl SettingKind {
    /// Detect the kind from a setting name
    pub fn detect(setting: &str) -> Option<Self> {
        if REGEX_SUFFIXES.iter().any(|s| setting.ends_with(s)) {
            Some(SettingKind::Regex)
        } else if PHONE_MASK_SUFFIXES.iter().any(|s| setting.ends_with(s)) {
            Some(SettingKind::PhoneMask)
        } else {
            None
        }
    }

    /// Detect the kind from a settings-change payload
    pub fn from_payload(payload: &Value) -> Option<Self> {
        payload
            .get(SETTING_KEY)
            .and_then(Value::as_str)
            .and_then(Self::detect)
    }

    /// Check a setting value, appending one message per problem
    pub fn check(&self, value: Option<&Value>, path: &str, errors: &mut Vec<String>) {
        let Some(value) = value else {
            errors.push(format!("{}: missing setting value", path));
            return;
        };
        let Some(text) = value.as_str() else {
            errors.push(format!("{}: setting value must be a string", path));
            return;
        };

        match self {
            SettingKind::Regex => {
                if let Err(e) = Regex::new(text) {
                    errors.push(format!(
                        "{}: '{}' is not a valid regular expression: {}",
                        path,
                        text,
                        first_line(&e.to_string())
                    ));
                }
            }
            SettingKind::PhoneMask => check_phone_mask(text, path, errors),
        }
    }
}

fn check_phone_mask(mask: &str, path: &str, errors: &mut Vec<String>) {
    if mask.trim().is_empty() {
        errors.push(format!("{}: phone mask must not be empty", path));
        return;
    }

    let invalid: Vec<char> = mask
        .chars()
        .filter(|c| !MASK_PLACEHOLDERS.contains(c) && !MASK_LITERALS.contains(c))
        .collect();
    if !invalid.is_empty() {
        let listed: String = invalid.into_iter().collect();
        errors.push(format!(
            "{}: phone mask '{}' contains invalid characters '{}'",
            path, mask, listed
        ));
    }

    if !mask.chars().any(|c| MASK_PLACEHOLDERS.contains(&c)) {
        errors.push(format!(
            "{}: phone mask '{}' has no digit placeholder",
            path, mask
        ));
    }
}

fn first_line(message: &str) -> &str {
    message
        .lines()
        .map(str::trim)
        .find(|l| l.starts_with("error:"))
        .or_else(|| message.lines().next())
        .unwrap_or(message)
}
