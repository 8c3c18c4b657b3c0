//! Field discovery across Ubersmith response shapes.
//!
//! Ubersmith installs differ in where PPPoE credentials and VLAN live:
//! direct service fields, arbitrarily-named custom fields, or custom-field
//! IDs as bare numeric keys. Deployments also disagree on whether `data` is
//! one service object, a map of services, or an array. This module owns all
//! of that guessing; the client only walks the method fallback chain.

use serde_json::{Map, Value};

use sync_core::ServiceDetail;

const VLAN_ALIASES: &[&str] = &["vlan", "vlan_field", "vlan_id", "VLAN", "Vlan", "vlan_tag"];
const USER_ALIASES: &[&str] = &[
    "pppoe_user",
    "pppoe_username",
    "pppoe_user_field",
    "PPPoEUser",
    "pppoe_user_name",
    "pppoe_usr",
];
const PASS_ALIASES: &[&str] = &[
    "pppoe_password",
    "pppoe_pass",
    "pppoe_pass_field",
    "PPPoEPass",
    "pppoe_password_field",
    "pppoe_passwd",
];

/// Masks a credential for logging. Counts chars, not bytes, since the
/// billing system accepts non-ASCII passwords.
pub fn mask_password(pass: &str) -> String {
    if pass.is_empty() {
        return String::new();
    }
    let chars: Vec<char> = pass.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{head}****{tail}")
}

/// Stringifies a field value; numbers lose their fraction.
fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => n.as_f64().map(|f| format!("{f:.0}")),
        _ => None,
    }
}

/// First non-empty value under any of the alias names.
fn find_field(obj: &Map<String, Value>, aliases: &[&str]) -> Option<String> {
    aliases
        .iter()
        .find_map(|name| obj.get(*name).and_then(value_to_string))
}

/// Direct fields plus keyword scan over one service object.
fn sniff_service_object(obj: &Map<String, Value>) -> ServiceDetail {
    let mut detail = ServiceDetail::default();

    detail.username = obj.get("username").and_then(value_to_string);
    detail.password = obj.get("password").and_then(value_to_string);

    for (key, value) in obj {
        let Some(text) = value_to_string(value) else {
            continue;
        };
        let key_lower = key.to_lowercase();

        if detail.vlan.is_none() && key_lower.contains("vlan") {
            detail.vlan = Some(text.clone());
        }

        let pppoe = key_lower.contains("pppoe") || key_lower.contains("pppo");
        if pppoe && detail.username.is_none() && key_lower.contains("user") {
            detail.username = Some(text.clone());
        }
        if pppoe && detail.password.is_none() && key_lower.contains("pass") {
            detail.password = Some(text);
        }
    }

    detail
}

/// Guesses credentials out of bare numeric custom-field keys by value
/// shape: usernames tend to carry `@` or a moderate length, VLANs are short
/// numerics, passwords are `@`-free moderate strings.
fn sniff_custom_fields(obj: &Map<String, Value>) -> ServiceDetail {
    let mut detail = ServiceDetail::default();

    for (key, value) in obj {
        if key.parse::<u64>().is_err() {
            continue;
        }
        let Some(text) = value_to_string(value) else {
            continue;
        };
        let text_lower = text.to_lowercase();

        if detail.vlan.is_none()
            && (text_lower.contains("vlan")
                || (text.len() <= 10 && text.starts_with(|c: char| c.is_ascii_digit())))
        {
            detail.vlan = Some(text.clone());
        }
        if detail.username.is_none() && (text.contains('@') || (text.len() > 3 && text.len() < 50))
        {
            detail.username = Some(text.clone());
        }
        if detail.password.is_none() && text.len() >= 4 && text.len() <= 50 && !text.contains('@')
        {
            detail.password = Some(text);
        }
    }

    detail
}

/// Alias-list lookup over a nested service object.
fn sniff_aliases(obj: &Map<String, Value>) -> ServiceDetail {
    ServiceDetail {
        vlan: find_field(obj, VLAN_ALIASES),
        username: find_field(obj, USER_ALIASES),
        password: find_field(obj, PASS_ALIASES),
    }
}

/// Extracts service detail from the `data` payload, whatever its shape.
pub fn extract_detail(data: &Value) -> ServiceDetail {
    match data {
        Value::Object(obj) => {
            let direct = sniff_service_object(obj);
            if !direct.is_empty() {
                return direct;
            }

            let custom = sniff_custom_fields(obj);
            if !custom.is_empty() {
                return custom;
            }

            // A map of service-ID → service object.
            for nested in obj.values().filter_map(Value::as_object) {
                let detail = sniff_aliases(nested);
                if !detail.is_empty() {
                    return detail;
                }
            }
            ServiceDetail::default()
        }
        Value::Array(items) => {
            for nested in items.iter().filter_map(Value::as_object) {
                let detail = sniff_aliases(nested);
                if !detail.is_empty() {
                    return detail;
                }
            }
            ServiceDetail::default()
        }
        _ => ServiceDetail::default(),
    }
}
