// SPDX-License-Identifier: Apache-2.0
//! Declarative schema for the configuration document.
//!
//! Each field carries a presence rule, an optional coercion and an ordered
//! list of checks. The evaluator walks the whole table and collects one
//! violation per offending field (the first check that fails), so a single
//! diagnostic names every broken field at once.

use std::net::IpAddr;

use serde_json::{Map, Number, Value};
use url::Host;

use crate::error::Violation;

pub const SMTP_HOST: &str = "smtpHost";
pub const SMTP_PORT: &str = "smtpPort";
pub const SMTP_USER: &str = "smtpUser";
pub const SMTP_PASS: &str = "smtpPass";

const MAX_HOSTNAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// A check either passes the value on, possibly normalized, or rejects it.
type Check = fn(Value) -> Result<Value, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Presence {
    Required,
    Optional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Coercion {
    None,
    /// Numeric strings and whole floats become JSON integers.
    Integer,
}

struct FieldRule {
    name: &'static str,
    presence: Presence,
    coercion: Coercion,
    checks: &'static [Check],
}

const CONFIG_SCHEMA: &[FieldRule] = &[
    FieldRule {
        name: SMTP_HOST,
        presence: Presence::Required,
        coercion: Coercion::None,
        checks: &[is_string, is_not_empty, is_hostname],
    },
    FieldRule {
        name: SMTP_PORT,
        presence: Presence::Required,
        coercion: Coercion::Integer,
        checks: &[is_integer, is_positive, is_port],
    },
    FieldRule {
        name: SMTP_USER,
        presence: Presence::Optional,
        coercion: Coercion::None,
        checks: &[is_string],
    },
    FieldRule {
        name: SMTP_PASS,
        presence: Presence::Optional,
        coercion: Coercion::None,
        checks: &[is_string],
    },
];

/// Fields that passed every rule, already coerced.
#[derive(Debug, Default)]
pub struct Checked {
    values: Map<String, Value>,
}

impl Checked {
    pub fn string(&self, field: &str) -> Option<&str> {
        self.values.get(field).and_then(Value::as_str)
    }

    pub fn port(&self, field: &str) -> Option<u16> {
        self.values
            .get(field)
            .and_then(Value::as_u64)
            .and_then(|n| u16::try_from(n).ok())
    }

    #[cfg(test)]
    pub(crate) fn insert(&mut self, field: &str, value: Value) {
        self.values.insert(field.to_string(), value);
    }
}

/// Runs the configuration schema over a parsed document.
pub fn check_document(doc: &Value) -> Result<Checked, Vec<Violation>> {
    let Some(object) = doc.as_object() else {
        return Err(vec![Violation {
            field: "(root)",
            message: "configuration must be a JSON object".into(),
        }]);
    };

    let mut checked = Checked::default();
    let mut violations = Vec::new();

    for rule in CONFIG_SCHEMA {
        // null counts as absent, like a missing key
        let raw = object.get(rule.name).filter(|v| !v.is_null());
        let Some(raw) = raw else {
            if rule.presence == Presence::Required {
                violations.push(Violation {
                    field: rule.name,
                    message: "is required".into(),
                });
            }
            continue;
        };

        let value = coerce(raw, rule.coercion);
        match rule.checks.iter().try_fold(value, |value, check| check(value)) {
            Ok(value) => {
                checked.values.insert(rule.name.to_string(), value);
            }
            Err(message) => violations.push(Violation {
                field: rule.name,
                message,
            }),
        }
    }

    if violations.is_empty() {
        Ok(checked)
    } else {
        Err(violations)
    }
}

fn coerce(value: &Value, coercion: Coercion) -> Value {
    match (coercion, value) {
        (Coercion::Integer, Value::String(s)) => match s.trim().parse::<i64>() {
            Ok(n) => Value::Number(Number::from(n)),
            Err(_) => value.clone(),
        },
        (Coercion::Integer, Value::Number(n)) if n.is_f64() => {
            match n.as_f64() {
                Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                    Value::Number(Number::from(f as i64))
                }
                _ => value.clone(),
            }
        }
        _ => value.clone(),
    }
}

fn as_integer(value: &Value) -> Option<i128> {
    value
        .as_i64()
        .map(i128::from)
        .or_else(|| value.as_u64().map(i128::from))
}

fn is_string(value: Value) -> Result<Value, String> {
    if value.is_string() {
        Ok(value)
    } else {
        Err("must be a string".into())
    }
}

fn is_not_empty(value: Value) -> Result<Value, String> {
    if value.as_str().is_some_and(|s| !s.is_empty()) {
        Ok(value)
    } else {
        Err("must not be empty".into())
    }
}

/// Replaces the host with its connectable form.
fn is_hostname(value: Value) -> Result<Value, String> {
    let s = value.as_str().unwrap_or_default();
    match connectable_host(s) {
        Some(host) => Ok(Value::String(host)),
        None => Err(format!("must be a valid hostname or IP address, got {s:?}")),
    }
}

fn is_integer(value: Value) -> Result<Value, String> {
    match as_integer(&value) {
        Some(_) => Ok(value),
        None => Err("must be an integer".into()),
    }
}

fn is_positive(value: Value) -> Result<Value, String> {
    match as_integer(&value) {
        Some(n) if n > 0 => Ok(value),
        _ => Err("must be a positive number".into()),
    }
}

fn is_port(value: Value) -> Result<Value, String> {
    match as_integer(&value) {
        Some(n) if n <= i128::from(u16::MAX) => Ok(value),
        _ => Err(format!("must not be greater than {}", u16::MAX)),
    }
}

/// Hostname or IP literal that an SMTP client can connect to.
pub fn valid_hostname(s: &str) -> bool {
    connectable_host(s).is_some()
}

/// The form of `s` handed to the transport: IP literals without brackets,
/// internationalized names in their ASCII form, plain ASCII names unchanged.
pub fn connectable_host(s: &str) -> Option<String> {
    if s.is_empty() || s.len() > MAX_HOSTNAME_LEN || s != s.trim() {
        return None;
    }
    if let Ok(ip) = s.parse::<IpAddr>() {
        return Some(ip.to_string());
    }
    match Host::parse(s).ok()? {
        Host::Ipv4(ip) => Some(ip.to_string()),
        Host::Ipv6(ip) => Some(ip.to_string()),
        Host::Domain(domain) => {
            let trimmed = domain.strip_suffix('.').unwrap_or(&domain);
            if trimmed.is_empty() || !trimmed.split('.').all(valid_label) {
                return None;
            }
            if domain.eq_ignore_ascii_case(s) {
                Some(s.to_owned())
            } else {
                Some(domain)
            }
        }
    }
}

fn valid_label(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= MAX_LABEL_LEN
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
