//! Input-shape validation for request bodies and path parameters.
//!
//! Failures are reported as a structured list of field errors
//! (`{"errors": [...]}`, status 400) before any guard or handler logic runs.

use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

use crate::error::{ApiError, FieldError};

/// Parse a path-supplied identifier constrained to a positive integer.
pub fn parse_positive_id(raw: Option<&String>, param: &str) -> Result<i64, ApiError> {
    let invalid = || {
        ApiError::validation(vec![FieldError::path(
            param,
            format!("{param} inválido"),
        )])
    };

    let raw = raw.ok_or_else(invalid)?;
    let id = raw.parse::<i64>().map_err(|_| invalid())?;
    if id <= 0 {
        return Err(invalid());
    }
    Ok(id)
}

/// Name/amount validation shared by budgets and expenses. `entity` supplies
/// the per-resource wording ("presupuesto" / "gasto").
pub fn validate_money_inputs(
    name: &Option<String>,
    amount: &Option<Value>,
    entity: &str,
) -> Result<(String, Decimal), Vec<FieldError>> {
    let mut errors = Vec::new();

    let name = match name.as_deref().map(str::trim) {
        Some(n) if !n.is_empty() => Some(n.to_string()),
        _ => {
            errors.push(FieldError::body(
                "name",
                format!("El nombre del {entity} no puede ir vacio"),
            ));
            None
        }
    };

    let amount = match amount {
        None | Some(Value::Null) => {
            errors.push(FieldError::body(
                "amount",
                format!("La cantidad del {entity} no puede ir vacio"),
            ));
            None
        }
        Some(value) => match parse_amount(value) {
            Some(parsed) if parsed > Decimal::ZERO => Some(parsed),
            Some(_) => {
                errors.push(FieldError::body(
                    "amount",
                    format!("La cantidad del {entity} debe ser mayor a 0"),
                ));
                None
            }
            None => {
                errors.push(FieldError::body(
                    "amount",
                    format!("La cantidad del {entity} debe ser un número"),
                ));
                None
            }
        },
    };

    match (name, amount) {
        (Some(name), Some(amount)) if errors.is_empty() => Ok((name, amount)),
        _ => Err(errors),
    }
}

/// Numeric amounts are accepted both as JSON numbers and numeric strings.
fn parse_amount(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

/// Account creation: name non-empty, password at least 8 chars, valid email.
/// An empty body yields exactly these three errors.
pub fn validate_account_inputs(
    name: &Option<String>,
    email: &Option<String>,
    password: &Option<String>,
) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if name.as_deref().map(str::trim).unwrap_or("").is_empty() {
        errors.push(FieldError::body("name", "El nombre no puede estar vacío"));
    }
    if password.as_deref().map(str::len).unwrap_or(0) < 8 {
        errors.push(FieldError::body(
            "password",
            "La contraseña debe tener al menos 8 caracteres",
        ));
    }
    if !email.as_deref().map(is_valid_email).unwrap_or(false) {
        errors.push(FieldError::body(
            "email",
            "El correo electrónico no es válido",
        ));
    }

    errors
}

pub fn validate_email(email: &Option<String>) -> Vec<FieldError> {
    if email.as_deref().map(is_valid_email).unwrap_or(false) {
        Vec::new()
    } else {
        vec![FieldError::body(
            "email",
            "El correo electrónico no es válido",
        )]
    }
}

pub fn validate_password(password: &Option<String>) -> Vec<FieldError> {
    if password.as_deref().map(str::len).unwrap_or(0) < 8 {
        vec![FieldError::body(
            "password",
            "La contraseña debe tener al menos 8 caracteres",
        )]
    } else {
        Vec::new()
    }
}

/// One-shot codes are exactly six ASCII digits.
pub fn validate_one_shot_token(token: &Option<String>) -> Vec<FieldError> {
    let valid = token
        .as_deref()
        .map(|t| t.len() == 6 && t.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false);

    if valid {
        Vec::new()
    } else {
        vec![FieldError::body("token", "El token no es válido")]
    }
}

fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
}
