use serde_json::Value;

use crate::ipc::error::ParamError;
use crate::model::{Audience, Priority, Status};

/// Present, a string, and non-blank after trimming.
pub fn required_str(params: &Value, key: &str) -> Result<String, ParamError> {
    match params.get(key) {
        None | Some(Value::Null) => Err(ParamError::new(key, format!("missing {key}"))),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                Err(ParamError::new(key, format!("{key} must not be empty")))
            } else {
                Ok(s.to_string())
            }
        }
        Some(_) => Err(ParamError::new(key, format!("{key} must be a string"))),
    }
}

/// Blank strings count as omitted; any other non-string value is rejected.
pub fn optional_str(params: &Value, key: &str) -> Result<Option<String>, ParamError> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            let s = s.trim();
            Ok(if s.is_empty() { None } else { Some(s.to_string()) })
        }
        Some(_) => Err(ParamError::new(key, format!("{key} must be a string"))),
    }
}

pub fn optional_status(params: &Value, key: &str) -> Result<Option<Status>, ParamError> {
    match optional_str(params, key)? {
        None => Ok(None),
        Some(raw) => Status::parse(&raw)
            .map(Some)
            .ok_or_else(|| ParamError::new(key, format!("invalid {key}: {raw}"))),
    }
}

pub fn required_priority(params: &Value, key: &str) -> Result<Priority, ParamError> {
    let raw = required_str(params, key)?;
    Priority::parse(&raw).ok_or_else(|| ParamError::new(key, format!("invalid {key}: {raw}")))
}

pub fn required_audience(params: &Value, key: &str) -> Result<Audience, ParamError> {
    let raw = required_str(params, key)?;
    Audience::parse(&raw).ok_or_else(|| ParamError::new(key, format!("invalid {key}: {raw}")))
}

/// Accepts either a single string or an array of strings. Blank entries are
/// dropped.
pub fn string_list(params: &Value, key: &str) -> Result<Vec<String>, ParamError> {
    let items: Vec<&Value> = match params.get(key) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(arr)) => arr.iter().collect(),
        Some(v @ Value::String(_)) => vec![v],
        Some(_) => {
            return Err(ParamError::new(
                key,
                format!("{key} must be a string or a list of strings"),
            ))
        }
    };
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let Some(s) = item.as_str() else {
            return Err(ParamError::new(key, format!("{key} entries must be strings")));
        };
        let s = s.trim();
        if !s.is_empty() {
            out.push(s.to_string());
        }
    }
    Ok(out)
}

/// Positive integer given as a JSON number or a numeric string.
pub fn required_positive_u32(params: &Value, key: &str) -> Result<u32, ParamError> {
    let invalid = || ParamError::new(key, format!("{key} must be a positive integer"));
    let v = match params.get(key) {
        None | Some(Value::Null) => {
            return Err(ParamError::new(key, format!("missing {key}")))
        }
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(invalid)?,
        Some(Value::String(s)) => s.trim().parse::<u32>().map_err(|_| invalid())?,
        Some(_) => return Err(invalid()),
    };
    if v == 0 {
        return Err(invalid());
    }
    Ok(v)
}

/// Optional percentage in 0..=100.
pub fn optional_percent(params: &Value, key: &str) -> Result<Option<f64>, ParamError> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => {
            let Some(x) = v.as_f64() else {
                return Err(ParamError::new(key, format!("{key} must be a number")));
            };
            if !(0.0..=100.0).contains(&x) {
                return Err(ParamError::new(key, format!("{key} must be within 0..=100")));
            }
            Ok(Some(x))
        }
    }
}

/// Lower-cased search needle, or `None` when the list should not be filtered.
pub fn search_term(params: &Value) -> Result<Option<String>, ParamError> {
    Ok(optional_str(params, "search")?.map(|s| s.to_lowercase()))
}

pub fn matches_search(needle: Option<&str>, fields: &[&str]) -> bool {
    match needle {
        None => true,
        Some(n) => fields.iter().any(|f| f.to_lowercase().contains(n)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn required_str_trims_and_rejects_blank() {
        let p = json!({ "name": "  Alice ", "blank": "   ", "num": 3 });
        assert_eq!(required_str(&p, "name"), Ok("Alice".to_string()));
        assert_eq!(required_str(&p, "blank").unwrap_err().field, "blank");
        assert!(required_str(&p, "num").is_err());
        assert!(required_str(&p, "missing").is_err());
    }

    #[test]
    fn string_list_accepts_single_string_or_array() {
        let p = json!({ "one": "Physics", "many": ["Physics", " ", "English"], "bad": [1] });
        assert_eq!(string_list(&p, "one").unwrap(), vec!["Physics"]);
        assert_eq!(string_list(&p, "many").unwrap(), vec!["Physics", "English"]);
        assert!(string_list(&p, "absent").unwrap().is_empty());
        assert!(string_list(&p, "bad").is_err());
    }

    #[test]
    fn capacity_accepts_numeric_strings() {
        let p = json!({ "a": 30, "b": "35", "c": -1, "d": "lots", "e": 2.5, "f": 1 });
        assert_eq!(required_positive_u32(&p, "a"), Ok(30));
        assert_eq!(required_positive_u32(&p, "b"), Ok(35));
        assert_eq!(required_positive_u32(&p, "f"), Ok(1));
        assert!(required_positive_u32(&p, "c").is_err());
        assert!(required_positive_u32(&p, "d").is_err());
        assert!(required_positive_u32(&p, "e").is_err());
    }

    #[test]
    fn capacity_zero_is_rejected() {
        let p = json!({ "n": 0, "s": "0" });
        assert_eq!(required_positive_u32(&p, "n").unwrap_err().field, "n");
        assert!(required_positive_u32(&p, "s").is_err());
    }

    #[test]
    fn optional_fields_reject_non_string_values() {
        let p = json!({ "status": 0, "date": 20260105, "author": "  ", "blank": null });
        assert_eq!(optional_status(&p, "status").unwrap_err().field, "status");
        assert_eq!(optional_str(&p, "date").unwrap_err().field, "date");
        assert_eq!(optional_str(&p, "author"), Ok(None));
        assert_eq!(optional_str(&p, "blank"), Ok(None));
        assert_eq!(optional_str(&p, "absent"), Ok(None));
        assert!(search_term(&json!({ "search": 7 })).is_err());
    }

    #[test]
    fn percent_bounds() {
        let p = json!({ "ok": 87.5, "high": 120, "text": "90" });
        assert_eq!(optional_percent(&p, "ok"), Ok(Some(87.5)));
        assert_eq!(optional_percent(&p, "none"), Ok(None));
        assert!(optional_percent(&p, "high").is_err());
        assert!(optional_percent(&p, "text").is_err());
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let needle = search_term(&json!({ "search": "  JOHN " })).unwrap();
        assert_eq!(needle.as_deref(), Some("john"));
        assert!(matches_search(needle.as_deref(), &["Alice Johnson", "a@x.com"]));
        assert!(!matches_search(needle.as_deref(), &["Bob", "b@x.com"]));
        assert!(matches_search(None, &["anything"]));
        assert_eq!(search_term(&json!({ "search": "" })), Ok(None));
    }
}
