//! Redaction of call parameters before they reach the audit log

use serde_json::Value;

const REDACTED: &str = "[REDACTED]";
const SENSITIVE_FRAGMENTS: [&str; 4] = ["token", "secret", "password", "credential"];
const SENSITIVE_KEYS: [&str; 4] = ["auth", "authorization", "bearer", "apikey"];

pub fn redact_audit_params(params: Option<&Value>) -> Value {
    params.map(redact_value).unwrap_or(Value::Null)
}

fn redact_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| {
                    let item = if is_sensitive_key(key) {
                        Value::String(REDACTED.to_string())
                    } else {
                        redact_value(item)
                    };
                    (key.clone(), item)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact_value).collect()),
        _ => value.clone(),
    }
}

pub fn is_sensitive_key(key: &str) -> bool {
    let normalized = key.trim().to_ascii_lowercase().replace(['-', '_'], "");
    SENSITIVE_KEYS.contains(&normalized.as_str())
        || SENSITIVE_FRAGMENTS
            .iter()
            .any(|fragment| normalized.contains(fragment))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn nested_secrets_are_masked() {
        let params = json!({
            "x": 1,
            "headers": {"Authorization": "Bearer abc", "accept": "json"},
            "items": [{"api-key": "k"}, {"name": "ok"}],
            "refresh_token": "r"
        });

        let redacted = redact_audit_params(Some(&params));

        assert_eq!(redacted["x"], json!(1));
        assert_eq!(redacted["headers"]["Authorization"], json!(REDACTED));
        assert_eq!(redacted["headers"]["accept"], json!("json"));
        assert_eq!(redacted["items"][0]["api-key"], json!(REDACTED));
        assert_eq!(redacted["items"][1]["name"], json!("ok"));
        assert_eq!(redacted["refresh_token"], json!(REDACTED));
    }

    #[test]
    fn auth_matches_whole_keys_only() {
        let params = json!({
            "auth": "a",
            "Authorization": "b",
            "author": "Ada",
            "authority": "example.org"
        });

        let redacted = redact_audit_params(Some(&params));

        assert_eq!(redacted["auth"], json!(REDACTED));
        assert_eq!(redacted["Authorization"], json!(REDACTED));
        assert_eq!(redacted["author"], json!("Ada"));
        assert_eq!(redacted["authority"], json!("example.org"));
    }

    #[test]
    fn absent_params_audit_as_null() {
        assert_eq!(redact_audit_params(None), Value::Null);
    }
}
