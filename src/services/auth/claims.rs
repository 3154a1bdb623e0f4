use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Decoded payload of a verified access token.
///
/// The whole JSON object is kept so provider-specific claims (Okta's `uid`, `scp`,
/// custom claims) stay reachable. Middleware inserts this into request extensions;
/// handlers get it through `VerifiedClaims`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimSet(Map<String, Value>);

impl ClaimSet {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn subject(&self) -> Option<&str> {
        self.str_claim("sub")
    }

    pub fn issuer(&self) -> Option<&str> {
        self.str_claim("iss")
    }

    /// `aud` may be a single string or an array of strings.
    pub fn audiences(&self) -> Vec<&str> {
        match self.0.get("aud") {
            Some(Value::String(s)) => vec![s.as_str()],
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.0.get("exp").and_then(timestamp)
    }

    pub fn not_before(&self) -> Option<DateTime<Utc>> {
        self.0.get("nbf").and_then(timestamp)
    }

    /// Okta puts scopes in `scp` (array); other providers use a space-separated `scope`.
    pub fn scopes(&self) -> Vec<&str> {
        if let Some(Value::Array(items)) = self.0.get("scp") {
            return items.iter().filter_map(Value::as_str).collect();
        }
        self.str_claim("scope")
            .map(|s| s.split_ascii_whitespace().collect())
            .unwrap_or_default()
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }

    fn str_claim(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }
}

// NumericDate: seconds since the epoch, fractions allowed.
fn timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let secs = value.as_i64().or_else(|| value.as_f64().map(|f| f as i64))?;
    DateTime::from_timestamp(secs, 0)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn claims(value: Value) -> ClaimSet {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn standard_claims_are_exposed() {
        let set = claims(json!({
            "iss": "https://dev-123.okta.com/oauth2/default",
            "sub": "00u1ab2cd3",
            "aud": "api://default",
            "exp": 1_700_000_000,
            "nbf": 1_699_990_000.5,
            "uid": "00u1ab2cd3"
        }));

        assert_eq!(set.subject(), Some("00u1ab2cd3"));
        assert_eq!(set.issuer(), Some("https://dev-123.okta.com/oauth2/default"));
        assert_eq!(set.audiences(), vec!["api://default"]);
        assert_eq!(set.expires_at().map(|t| t.timestamp()), Some(1_700_000_000));
        assert_eq!(set.not_before().map(|t| t.timestamp()), Some(1_699_990_000));
        assert_eq!(set.get("uid"), Some(&json!("00u1ab2cd3")));
    }

    #[test]
    fn audience_array_and_scopes() {
        let set = claims(json!({"aud": ["a", "b", 3], "scp": ["openid", "users"]}));
        assert_eq!(set.audiences(), vec!["a", "b"]);
        assert_eq!(set.scopes(), vec!["openid", "users"]);

        let set = claims(json!({"scope": "openid  profile"}));
        assert_eq!(set.scopes(), vec!["openid", "profile"]);
        assert!(set.audiences().is_empty());
        assert_eq!(set.expires_at(), None);
    }

    #[test]
    fn serializes_as_plain_object() {
        let set = claims(json!({"sub": "x"}));
        assert_eq!(serde_json::to_value(&set).unwrap(), json!({"sub": "x"}));
        assert_eq!(set.into_inner().len(), 1);
    }
}
