//! OAuth2 client-credentials token response

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Token endpoint response body
///
/// All fields are optional; numeric values (e.g. `expires_in: 3599`) are kept as strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizationResponse {
    #[serde(deserialize_with = "lenient_string")]
    pub token_type: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub expires_in: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub ext_expire_in: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub expire_on: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub not_before: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub resource: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub access_token: Option<String>,
}

/// Accept a string, number or bool; anything else becomes `None`
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}
