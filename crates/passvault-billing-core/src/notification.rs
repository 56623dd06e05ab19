//! PayHere payment notification
//!
//! PayHere posts its notify callback form-encoded; some integrations relay
//! it as JSON, where numeric fields may arrive as numbers. Both shapes are
//! read from a JSON object.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::BillingError;

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Num(n) => n.to_string(),
    })
}

fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(serde_json::Number),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Str(s)) => Some(s),
        Some(Raw::Num(n)) => Some(n.to_string()),
        None => None,
    })
}

/// Fields of a payment notification used by reconciliation
#[derive(Debug, Clone, Deserialize)]
pub struct PayHereNotification {
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub merchant_id: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub order_id: String,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub payment_id: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub payhere_amount: String,
    pub payhere_currency: String,
    #[serde(deserialize_with = "string_or_number")]
    pub status_code: String,
    pub md5sig: String,
    #[serde(default)]
    pub status_message: Option<String>,
    /// Plan name chosen at checkout
    #[serde(default)]
    pub custom_1: Option<String>,
    /// Order id echoed back at checkout
    #[serde(default)]
    pub custom_2: Option<String>,
    /// Every received field except `md5sig`, kept as payment metadata
    #[serde(skip)]
    pub raw: Map<String, Value>,
}

impl PayHereNotification {
    /// Read a notification from a JSON object
    pub fn from_value(value: Value) -> Result<Self, BillingError> {
        let Value::Object(mut fields) = value else {
            return Err(BillingError::MalformedPayload("expected an object".to_string()));
        };

        let mut notification: Self = serde_json::from_value(Value::Object(fields.clone()))
            .map_err(|e| BillingError::MalformedPayload(e.to_string()))?;

        fields.remove("md5sig");
        notification.raw = fields;
        Ok(notification)
    }

    /// Read a notification from decoded form fields
    pub fn from_form<I, K, V>(pairs: I) -> Result<Self, BillingError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let fields: Map<String, Value> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), Value::String(v.into())))
            .collect();
        Self::from_value(Value::Object(fields))
    }
}
