//! Wire types for the health-reporting service

use crate::codec;
use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Login credentials sent to `checkBind` and `bindUserInfo`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Student serial number
    pub sn: String,
    /// Secret credential (last six digits of the ID card)
    #[serde(rename = "idCard")]
    pub id_card: String,
    /// Display name of the account
    pub nickname: String,
}

/// Uniform response wrapper returned by every endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Business-level success flag
    pub status: bool,
    /// Service error code (0 on success)
    #[serde(default)]
    pub code: i64,
    /// Human-readable failure reason
    #[serde(default)]
    pub message: Option<String>,
    /// Payload, already decoded by [`Envelope::parse`]
    #[serde(default)]
    pub data: Option<Value>,
    /// Unused extra fields
    #[serde(default)]
    pub other_data: Value,
}

impl Envelope {
    /// Parse a raw response body, decoding an encoded `data` field in place
    pub fn parse(body: &str) -> Result<Self> {
        let mut envelope: Self = serde_json::from_str(body)?;
        if let Some(Value::String(encoded)) = &envelope.data {
            envelope.data = Some(codec::decode(encoded)?);
        }
        Ok(envelope)
    }

    /// Convert into a typed outcome
    ///
    /// On success the payload is deserialized into `T` (a null payload is
    /// offered to `T` as JSON `null`). On failure the code and message are kept.
    pub fn into_outcome<T: DeserializeOwned>(self) -> Result<Outcome<T>> {
        if self.status {
            let payload = serde_json::from_value(self.data.unwrap_or(Value::Null))?;
            Ok(Outcome::Success(payload))
        } else {
            Ok(Outcome::Failure(Rejection {
                code: self.code,
                message: self.message.unwrap_or_default(),
            }))
        }
    }
}

/// Result of a single remote step
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum Outcome<T> {
    /// The service accepted the request
    Success(T),
    /// The service rejected the request
    Failure(Rejection),
}

impl<T> Outcome<T> {
    /// Whether the service accepted the request
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Rejection message, empty on success
    pub fn message(&self) -> &str {
        match self {
            Self::Success(_) => "",
            Self::Failure(rejection) => &rejection.message,
        }
    }

    /// Transform the success payload, keeping a rejection as is
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Success(value) => Outcome::Success(f(value)),
            Self::Failure(rejection) => Outcome::Failure(rejection),
        }
    }
}

/// A business-level failure reported in the envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    /// Service error code
    pub code: i64,
    /// Reason given by the service
    pub message: String,
}

/// Decoded payload of `checkBind`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckBindData {
    /// Reported bind state; the service returns the same value either way
    #[serde(default)]
    pub bind: bool,
    /// Session identifier to carry as `JSESSIONID`
    pub session_id: String,
}

/// Decoded payload of a successful `bindUserInfo`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BindData {
    /// The profile now bound to this session
    pub user: UserRecord,
}

/// Profile returned when an identity is bound
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Real name
    #[serde(default)]
    pub name: Option<String>,
    /// Institution (college)
    #[serde(default)]
    pub college: Option<String>,
    /// Class name
    #[serde(default)]
    pub class_name: Option<String>,
    /// Student serial number
    #[serde(default)]
    pub sn: Option<String>,
    /// Major
    #[serde(default)]
    pub major: Option<String>,
    /// Remaining profile fields, untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserRecord {
    /// `college-className-name`, usable to confirm the right person was bound
    pub fn digest(&self) -> String {
        format!(
            "{}-{}-{}",
            self.college.as_deref().unwrap_or_default(),
            self.class_name.as_deref().unwrap_or_default(),
            self.name.as_deref().unwrap_or_default()
        )
    }
}

/// Body of `monitorRegister`, encoded before sending
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    /// Always empty
    pub diagnosis_name: String,
    /// Always empty
    pub relation_with_own: String,
    /// Province + city + county + street
    pub current_address: String,
    /// Always "无"
    pub remark: String,
    /// Always "正常"
    pub health_info: String,
    /// Always 0
    pub is_diagnosis: u8,
    /// Always 0
    pub is_fever: u8,
    /// 1 when currently enrolled on campus
    pub is_in_school: u8,
    /// 1 when the region has been left
    #[serde(rename = "isLeaveChengdu")]
    pub is_leave_region: u8,
    /// Always "0"
    pub is_symptom: String,
    /// One of the normal temperature readings
    pub temperature: String,
    /// Province
    pub province: String,
    /// City
    pub city: String,
    /// County
    pub county: String,
}
