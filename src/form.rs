//! The per-person submission form

use crate::codec;
use crate::error::Result;
use crate::types::{HealthReport, Identity};
use std::fmt;

/// Where the person currently is
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    /// Province
    pub province: String,
    /// City
    pub city: String,
    /// County / district
    pub county: String,
    /// Street address
    pub street: String,
}

/// Immutable input for one check-in
///
/// The identity token and the full address are computed once here and reused
/// by every request the submitter makes.
#[derive(Clone, PartialEq, Eq)]
pub struct Form {
    sn: String,
    nickname: String,
    login_token: String,
    location: Location,
    address: String,
    in_school: bool,
    left_region: bool,
}

impl Form {
    /// Build a form, encoding the identity into its transport token
    pub fn new(
        identity: &Identity,
        location: Location,
        in_school: bool,
        left_region: bool,
    ) -> Result<Self> {
        let login_token = codec::encode(identity)?;
        let address = format!(
            "{}{}{}{}",
            location.province, location.city, location.county, location.street
        );

        Ok(Self {
            sn: identity.sn.clone(),
            nickname: identity.nickname.clone(),
            login_token,
            location,
            address,
            in_school,
            left_region,
        })
    }

    /// Serial number of the identity
    pub fn sn(&self) -> &str {
        &self.sn
    }

    /// Display name of the identity
    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    /// Encoded `{sn, idCard, nickname}` sent to the login endpoints
    pub fn login_token(&self) -> &str {
        &self.login_token
    }

    /// Location fields
    pub const fn location(&self) -> &Location {
        &self.location
    }

    /// Province, city, county and street joined without separators
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Currently enrolled on campus
    pub const fn in_school(&self) -> bool {
        self.in_school
    }

    /// Has left the school's region
    pub const fn left_region(&self) -> bool {
        self.left_region
    }

    /// The daily report for this form with the given temperature reading
    pub fn health_report(&self, temperature: &str) -> HealthReport {
        HealthReport {
            diagnosis_name: String::new(),
            relation_with_own: String::new(),
            current_address: self.address.clone(),
            remark: "无".to_string(),
            health_info: "正常".to_string(),
            is_diagnosis: 0,
            is_fever: 0,
            is_in_school: u8::from(self.in_school),
            is_leave_region: u8::from(self.left_region),
            is_symptom: "0".to_string(),
            temperature: temperature.to_string(),
            province: self.location.province.clone(),
            city: self.location.city.clone(),
            county: self.location.county.clone(),
        }
    }
}

// The token carries the credential, keep it out of logs.
impl fmt::Debug for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Form")
            .field("sn", &self.sn)
            .field("nickname", &self.nickname)
            .field("login_token", &"<redacted>")
            .field("address", &self.address)
            .field("in_school", &self.in_school)
            .field("left_region", &self.left_region)
            .finish()
    }
}
