//! Value objects describing a producer.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use agrocatalog_core::{DomainError, DomainResult, ValueObject};

pub const MAX_NAME_CHARS: usize = 80;
pub const MAX_PRACTICES_CHARS: usize = 500;
pub const MIN_REPUTATION: f32 = 0.0;
pub const MAX_REPUTATION: f32 = 5.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProducerName(String);

impl ValueObject for ProducerName {}

impl ProducerName {
    pub fn new(value: impl Into<String>) -> DomainResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(DomainError::validation("producer name cannot be empty"));
        }
        if value.chars().count() > MAX_NAME_CHARS {
            return Err(DomainError::validation(format!(
                "producer name cannot exceed {MAX_NAME_CHARS} characters"
            )));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ProducerName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProducerName> for String {
    fn from(value: ProducerName) -> Self {
        value.0
    }
}

/// Platform verification lifecycle: Unverified -> InProcess -> Verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerificationStatus {
    Unverified,
    InProcess,
    Verified,
}

impl ValueObject for VerificationStatus {}

impl VerificationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            VerificationStatus::Unverified => "Unverified",
            VerificationStatus::InProcess => "InProcess",
            VerificationStatus::Verified => "Verified",
        }
    }
}

impl FromStr for VerificationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Unverified" | "No Verificado" => Ok(VerificationStatus::Unverified),
            "InProcess" | "En Proceso" => Ok(VerificationStatus::InProcess),
            "Verified" | "Verificado" => Ok(VerificationStatus::Verified),
            other => Err(DomainError::validation(format!(
                "invalid verification status: {other}"
            ))),
        }
    }
}

impl core::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the producer is operating on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityStatus {
    Active,
    Inactive,
    Suspended,
}

impl ValueObject for ActivityStatus {}

impl ActivityStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityStatus::Active => "Active",
            ActivityStatus::Inactive => "Inactive",
            ActivityStatus::Suspended => "Suspended",
        }
    }
}

impl FromStr for ActivityStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" | "Activo" => Ok(ActivityStatus::Active),
            "Inactive" | "Inactivo" => Ok(ActivityStatus::Inactive),
            "Suspended" | "Suspendido" => Ok(ActivityStatus::Suspended),
            other => Err(DomainError::validation(format!("invalid activity status: {other}"))),
        }
    }
}

impl core::fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Average rating of a producer, in `[0, 5]`.
///
/// `Reputation::new` enforces the range. The aggregate may hold an
/// out-of-range value for a producer that is not active (see
/// `Producer::update_reputation`).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct Reputation(f32);

impl ValueObject for Reputation {}

impl Reputation {
    pub fn new(value: f32) -> DomainResult<Self> {
        if !(MIN_REPUTATION..=MAX_REPUTATION).contains(&value) {
            return Err(DomainError::validation(format!(
                "reputation must be between {MIN_REPUTATION} and {MAX_REPUTATION}, got {value}"
            )));
        }
        Ok(Self(value))
    }

    pub(crate) fn unchecked(value: f32) -> Self {
        Self(value)
    }

    pub fn value(self) -> f32 {
        self.0
    }

    pub fn is_in_range(self) -> bool {
        (MIN_REPUTATION..=MAX_REPUTATION).contains(&self.0)
    }
}

impl TryFrom<f32> for Reputation {
    type Error = DomainError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Reputation> for f32 {
    fn from(value: Reputation) -> Self {
        value.0
    }
}

impl core::fmt::Display for Reputation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Description of the cultivation practices a producer follows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CultivationPractices(String);

impl ValueObject for CultivationPractices {}

impl CultivationPractices {
    /// Surrounding whitespace is trimmed before validation.
    pub fn new(value: impl AsRef<str>) -> DomainResult<Self> {
        let value = value.as_ref().trim();
        if value.is_empty() {
            return Err(DomainError::validation("cultivation practices cannot be empty"));
        }
        if value.chars().count() > MAX_PRACTICES_CHARS {
            return Err(DomainError::validation(format!(
                "cultivation practices cannot exceed {MAX_PRACTICES_CHARS} characters"
            )));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CultivationPractices {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CultivationPractices> for String {
    fn from(value: CultivationPractices) -> Self {
        value.0
    }
}
