//! Value objects describing a catalog product.
//!
//! Every constructor validates its input and fails with
//! `DomainError::Validation`; holding a value means it is valid.

use core::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use agrocatalog_core::{DomainError, DomainResult, ValueObject};

pub const MAX_NAME_CHARS: usize = 100;
pub const MIN_DESCRIPTION_CHARS: usize = 10;
pub const MAX_DESCRIPTION_CHARS: usize = 500;
pub const MAX_SEASON_DAYS: i64 = 365;

/// Display name of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProductName(String);

impl ValueObject for ProductName {}

impl ProductName {
    pub fn new(value: impl Into<String>) -> DomainResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }
        if value.chars().count() > MAX_NAME_CHARS {
            return Err(DomainError::validation(format!(
                "product name cannot exceed {MAX_NAME_CHARS} characters"
            )));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ProductName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProductName> for String {
    fn from(value: ProductName) -> Self {
        value.0
    }
}

/// Free-text description, long enough to be informative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProductDescription(String);

impl ValueObject for ProductDescription {}

impl ProductDescription {
    pub fn new(value: impl Into<String>) -> DomainResult<Self> {
        let value = value.into();
        let len = value.chars().count();
        if len < MIN_DESCRIPTION_CHARS {
            return Err(DomainError::validation(format!(
                "description must be at least {MIN_DESCRIPTION_CHARS} characters"
            )));
        }
        if len > MAX_DESCRIPTION_CHARS {
            return Err(DomainError::validation(format!(
                "description cannot exceed {MAX_DESCRIPTION_CHARS} characters"
            )));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ProductDescription {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProductDescription> for String {
    fn from(value: ProductDescription) -> Self {
        value.0
    }
}

/// Closed set of product categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Fruit,
    Vegetable,
    Tuber,
    MedicinalPlant,
    Dairy,
}

impl ValueObject for Category {}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Fruit,
        Category::Vegetable,
        Category::Tuber,
        Category::MedicinalPlant,
        Category::Dairy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Fruit => "Fruit",
            Category::Vegetable => "Vegetable",
            Category::Tuber => "Tuber",
            Category::MedicinalPlant => "MedicinalPlant",
            Category::Dairy => "Dairy",
        }
    }
}

impl FromStr for Category {
    type Err = DomainError;

    /// Accepts the English tags and the Spanish tags used by existing clients.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Fruit" | "Fruta" => Ok(Category::Fruit),
            "Vegetable" | "Hortaliza" => Ok(Category::Vegetable),
            "Tuber" | "Tubérculo" => Ok(Category::Tuber),
            "MedicinalPlant" | "PlantaMedicinal" => Ok(Category::MedicinalPlant),
            "Dairy" | "Lácteo" => Ok(Category::Dairy),
            other => Err(DomainError::validation(format!("invalid category: {other}"))),
        }
    }
}

impl core::fmt::Display for Category {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the product was grown. Open tag: the well-known values have
/// constructors, anything non-blank is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProductionType(String);

impl ValueObject for ProductionType {}

impl ProductionType {
    pub const AGROECOLOGICAL: &'static str = "Agroecological";
    pub const ORGANIC: &'static str = "Organic";
    pub const TRADITIONAL: &'static str = "Traditional";

    pub fn new(tag: impl Into<String>) -> DomainResult<Self> {
        let tag = tag.into();
        if tag.trim().is_empty() {
            return Err(DomainError::validation("production type cannot be empty"));
        }
        Ok(Self(tag))
    }

    pub fn agroecological() -> Self {
        Self(Self::AGROECOLOGICAL.to_string())
    }

    pub fn organic() -> Self {
        Self(Self::ORGANIC.to_string())
    }

    pub fn traditional() -> Self {
        Self(Self::TRADITIONAL.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ProductionType {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProductionType> for String {
    fn from(value: ProductionType) -> Self {
        value.0
    }
}

/// Date range during which the product is naturally available.
///
/// Deserialization checks the bounds and the length but not `end >= now`,
/// so stored windows that have since ended still load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSeasonWindow")]
pub struct SeasonWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl ValueObject for SeasonWindow {}

impl SeasonWindow {
    /// Validate a window against the current time.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> DomainResult<Self> {
        Self::new_at(start, end, Utc::now())
    }

    /// Validate a window as of `now`: `start <= end`, `end >= now` and the
    /// window spans at most a year.
    pub fn new_at(start: DateTime<Utc>, end: DateTime<Utc>, now: DateTime<Utc>) -> DomainResult<Self> {
        let window = Self::from_bounds(start, end)?;
        if end < now {
            return Err(DomainError::validation("season end cannot be in the past"));
        }
        Ok(window)
    }

    fn from_bounds(start: DateTime<Utc>, end: DateTime<Utc>) -> DomainResult<Self> {
        if end < start {
            return Err(DomainError::validation("season end cannot be before its start"));
        }
        if end - start > Duration::days(MAX_SEASON_DAYS) {
            return Err(DomainError::validation(format!(
                "season cannot last more than {MAX_SEASON_DAYS} days"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Both bounds are inclusive.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }
}

#[derive(Deserialize)]
struct RawSeasonWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<RawSeasonWindow> for SeasonWindow {
    type Error = DomainError;

    fn try_from(raw: RawSeasonWindow) -> Result<Self, Self::Error> {
        Self::from_bounds(raw.start, raw.end)
    }
}

/// Availability state of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Availability {
    Available,
    Depleted,
    Surplus,
}

impl ValueObject for Availability {}

impl Availability {
    pub fn as_str(self) -> &'static str {
        match self {
            Availability::Available => "Available",
            Availability::Depleted => "Depleted",
            Availability::Surplus => "Surplus",
        }
    }
}

impl FromStr for Availability {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Available" | "Disponible" => Ok(Availability::Available),
            "Depleted" | "Agotado" => Ok(Availability::Depleted),
            "Surplus" | "Excedente" => Ok(Availability::Surplus),
            other => Err(DomainError::validation(format!(
                "invalid availability state: {other}"
            ))),
        }
    }
}

impl core::fmt::Display for Availability {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Product picture plus a short accessibility description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawProductImage")]
pub struct ProductImage {
    url: String,
    description: String,
}

impl ValueObject for ProductImage {}

impl ProductImage {
    pub fn new(url: impl Into<String>, description: impl Into<String>) -> DomainResult<Self> {
        let url = url.into();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(DomainError::validation("image URL must start with http:// or https://"));
        }
        Ok(Self {
            url,
            description: description.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

#[derive(Deserialize)]
struct RawProductImage {
    url: String,
    description: String,
}

impl TryFrom<RawProductImage> for ProductImage {
    type Error = DomainError;

    fn try_from(raw: RawProductImage) -> Result<Self, Self::Error> {
        Self::new(raw.url, raw.description)
    }
}
