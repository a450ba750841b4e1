//! Location value object shared by products and producers.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

pub const MAX_ZONE_CHARS: usize = 40;
pub const MAX_FARM_CHARS: usize = 50;

// Letters (including Spanish accented letters), digits, whitespace, hyphen,
// apostrophe and dot.
static ALLOWED_PLACE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-ZáéíóúñüÁÉÍÓÚÑÜ0-9\s\-'\.]+$").expect("static location pattern is valid")
});

/// Where something is produced: a village zone (vereda) and a farm within it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawLocation")]
pub struct Location {
    zone: String,
    farm: String,
}

#[derive(Deserialize)]
struct RawLocation {
    zone: String,
    farm: String,
}

impl TryFrom<RawLocation> for Location {
    type Error = DomainError;

    fn try_from(raw: RawLocation) -> Result<Self, Self::Error> {
        Self::new(raw.zone, raw.farm)
    }
}

impl ValueObject for Location {}

impl Location {
    pub fn new(zone: impl Into<String>, farm: impl Into<String>) -> DomainResult<Self> {
        let zone = zone.into();
        let farm = farm.into();

        if zone.is_empty() || farm.is_empty() {
            return Err(DomainError::validation("zone and farm cannot be empty"));
        }
        if zone.chars().count() > MAX_ZONE_CHARS {
            return Err(DomainError::validation(format!(
                "zone cannot exceed {MAX_ZONE_CHARS} characters"
            )));
        }
        if farm.chars().count() > MAX_FARM_CHARS {
            return Err(DomainError::validation(format!(
                "farm cannot exceed {MAX_FARM_CHARS} characters"
            )));
        }
        ensure_place_name("zone", &zone)?;
        ensure_place_name("farm", &farm)?;

        Ok(Self { zone, farm })
    }

    pub fn zone(&self) -> &str {
        &self.zone
    }

    pub fn farm(&self) -> &str {
        &self.farm
    }
}

fn ensure_place_name(field: &str, value: &str) -> DomainResult<()> {
    if ALLOWED_PLACE_NAME.is_match(value) {
        Ok(())
    } else {
        Err(DomainError::validation(format!(
            "{field} contains characters that are not allowed"
        )))
    }
}
