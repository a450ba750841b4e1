//! Raw publish request, as received from an outer transport layer.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use agrocatalog_core::{DomainError, DomainResult, Location, ProducerId, ProductId};
use agrocatalog_producers::Reputation;
use agrocatalog_products::{
    Category, NewProduct, ProductDescription, ProductImage, ProductName, ProductionType,
    SeasonWindow,
};

use crate::config::CatalogConfig;

pub const SEASON_DATE_FORMAT: &str = "%Y-%m-%d";

/// Validated input for [`crate::CatalogService::publish_product`].
#[derive(Debug, Clone, PartialEq)]
pub struct PublishProduct {
    pub product: NewProduct,
    pub min_reputation: Reputation,
}

/// Unvalidated publish request with plain string fields.
///
/// Season dates use `YYYY-MM-DD` and are read as midnight UTC. A missing or
/// blank `product_id` is replaced by a generated one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PublishProductRequest {
    pub producer_id: String,
    #[serde(default)]
    pub product_id: Option<String>,
    pub name: String,
    pub description: String,
    pub category: String,
    pub production_type: String,
    pub season_start: String,
    pub season_end: String,
    pub zone: String,
    pub farm: String,
    pub image_url: String,
    pub image_description: String,
    #[serde(default)]
    pub min_reputation: Option<f32>,
}

impl PublishProductRequest {
    /// Validate every field into value objects. The first failure wins.
    pub fn into_command(self, config: &CatalogConfig, now: DateTime<Utc>) -> DomainResult<PublishProduct> {
        let id = match self.product_id {
            Some(id) if !id.trim().is_empty() => ProductId::new(id),
            _ => ProductId::generate(),
        };

        let season = SeasonWindow::new_at(
            parse_date("season_start", &self.season_start)?,
            parse_date("season_end", &self.season_end)?,
            now,
        )?;

        let product = NewProduct {
            id,
            name: ProductName::new(self.name)?,
            description: ProductDescription::new(self.description)?,
            category: self.category.parse::<Category>()?,
            production_type: ProductionType::new(self.production_type)?,
            season,
            location: Location::new(self.zone, self.farm)?,
            image: ProductImage::new(self.image_url, self.image_description)?,
            producer_id: ProducerId::new(self.producer_id),
        };

        let min_reputation =
            Reputation::new(self.min_reputation.unwrap_or(config.default_min_reputation))?;

        Ok(PublishProduct {
            product,
            min_reputation,
        })
    }
}

fn parse_date(field: &str, raw: &str) -> DomainResult<DateTime<Utc>> {
    NaiveDate::parse_from_str(raw.trim(), SEASON_DATE_FORMAT)
        .map(|date| date.and_time(chrono::NaiveTime::MIN).and_utc())
        .map_err(|e| DomainError::validation(format!("{field} must be a YYYY-MM-DD date ({e})")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn request() -> PublishProductRequest {
        PublishProductRequest {
            producer_id: "farmer-1".into(),
            product_id: Some("prod-1".into()),
            name: "Papa criolla".into(),
            description: "Papa criolla de clima frío, sin químicos".into(),
            category: "Tuber".into(),
            production_type: "Agroecological".into(),
            season_start: "2025-09-01".into(),
            season_end: "2025-12-01".into(),
            zone: "Vereda Santa Rosa".into(),
            farm: "Finca Los Pinos".into(),
            image_url: "https://img.example/papa.jpg".into(),
            image_description: "papa criolla".into(),
            min_reputation: None,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn converts_valid_request() {
        let cmd = request().into_command(&CatalogConfig::default(), now()).unwrap();

        assert_eq!(cmd.product.id, ProductId::new("prod-1"));
        assert_eq!(cmd.product.category, Category::Tuber);
        assert_eq!(
            cmd.product.season.start(),
            Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(cmd.min_reputation.value(), 4.0);
    }

    #[test]
    fn explicit_min_reputation_wins_over_config() {
        let mut req = request();
        req.min_reputation = Some(2.5);
        let cmd = req.into_command(&CatalogConfig::default(), now()).unwrap();
        assert_eq!(cmd.min_reputation.value(), 2.5);
    }

    #[test]
    fn missing_product_id_is_generated() {
        let mut req = request();
        req.product_id = None;
        let cmd = req.into_command(&CatalogConfig::default(), now()).unwrap();
        assert!(!cmd.product.id.is_blank());
    }

    #[test]
    fn rejects_malformed_fields() {
        let config = CatalogConfig::default();

        let mut req = request();
        req.season_start = "01/09/2025".into();
        assert!(matches!(req.into_command(&config, now()), Err(DomainError::Validation(_))));

        let mut req = request();
        req.category = "Cereal".into();
        assert!(matches!(req.into_command(&config, now()), Err(DomainError::Validation(_))));

        let mut req = request();
        req.image_url = "ftp://img.example/papa.jpg".into();
        assert!(matches!(req.into_command(&config, now()), Err(DomainError::Validation(_))));

        let mut req = request();
        req.min_reputation = Some(9.0);
        assert!(matches!(req.into_command(&config, now()), Err(DomainError::Validation(_))));
    }

    #[test]
    fn deserializes_from_json() {
        let json = serde_json::json!({
            "producer_id": "farmer-1",
            "name": "Papa criolla",
            "description": "Papa criolla de clima frío, sin químicos",
            "category": "Tubérculo",
            "production_type": "Organic",
            "season_start": "2025-09-01",
            "season_end": "2025-12-01",
            "zone": "Vereda Santa Rosa",
            "farm": "Finca Los Pinos",
            "image_url": "https://img.example/papa.jpg",
            "image_description": "papa criolla"
        });
        let req: PublishProductRequest = serde_json::from_value(json).unwrap();
        assert_eq!(req.product_id, None);
        assert_eq!(req.min_reputation, None);

        let cmd = req.into_command(&CatalogConfig::default(), now()).unwrap();
        assert_eq!(cmd.product.category, Category::Tuber);
    }
}
