use std::sync::Arc;

use anyhow::Context;
use chrono::{Duration, Utc};

use agrocatalog_core::Location;
use agrocatalog_events::{Event, EventBus, InMemoryEventBus};
use agrocatalog_infra::{
    CatalogConfig, CatalogEvent, CatalogService, ProducerStore, ProductStore, PublishProductRequest,
};
use agrocatalog_producers::{
    ActivityStatus, CultivationPractices, ProducerDraft, ProducerName, Reputation,
    VerificationStatus,
};

fn main() -> anyhow::Result<()> {
    let config = CatalogConfig::from_env().context("invalid catalog configuration")?;
    agrocatalog_observability::init_with_filter(&config.log_filter);

    let bus: Arc<InMemoryEventBus<CatalogEvent>> = Arc::new(InMemoryEventBus::new());
    let subscription = bus.subscribe();
    std::thread::spawn(move || {
        while let Ok(event) = subscription.recv() {
            tracing::info!(
                event_type = event.event_type(),
                subject = event.subject_id(),
                "catalog event"
            );
        }
    });

    let service = CatalogService::with_config(ProductStore::new(), ProducerStore::new(), bus, config);

    // Seed one producer and walk it through verification.
    let location = Location::new("Vereda San Isidro", "Finca La Montaña")?;
    let producer = service.register_producer(ProducerDraft {
        name: ProducerName::new("Red de Mujeres Campesinas")?,
        location: location.clone(),
        verification: VerificationStatus::Unverified,
        activity: ActivityStatus::Active,
        reputation: Reputation::new(4.0)?,
        practices: CultivationPractices::new("Semillas nativas, compost y control biológico")?,
    })?;
    let producer_id = producer.id_typed().clone();

    service.start_verification(&producer_id)?;
    service.complete_verification(&producer_id)?;
    service.update_reputation(&producer_id, 4.7)?;

    let today = Utc::now();
    let product = service.publish_product_request(PublishProductRequest {
        producer_id: producer_id.to_string(),
        product_id: None,
        name: "Mora de castilla".into(),
        description: "Mora cosechada a mano, sin agroquímicos".into(),
        category: "Fruta".into(),
        production_type: "Agroecological".into(),
        season_start: today.format("%Y-%m-%d").to_string(),
        season_end: (today + Duration::days(90)).format("%Y-%m-%d").to_string(),
        zone: location.zone().to_string(),
        farm: location.farm().to_string(),
        image_url: "https://img.example/mora.jpg".into(),
        image_description: "mora de castilla".into(),
        min_reputation: None,
    })?;
    tracing::info!(product_id = %product.id_typed(), "demo product published");

    let report = service.recompute_availability(Utc::now())?;
    tracing::info!(?report, "seasonal recompute finished");

    let zone = service.zone_available_products(&location);
    tracing::info!(count = zone.len(), zone = location.zone(), "available products in zone");

    let catalog = service.full_catalog();
    println!("{}", serde_json::to_string_pretty(&catalog)?);

    Ok(())
}
