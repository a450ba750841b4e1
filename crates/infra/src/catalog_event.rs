//! The single event type the catalog publishes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use agrocatalog_events::Event;
use agrocatalog_producers::ProducerEvent;
use agrocatalog_products::ProductEvent;

/// Every event either aggregate can emit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "aggregate", content = "event", rename_all = "snake_case")]
pub enum CatalogEvent {
    Product(ProductEvent),
    Producer(ProducerEvent),
}

impl From<ProductEvent> for CatalogEvent {
    fn from(value: ProductEvent) -> Self {
        CatalogEvent::Product(value)
    }
}

impl From<ProducerEvent> for CatalogEvent {
    fn from(value: ProducerEvent) -> Self {
        CatalogEvent::Producer(value)
    }
}

impl Event for CatalogEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CatalogEvent::Product(e) => e.event_type(),
            CatalogEvent::Producer(e) => e.event_type(),
        }
    }

    fn subject_id(&self) -> &str {
        match self {
            CatalogEvent::Product(e) => e.subject_id(),
            CatalogEvent::Producer(e) => e.subject_id(),
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            CatalogEvent::Product(e) => e.occurred_at(),
            CatalogEvent::Producer(e) => e.occurred_at(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrocatalog_core::ProducerId;
    use agrocatalog_producers::ReputationChanged;

    #[test]
    fn serializes_with_aggregate_and_kind_tags() {
        let event = CatalogEvent::from(ProducerEvent::ReputationChanged(ReputationChanged {
            producer_id: ProducerId::new("farmer-1"),
            previous: 3.0,
            reputation: 4.5,
            occurred_at: Utc::now(),
        }));

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["aggregate"], "producer");
        assert_eq!(json["event"]["kind"], "ReputationChanged");
        assert_eq!(json["event"]["reputation"], 4.5);

        assert_eq!(event.event_type(), "catalog.producer.reputation_changed");
        assert_eq!(event.subject_id(), "farmer-1");
    }
}
