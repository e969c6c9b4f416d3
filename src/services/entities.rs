// src/services/entities.rs

//! Maps poll results onto platform entities.
//!
//! Three problem-class binary sensors summarise the outage list (hot water,
//! heating, any), and five sensors mirror the status board.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::models::{
    EntityKind, EntityState, LocationConfig, Outage, STATE_UNAVAILABLE, STATUS_RUNNING,
    STATUS_STOPPED, ServiceType, Snapshot, StatusField,
};
use crate::utils::{stable_id, text::slug};

/// Identity shared by every entity of one watched location.
#[derive(Debug, Clone)]
pub struct EntityContext {
    pub street: String,
    pub heat_point: String,
    pub sector: String,
    pub slug: String,
    pub entry_id: String,
}

impl EntityContext {
    pub fn new(location: &LocationConfig) -> Self {
        let street = location.street.trim().to_string();
        let heat_point = location.heat_point.key().to_string();
        let sector = location.sector.key().to_string();
        let entry_id = stable_id(&[street.as_str(), heat_point.as_str(), sector.as_str()]);
        let slug = match slug(&street) {
            s if s.is_empty() => entry_id.clone(),
            s => s,
        };
        Self {
            street,
            heat_point,
            sector,
            slug,
            entry_id,
        }
    }
}

/// What the entities are rendered from.
#[derive(Debug, Clone, Copy)]
pub struct EntityView<'a> {
    /// Latest successful snapshot, if any
    pub snapshot: Option<&'a Snapshot>,

    /// Whether the latest fetch succeeded
    pub available: bool,

    /// When the latest successful fetch ran
    pub last_success: Option<DateTime<Utc>>,
}

/// Alert binary sensor definition.
struct AlertSpec {
    key: &'static str,
    name: &'static str,
    icon_on: &'static str,
    icon_off: &'static str,
    matches: fn(ServiceType) -> bool,
    general: bool,
}

const ALERTS: [AlertSpec; 3] = [
    AlertSpec {
        key: "apa_calda",
        name: "Termo Alertă Apă Caldă",
        icon_on: "mdi:water-alert",
        icon_off: "mdi:water-check",
        matches: |s| s.affects_hot_water(),
        general: false,
    },
    AlertSpec {
        key: "caldura",
        name: "Termo Alertă Căldură",
        icon_on: "mdi:radiator-alert",
        icon_off: "mdi:radiator",
        matches: |s| s.affects_heating(),
        general: false,
    },
    AlertSpec {
        key: "general",
        name: "Termo Alertă Generală",
        icon_on: "mdi:alert-circle-outline",
        icon_off: "mdi:check-circle-outline",
        matches: |_| true,
        general: true,
    },
];

/// Build every entity for the current view.
pub fn build_entities(ctx: &EntityContext, view: EntityView<'_>) -> Vec<EntityState> {
    let mut entities: Vec<EntityState> = ALERTS
        .iter()
        .map(|spec| alert_entity(ctx, spec, view))
        .collect();
    entities.extend(
        StatusField::ALL
            .iter()
            .map(|field| status_entity(ctx, *field, view)),
    );
    entities
}

fn alert_entity(ctx: &EntityContext, spec: &AlertSpec, view: EntityView<'_>) -> EntityState {
    let kind = EntityKind::BinarySensor;
    let entity_id = format!("{}.termo_alert_{}_{}", kind.domain(), spec.key, ctx.slug);
    let mut attributes = Map::new();
    attributes.insert(
        "friendly_name".into(),
        Value::from(format!("{} - {}", spec.name, ctx.street)),
    );
    attributes.insert("device_class".into(), Value::from("problem"));
    attributes.insert(
        "unique_id".into(),
        Value::from(format!("termo_alert_{}_{}", spec.key, ctx.entry_id)),
    );

    let snapshot = match view.snapshot {
        Some(snapshot) if view.available => snapshot,
        _ => {
            attributes.insert("icon".into(), Value::from(spec.icon_on));
            return EntityState {
                entity_id,
                kind,
                state: STATE_UNAVAILABLE.to_string(),
                attributes,
            };
        }
    };

    let matching: Vec<&Outage> = snapshot
        .outages
        .iter()
        .filter(|o| (spec.matches)(o.service))
        .collect();

    let state = match matching.first() {
        Some(latest) => {
            attributes.insert("icon".into(), Value::from(spec.icon_on));
            if spec.general {
                attributes.insert("serviciu_afectat".into(), Value::from(latest.service.label()));
            }
            attributes.insert("cauza".into(), Value::from(latest.cause.as_str()));
            attributes.insert("data_estimata".into(), Value::from(latest.estimated_date.as_str()));
            attributes.insert("ora_estimata".into(), Value::from(latest.estimated_time.as_str()));
            let count_key = if spec.general {
                "total_intreruperi"
            } else {
                "numar_alerta"
            };
            attributes.insert(count_key.into(), Value::from(matching.len()));
            attributes.insert(
                "ultima_detectare".into(),
                Value::from(latest.detected_at.to_rfc3339()),
            );
            "on"
        }
        None => {
            attributes.insert("icon".into(), Value::from(spec.icon_off));
            if spec.general {
                attributes.insert("total_intreruperi".into(), Value::from(0));
            }
            attributes.insert(
                "ultima_verificare".into(),
                view.last_success
                    .map(|t| Value::from(t.to_rfc3339()))
                    .unwrap_or(Value::Null),
            );
            "off"
        }
    };

    EntityState {
        entity_id,
        kind,
        state: state.to_string(),
        attributes,
    }
}

fn status_entity(ctx: &EntityContext, field: StatusField, view: EntityView<'_>) -> EntityState {
    let kind = EntityKind::Sensor;
    let entity_id = format!("{}.cmteb_{}_{}", kind.domain(), field.key(), ctx.slug);
    let mut attributes = Map::new();
    attributes.insert(
        "friendly_name".into(),
        Value::from(format!("CMTEB {} {}", field.display_name(), ctx.street)),
    );
    attributes.insert(
        "unique_id".into(),
        Value::from(format!(
            "cmteb_{}_{}_{}",
            field.key(),
            ctx.entry_id,
            ctx.heat_point
        )),
    );
    attributes.insert("strada".into(), Value::from(ctx.street.as_str()));
    attributes.insert("punct_termic".into(), Value::from(ctx.heat_point.as_str()));
    attributes.insert("sector".into(), Value::from(ctx.sector.as_str()));
    attributes.insert("tip_senzor".into(), Value::from(field.key()));

    let state = match view.snapshot {
        Some(snapshot) if view.available => field.value(&snapshot.status).to_string(),
        _ => STATE_UNAVAILABLE.to_string(),
    };

    if field.is_status() {
        attributes.insert("icon".into(), Value::from(status_icon(&state)));
    }

    EntityState {
        entity_id,
        kind,
        state,
        attributes,
    }
}

fn status_icon(state: &str) -> &'static str {
    match state {
        STATUS_STOPPED => "mdi:alert-octagram",
        STATUS_RUNNING => "mdi:check-circle",
        _ => "mdi:help-circle",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HeatPoint, Sector, StatusBoard, UNSPECIFIED};

    fn ctx() -> EntityContext {
        EntityContext::new(&LocationConfig {
            street: "Str. Lizeanu".to_string(),
            heat_point: HeatPoint::Centru,
            sector: Sector::Sector2,
        })
    }

    fn outage(service: ServiceType, cause: &str) -> Outage {
        Outage {
            street: "Str. Lizeanu".to_string(),
            service,
            cause: cause.to_string(),
            estimated_date: "12.01.2025".to_string(),
            estimated_time: UNSPECIFIED.to_string(),
            detected_at: Utc::now(),
        }
    }

    fn snapshot(outages: Vec<Outage>) -> Snapshot {
        Snapshot {
            fetched_at: Utc::now(),
            outages,
            status: StatusBoard {
                hot_water_status: STATUS_STOPPED.to_string(),
                ..StatusBoard::default()
            },
        }
    }

    fn find<'a>(entities: &'a [EntityState], prefix: &str) -> &'a EntityState {
        entities
            .iter()
            .find(|e| e.entity_id.starts_with(prefix))
            .unwrap()
    }

    #[test]
    fn test_context_ids() {
        let ctx = ctx();
        assert_eq!(ctx.slug, "str_lizeanu");
        assert_eq!(ctx.entry_id.len(), 12);
    }

    #[test]
    fn test_heating_outage_turns_on_heating_and_general_only() {
        let snap = snapshot(vec![outage(ServiceType::Heating, "avarie")]);
        let view = EntityView {
            snapshot: Some(&snap),
            available: true,
            last_success: Some(snap.fetched_at),
        };
        let entities = build_entities(&ctx(), view);
        assert_eq!(entities.len(), 8);

        let hot = find(&entities, "binary_sensor.termo_alert_apa_calda_");
        assert_eq!(hot.state, "off");
        assert_eq!(hot.attributes["icon"], "mdi:water-check");
        assert!(hot.attribute("ultima_verificare").unwrap().is_string());

        let heat = find(&entities, "binary_sensor.termo_alert_caldura_");
        assert_eq!(heat.state, "on");
        assert_eq!(heat.attributes["cauza"], "avarie");
        assert_eq!(heat.attributes["numar_alerta"], 1);

        let general = find(&entities, "binary_sensor.termo_alert_general_");
        assert_eq!(general.state, "on");
        assert_eq!(general.attributes["serviciu_afectat"], "Căldură");
        assert_eq!(general.attributes["total_intreruperi"], 1);
    }

    #[test]
    fn test_active_alert_carries_estimate_and_ids() {
        let ctx = ctx();
        let mut hot_water = outage(ServiceType::HotWater, "spargere");
        hot_water.estimated_time = "18:00".to_string();
        let detected_at = hot_water.detected_at;
        let snap = snapshot(vec![hot_water]);
        let view = EntityView {
            snapshot: Some(&snap),
            available: true,
            last_success: Some(snap.fetched_at),
        };
        let entities = build_entities(&ctx, view);

        let hot = find(&entities, "binary_sensor.termo_alert_apa_calda_");
        assert_eq!(hot.entity_id, "binary_sensor.termo_alert_apa_calda_str_lizeanu");
        assert_eq!(hot.kind, EntityKind::BinarySensor);
        assert_eq!(hot.attributes["data_estimata"], "12.01.2025");
        assert_eq!(hot.attributes["ora_estimata"], "18:00");
        assert_eq!(hot.attributes["ultima_detectare"], detected_at.to_rfc3339());
        assert_eq!(
            hot.attributes["unique_id"],
            format!("termo_alert_apa_calda_{}", ctx.entry_id)
        );
        assert!(hot.attribute("ultima_verificare").is_none());

        let status = find(&entities, "sensor.cmteb_stare_apa_calda_");
        assert_eq!(status.kind, EntityKind::Sensor);
        assert_eq!(status.entity_id, "sensor.cmteb_stare_apa_calda_str_lizeanu");
    }

    #[test]
    fn test_unspecified_service_counts_for_both() {
        let snap = snapshot(vec![
            outage(ServiceType::Unspecified, "defect"),
            outage(ServiceType::HotWater, "spargere"),
        ]);
        let view = EntityView {
            snapshot: Some(&snap),
            available: true,
            last_success: None,
        };
        let entities = build_entities(&ctx(), view);

        let hot = find(&entities, "binary_sensor.termo_alert_apa_calda_");
        assert_eq!(hot.state, "on");
        assert_eq!(hot.attributes["numar_alerta"], 2);
        assert_eq!(hot.attributes["cauza"], "defect");

        let heat = find(&entities, "binary_sensor.termo_alert_caldura_");
        assert_eq!(heat.state, "on");
        assert_eq!(heat.attributes["numar_alerta"], 1);
    }

    #[test]
    fn test_no_outages_general_reports_zero() {
        let snap = snapshot(vec![]);
        let view = EntityView {
            snapshot: Some(&snap),
            available: true,
            last_success: None,
        };
        let entities = build_entities(&ctx(), view);
        let general = find(&entities, "binary_sensor.termo_alert_general_");
        assert_eq!(general.state, "off");
        assert_eq!(general.attributes["total_intreruperi"], 0);
        assert!(general.attribute("ultima_verificare").unwrap().is_null());
    }

    #[test]
    fn test_status_sensors() {
        let snap = snapshot(vec![]);
        let view = EntityView {
            snapshot: Some(&snap),
            available: true,
            last_success: None,
        };
        let entities = build_entities(&ctx(), view);

        let hot = find(&entities, "sensor.cmteb_stare_apa_calda_");
        assert_eq!(hot.state, STATUS_STOPPED);
        assert_eq!(hot.attributes["icon"], "mdi:alert-octagram");
        assert_eq!(hot.attributes["punct_termic"], "centru");
        assert_eq!(hot.attributes["sector"], "sector2");

        let heat = find(&entities, "sensor.cmteb_stare_caldura_");
        assert_eq!(heat.attributes["icon"], "mdi:help-circle");

        let cause = find(&entities, "sensor.cmteb_cauza_");
        assert_eq!(cause.state, "N/A");
        assert!(cause.attribute("icon").is_none());
    }

    #[test]
    fn test_unavailable_marks_every_entity() {
        let snap = snapshot(vec![outage(ServiceType::Heating, "avarie")]);
        let view = EntityView {
            snapshot: Some(&snap),
            available: false,
            last_success: Some(snap.fetched_at),
        };
        let entities = build_entities(&ctx(), view);
        assert!(entities.iter().all(|e| e.is_unavailable()));

        let never = build_entities(
            &ctx(),
            EntityView {
                snapshot: None,
                available: true,
                last_success: None,
            },
        );
        assert!(never.iter().all(|e| e.is_unavailable()));
    }
}
