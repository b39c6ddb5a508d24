//! Zabbix records: one item value becomes one gauge, named through the
//! rule store.

use super::fields::{as_record, lenient_f64, lenient_i64, lenient_u64, scalar_text, text, Record};
use crate::core::otel_compliance::{attributes as attr, now_seconds, seconds_to_nanos};
use crate::core::{Attributes, CanonicalMetric, DataPoint, ResourceEnvelope, Result};
use crate::rules::SharedRules;
use serde_json::Value;
use std::borrow::Cow;

/// Item value types that carry a number (float and unsigned).
pub const ACCEPTED_TYPES: [i64; 2] = [0, 3];

const DEFAULT_NAME: &str = "zabbix.metric";

/// Maps Zabbix item values.
#[derive(Clone)]
pub struct ZabbixMapper {
    rules: SharedRules,
}

impl ZabbixMapper {
    /// Create a mapper reading names through `rules`
    pub fn new(rules: SharedRules) -> Self {
        Self { rules }
    }

    /// Handle for reloading the rules this mapper uses
    pub fn rules(&self) -> &SharedRules {
        &self.rules
    }

    /// Map one item value. `Ok(None)` means the record is not a numeric
    /// item and should be dropped.
    pub fn map(&self, record: &Value, input_topic: &str) -> Result<Option<ResourceEnvelope>> {
        let record = as_record(record)?;

        let item_type = record.get("type").and_then(lenient_i64);
        if !item_type.is_some_and(|t| ACCEPTED_TYPES.contains(&t)) {
            tracing::trace!(?item_type, "Skipping non-numeric Zabbix item");
            return Ok(None);
        }

        let clock = record
            .get("clock")
            .and_then(lenient_u64)
            .unwrap_or_else(now_seconds);
        let ns = record.get("ns").and_then(lenient_u64).unwrap_or(0);
        let time_unix_nano = seconds_to_nanos(clock, ns);

        let raw_name = text(record, "name")
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(Cow::Borrowed(DEFAULT_NAME));
        // Spaces are the only characters normalized in the final name.
        let parsed = self.rules.load().apply(&raw_name);
        let metric_name = parsed.base_or(&raw_name).replace(' ', "_");

        let value = record.get("value").and_then(lenient_f64).unwrap_or(0.0);
        let host = host_name(record);

        let mut resource = Attributes::new();
        if let Some(host) = host.as_deref() {
            resource.push(attr::HOST_NAME, host);
        }
        resource.push(attr::SOURCE, "zabbix");
        resource.push(attr::KAFKA_TOPIC, input_topic);
        if let Some(groups) = record.get("groups").and_then(Value::as_array) {
            for group in groups.iter().filter_map(scalar_text) {
                resource.push(attr::ZABBIX_GROUP, group);
            }
        }
        if let Some(item_id) = text(record, "itemid") {
            resource.push(attr::ZABBIX_ITEM_ID, item_id);
        }
        if let Some(t) = text(record, "type") {
            resource.push(attr::ZABBIX_TYPE, t);
        }

        let mut point_attributes = Attributes::new();
        if let Some(host) = host.as_deref() {
            point_attributes.push(attr::HOST_NAME, host);
        }
        for (key, val) in parsed.attributes.iter().filter(|(_, v)| !v.is_empty()) {
            point_attributes.push(key, val);
        }
        if let Some(tags) = record.get("item_tags").and_then(Value::as_array) {
            for tag in tags.iter().filter_map(Value::as_object) {
                if let (Some(k), Some(v)) = (text(tag, "tag"), text(tag, "value")) {
                    point_attributes.push(format!("{}{}", attr::ZABBIX_TAG_PREFIX, k), v);
                }
            }
        }

        let mut envelope = ResourceEnvelope::new(resource);
        envelope.push_metric(CanonicalMetric::gauge(
            metric_name,
            None,
            DataPoint::new(value, time_unix_nano).with_attributes(point_attributes),
        ));
        Ok(Some(envelope))
    }
}

/// `host` is either a plain string or an object carrying `name`/`host`.
fn host_name(record: &Record) -> Option<String> {
    let host = match record.get("host")? {
        Value::Object(obj) => text(obj, "name").or_else(|| text(obj, "host")),
        other => scalar_text(other),
    };
    host.filter(|h| !h.is_empty()).map(|h| h.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{shared, RuleStore};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn mapper() -> ZabbixMapper {
        ZabbixMapper::new(shared(RuleStore::load(None)))
    }

    fn point(env: &ResourceEnvelope) -> &DataPoint {
        &env.metrics[0].data_points[0]
    }

    #[test]
    fn test_type_filter() {
        let m = mapper();
        for t in [json!(1), json!(2), json!(4), json!("text"), json!(null)] {
            let rec = json!({"type": t, "name": "x", "value": 1});
            assert!(m.map(&rec, "z").unwrap().is_none(), "type {t} should be skipped");
        }
        assert!(m.map(&json!({"name": "x", "value": 1}), "z").unwrap().is_none());

        assert!(m.map(&json!({"type": 0, "name": "x"}), "z").unwrap().is_some());
        assert!(m.map(&json!({"type": "3", "name": "x"}), "z").unwrap().is_some());
    }

    #[test]
    fn test_timestamp_from_clock_and_ns() {
        let rec = json!({"type": 0, "clock": 1700000000, "ns": 500000000, "name": "x", "value": 1});
        let env = mapper().map(&rec, "z").unwrap().unwrap();
        assert_eq!(point(&env).timestamp_nanos, 1_700_000_000_500_000_000);
    }

    #[test]
    fn test_missing_clock_uses_now() {
        let before = now_seconds();
        let env = mapper().map(&json!({"type": 0, "name": "x"}), "z").unwrap().unwrap();
        assert!(point(&env).timestamp_nanos >= before * 1_000_000_000);
    }

    #[test]
    fn test_value_coercion() {
        let m = mapper();
        let from_str = m.map(&json!({"type": 0, "value": "12.5"}), "z").unwrap().unwrap();
        let from_num = m.map(&json!({"type": 0, "value": 12.5}), "z").unwrap().unwrap();
        assert_eq!(point(&from_str).value, 12.5);
        assert_eq!(point(&from_str).value, point(&from_num).value);

        let junk = m.map(&json!({"type": 0, "value": "n/a"}), "z").unwrap().unwrap();
        assert_eq!(point(&junk).value, 0.0);
    }

    #[test]
    fn test_unmatched_name_replaces_spaces_only() {
        let rec = json!({"type": 0, "name": "CPU Load Average", "value": 1});
        let env = mapper().map(&rec, "z").unwrap().unwrap();
        assert_eq!(env.metrics[0].name, "CPU_Load_Average");

        let rec = json!({"type": 0, "name": "Ping loss, %", "value": 1});
        let env = mapper().map(&rec, "z").unwrap().unwrap();
        assert_eq!(env.metrics[0].name, "Ping_loss,_%");
    }

    #[test]
    fn test_missing_name_uses_default() {
        let env = mapper().map(&json!({"type": 0}), "z").unwrap().unwrap();
        assert_eq!(env.metrics[0].name, "zabbix.metric");
    }

    #[test]
    fn test_rule_attributes_merged() {
        let rec = json!({
            "type": 3,
            "clock": 1700000000,
            "ns": 0,
            "name": "Interface eth0(WAN): Bits received",
            "value": 1500,
            "host": {"host": "r1", "name": "Router One"},
            "groups": ["Routers", "Edge"],
            "itemid": 4242,
            "item_tags": [
                {"tag": "component", "value": "network"},
                {"tag": "broken"}
            ]
        });
        let env = mapper().map(&rec, "zabbix.raw").unwrap().unwrap();

        assert_eq!(env.metrics[0].name, "Bits_received");
        assert_eq!(env.metrics[0].unit, None);
        assert_eq!(point(&env).value, 1500.0);

        let resource: Vec<_> = env.resource_attributes.iter().collect();
        assert_eq!(
            resource,
            vec![
                ("host.name", "Router One"),
                ("source", "zabbix"),
                ("kafka.topic", "zabbix.raw"),
                ("zabbix.group", "Routers"),
                ("zabbix.group", "Edge"),
                ("zabbix.itemid", "4242"),
                ("zabbix.type", "3"),
            ]
        );

        let points: Vec<_> = point(&env).attributes.iter().collect();
        assert_eq!(
            points,
            vec![
                ("host.name", "Router One"),
                ("interface.name", "eth0"),
                ("interface.alias", "WAN"),
                ("zbx.tag.component", "network"),
            ]
        );
    }

    #[test]
    fn test_empty_rule_values_are_dropped() {
        let store = RuleStore::from_yaml(
            "rules:\n  - id: e\n    pattern: '(?P<base>disk)(?P<idx>\\d*)'\n    attributes:\n      - { name: disk.index, from_group: idx }\n",
            "test",
        )
        .unwrap();
        let m = ZabbixMapper::new(shared(store));
        let env = m.map(&json!({"type": 0, "name": "disk", "host": "h"}), "z").unwrap().unwrap();
        assert_eq!(point(&env).attributes.get("disk.index"), None);
        assert_eq!(point(&env).attributes.get("host.name"), Some("h"));
    }

    #[test]
    fn test_host_object_falls_back_to_technical_name() {
        let env = mapper()
            .map(&json!({"type": 0, "host": {"host": "tech-01"}}), "z")
            .unwrap()
            .unwrap();
        assert_eq!(env.resource_attributes.get("host.name"), Some("tech-01"));
    }
}
