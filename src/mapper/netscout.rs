//! Netscout records: one rich record becomes many gauges.

use super::fields::{as_record, text, Record};
use crate::core::otel_compliance::{attributes as attr, now_nanos};
use crate::core::{Attributes, CanonicalMetric, DataPoint, ResourceEnvelope, Result};
use chrono::NaiveDateTime;
use serde_json::Value;

/// Only top-level numeric fields with this prefix become metrics.
const METRIC_PREFIX: &str = "upw_";
const METRIC_NAMESPACE: &str = "netscout.";
const TIMESTAMP_FIELD: &str = "cal_timestamp_time";
/// e.g. `2025-09-09 18:05:00.000000 UTC`
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f UTC";

/// Maps Netscout records.
#[derive(Debug, Clone, Default)]
pub struct NetscoutMapper;

impl NetscoutMapper {
    /// Create a mapper
    pub fn new() -> Self {
        Self
    }

    /// Build one gauge per `upw_*` numeric field.
    pub fn map(&self, record: &Value, input_topic: &str) -> Result<ResourceEnvelope> {
        let record = as_record(record)?;

        let time_unix_nano = text(record, TIMESTAMP_FIELD)
            .and_then(|ts| parse_cal_timestamp(&ts))
            .unwrap_or_else(now_nanos);

        let mut resource = Attributes::new();
        resource.push(attr::SOURCE, "netscout");
        resource.push_trimmed(attr::KAFKA_TOPIC, Some(input_topic));
        for (key, field) in [
            (attr::DEVICE_NAME, "device_name"),
            (attr::VLAN_NAME, "vlan_name"),
            (attr::CLIENT_SITE, "client_site_name"),
            (attr::APPLICATION_NAME, "application_name"),
            (attr::APPLICATION_GROUP, "application_group"),
            (attr::APP_PROTOCOL_TYPE, "application_protocol_type_code"),
        ] {
            resource.push_trimmed(key, text(record, field).as_deref());
        }

        let point_attributes = point_attributes(record);
        let mut envelope = ResourceEnvelope::new(resource);

        for (name, value) in record {
            if !name.starts_with(METRIC_PREFIX) {
                continue;
            }
            let Some(value) = value.as_f64() else {
                continue;
            };

            let point = DataPoint::new(value, time_unix_nano)
                .with_attributes(point_attributes.clone());
            envelope.push_metric(CanonicalMetric::gauge(
                format!("{METRIC_NAMESPACE}{name}"),
                infer_unit(name).map(str::to_string),
                point,
            ));
        }

        tracing::trace!(metrics = envelope.metrics.len(), "Mapped Netscout record");
        Ok(envelope)
    }
}

fn point_attributes(record: &Record) -> Attributes {
    let mut attrs = Attributes::new();
    attrs.push_trimmed(attr::DEVICE_NAME, text(record, "device_name").as_deref());
    attrs.push_trimmed(attr::CLIENT_SITE, text(record, "client_site_name").as_deref());
    attrs
}

/// Parse `YYYY-MM-DD HH:MM:SS.ffffff UTC` into Unix nanoseconds.
///
/// Returns `None` for blank, malformed or pre-epoch timestamps.
pub fn parse_cal_timestamp(ts: &str) -> Option<u64> {
    if ts.trim().is_empty() {
        return None;
    }
    let naive = NaiveDateTime::parse_from_str(ts, TIMESTAMP_FORMAT).ok()?;
    let nanos = naive.and_utc().timestamp_nanos_opt()?;
    u64::try_from(nanos).ok().filter(|n| *n > 0)
}

/// Guess a unit from the field name.
///
/// Checks run in a fixed order and the first hit wins, so a name such as
/// `upw_bytes_rtt_usec` is reported in bytes.
pub fn infer_unit(name: &str) -> Option<&'static str> {
    if name.ends_with("_bytes_count") || name.contains("bytes") {
        Some("bytes")
    } else if name.ends_with("_packets_count") {
        Some("packets")
    } else if name.ends_with("_kbps") {
        Some("kbps")
    } else if name.ends_with("_millis") {
        Some("ms")
    } else if name.ends_with("_usec") || name.contains("_rtt_") {
        Some("us")
    } else if name.ends_with("_count") {
        Some("count")
    } else {
        None
    }
}
