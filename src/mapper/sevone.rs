//! SevOne records: one indicator reading becomes one gauge.

use super::fields::{as_record, lenient_f64, lenient_u64, text_or};
use crate::core::otel_compliance::{attributes as attr, seconds_to_nanos};
use crate::core::{Attributes, BridgeError, CanonicalMetric, DataPoint, ResourceEnvelope, Result};
use serde_json::Value;

const DEFAULT_NAME: &str = "sevone.metric";

/// Maps SevOne indicator readings. The only mapper whose output may be
/// requested as protobuf.
#[derive(Debug, Clone, Default)]
pub struct SevoneMapper;

impl SevoneMapper {
    /// Create a mapper
    pub fn new() -> Self {
        Self
    }

    /// Map one reading. `time` and a numeric `value` are required.
    pub fn map(&self, record: &Value, input_topic: &str) -> Result<ResourceEnvelope> {
        let record = as_record(record)?;

        let time = record
            .get("time")
            .and_then(lenient_u64)
            .ok_or_else(|| BridgeError::mapping("SevOne record has no usable 'time'"))?;
        let value = record
            .get("value")
            .and_then(lenient_f64)
            .ok_or_else(|| BridgeError::mapping("SevOne record has no numeric 'value'"))?;

        let cluster = text_or(record, "clusterName", "");
        let plugin = text_or(record, "pluginName", "");

        let mut resource = Attributes::new();
        resource.push(attr::CLUSTER_NAME, cluster.as_ref());
        resource.push(attr::PLUGIN_NAME, plugin.as_ref());
        resource.push(attr::KAFKA_TOPIC, input_topic);

        let mut point_attributes = Attributes::new();
        point_attributes.push(attr::DEVICE_NAME, text_or(record, "deviceName", ""));
        point_attributes.push(attr::DEVICE_IP, text_or(record, "deviceIp", ""));
        point_attributes.push(attr::OBJECT_NAME, text_or(record, "objectName", ""));
        point_attributes.push(attr::OBJECT_DESCRIPTION, text_or(record, "objectDesc", ""));
        point_attributes.push(attr::CLUSTER_NAME, cluster);
        point_attributes.push(attr::PLUGIN_NAME, plugin);
        point_attributes.push(attr::KAFKA_TOPIC, input_topic);

        let mut envelope = ResourceEnvelope::new(resource);
        envelope.push_metric(CanonicalMetric::gauge(
            text_or(record, "indicatorName", DEFAULT_NAME),
            Some(text_or(record, "units", "").into_owned()),
            DataPoint::new(value, seconds_to_nanos(time, 0)).with_attributes(point_attributes),
        ));
        Ok(envelope)
    }
}
