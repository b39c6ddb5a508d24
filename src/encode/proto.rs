//! OTLP protobuf rendering.

use super::validate;
use crate::core::{Attributes, CanonicalMetric, ResourceEnvelope, Result};
use opentelemetry_proto::tonic::{
    collector::metrics::v1::ExportMetricsServiceRequest,
    common::v1::{any_value::Value, AnyValue, InstrumentationScope, KeyValue},
    metrics::v1::{
        metric::Data, number_data_point::Value as PointValue, Gauge, Metric, NumberDataPoint,
        ResourceMetrics, ScopeMetrics,
    },
    resource::v1::Resource,
};
use prost::Message;

fn key_values(attributes: &Attributes) -> Vec<KeyValue> {
    attributes
        .iter()
        .map(|(key, value)| KeyValue {
            key: key.to_string(),
            value: Some(AnyValue {
                value: Some(Value::StringValue(value.to_string())),
            }),
        })
        .collect()
}

fn to_metric(metric: &CanonicalMetric) -> Metric {
    let data_points = metric
        .data_points
        .iter()
        .map(|point| NumberDataPoint {
            attributes: key_values(&point.attributes),
            start_time_unix_nano: 0,
            time_unix_nano: point.timestamp_nanos,
            value: Some(PointValue::AsDouble(point.value)),
            exemplars: vec![],
            flags: 0,
        })
        .collect();

    Metric {
        name: metric.name.clone(),
        description: String::new(),
        unit: metric.unit.clone().unwrap_or_default(),
        metadata: vec![],
        data: Some(Data::Gauge(Gauge { data_points })),
    }
}

/// Build the `ExportMetricsServiceRequest` for `envelope`.
pub fn to_request(envelope: &ResourceEnvelope) -> ExportMetricsServiceRequest {
    ExportMetricsServiceRequest {
        resource_metrics: vec![ResourceMetrics {
            resource: Some(Resource {
                attributes: key_values(&envelope.resource_attributes),
                dropped_attributes_count: 0,
            }),
            scope_metrics: vec![ScopeMetrics {
                scope: Some(InstrumentationScope {
                    name: envelope.scope_name.clone(),
                    version: envelope.scope_version.clone(),
                    attributes: vec![],
                    dropped_attributes_count: 0,
                }),
                metrics: envelope.metrics.iter().map(to_metric).collect(),
                schema_url: String::new(),
            }],
            schema_url: String::new(),
        }],
    }
}

/// Render `envelope` as a binary `ExportMetricsServiceRequest`.
pub fn encode_proto(envelope: &ResourceEnvelope) -> Result<Vec<u8>> {
    validate(envelope)?;
    Ok(to_request(envelope).encode_to_vec())
}
