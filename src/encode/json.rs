//! OTLP JSON rendering.
//!
//! Follows the OTLP/JSON mapping: lowerCamelCase field names, 64-bit
//! integers as decimal strings, attribute values as `{"stringValue": ..}`.

use super::validate;
use crate::core::{Attributes, ResourceEnvelope, Result};
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MetricsDocument<'a> {
    resource_metrics: [ResourceMetricsJson<'a>; 1],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResourceMetricsJson<'a> {
    resource: ResourceJson<'a>,
    scope_metrics: [ScopeMetricsJson<'a>; 1],
}

#[derive(Serialize)]
struct ResourceJson<'a> {
    attributes: Vec<KeyValueJson<'a>>,
}

#[derive(Serialize)]
struct ScopeMetricsJson<'a> {
    scope: ScopeJson<'a>,
    metrics: Vec<MetricJson<'a>>,
}

#[derive(Serialize)]
struct ScopeJson<'a> {
    name: &'a str,
    version: &'a str,
}

#[derive(Serialize)]
struct MetricJson<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    unit: Option<&'a str>,
    gauge: GaugeJson<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GaugeJson<'a> {
    data_points: Vec<DataPointJson<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DataPointJson<'a> {
    as_double: f64,
    time_unix_nano: String,
    attributes: Vec<KeyValueJson<'a>>,
}

#[derive(Serialize)]
struct KeyValueJson<'a> {
    key: &'a str,
    value: StringValueJson<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StringValueJson<'a> {
    string_value: &'a str,
}

fn key_values(attributes: &Attributes) -> Vec<KeyValueJson<'_>> {
    attributes
        .iter()
        .map(|(key, value)| KeyValueJson {
            key,
            value: StringValueJson { string_value: value },
        })
        .collect()
}

/// Render `envelope` as a single OTLP JSON document.
pub fn encode_json(envelope: &ResourceEnvelope) -> Result<String> {
    validate(envelope)?;

    let metrics = envelope
        .metrics
        .iter()
        .map(|metric| MetricJson {
            name: &metric.name,
            unit: metric.unit.as_deref(),
            gauge: GaugeJson {
                data_points: metric
                    .data_points
                    .iter()
                    .map(|point| DataPointJson {
                        as_double: point.value,
                        time_unix_nano: point.timestamp_nanos.to_string(),
                        attributes: key_values(&point.attributes),
                    })
                    .collect(),
            },
        })
        .collect();

    let document = MetricsDocument {
        resource_metrics: [ResourceMetricsJson {
            resource: ResourceJson {
                attributes: key_values(&envelope.resource_attributes),
            },
            scope_metrics: [ScopeMetricsJson {
                scope: ScopeJson {
                    name: &envelope.scope_name,
                    version: &envelope.scope_version,
                },
                metrics,
            }],
        }],
    };

    Ok(serde_json::to_string(&document)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CanonicalMetric, DataPoint};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    #[test]
    fn test_document_shape() {
        let mut env = ResourceEnvelope::new([("source", "zabbix")].into_iter().collect());
        env.push_metric(CanonicalMetric::gauge(
            "cpu.load",
            Some("1".to_string()),
            DataPoint::new(0.5, 1_700_000_000_500_000_000)
                .with_attributes([("host.name", "h1")].into_iter().collect()),
        ));

        let doc: Value = serde_json::from_str(&encode_json(&env).unwrap()).unwrap();
        assert_eq!(
            doc,
            json!({
                "resourceMetrics": [{
                    "resource": {
                        "attributes": [{"key": "source", "value": {"stringValue": "zabbix"}}]
                    },
                    "scopeMetrics": [{
                        "scope": {"name": "kafka", "version": "streams"},
                        "metrics": [{
                            "name": "cpu.load",
                            "unit": "1",
                            "gauge": {
                                "dataPoints": [{
                                    "asDouble": 0.5,
                                    "timeUnixNano": "1700000000500000000",
                                    "attributes": [
                                        {"key": "host.name", "value": {"stringValue": "h1"}}
                                    ]
                                }]
                            }
                        }]
                    }]
                }]
            })
        );
    }

    #[test]
    fn test_unit_omitted_when_absent() {
        let mut env = ResourceEnvelope::new(Attributes::new());
        env.push_metric(CanonicalMetric::gauge("m", None, DataPoint::new(1.0, 1)));
        let text = encode_json(&env).unwrap();
        assert!(!text.contains("\"unit\""));
    }

    #[test]
    fn test_duplicate_keys_kept() {
        let mut env = ResourceEnvelope::new(
            [("zabbix.group", "a"), ("zabbix.group", "b")].into_iter().collect(),
        );
        env.push_metric(CanonicalMetric::gauge("m", None, DataPoint::new(1.0, 1)));
        let doc: Value = serde_json::from_str(&encode_json(&env).unwrap()).unwrap();
        let attrs = doc["resourceMetrics"][0]["resource"]["attributes"].as_array().unwrap();
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[1]["value"]["stringValue"], "b");
    }
}
