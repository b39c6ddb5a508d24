//! Common test utilities and fixtures.

#![allow(dead_code)]

use metricbridge_lib::encode::{Encoded, OutputFormat};
use metricbridge_lib::mapper::{Mapper, Source};
use metricbridge_lib::pipeline::Pipeline;
use metricbridge_lib::rules::{shared, RuleStore};
use metricbridge_lib::sampling::Sampler;
use opentelemetry_proto::tonic::collector::metrics::v1::ExportMetricsServiceRequest;
use opentelemetry_proto::tonic::common::v1::{any_value, KeyValue};
use opentelemetry_proto::tonic::metrics::v1::{metric, number_data_point};
use serde_json::{json, Value};

/// Mapper for `source` using the bundled rules.
pub fn mapper(source: Source) -> Mapper {
    Mapper::new(source, shared(RuleStore::load(None)))
}

/// Pipeline that admits every record.
pub fn pipeline(source: Source, format: OutputFormat, topic: &str) -> Pipeline {
    Pipeline::new(mapper(source), format, Sampler::always(), topic.to_string())
}

pub fn sevone_record() -> Value {
    json!({
        "time": 1700000000,
        "value": "42.0",
        "deviceName": "r1",
        "deviceIp": "10.0.0.1",
        "objectName": "eth0",
        "objectDesc": "uplink",
        "clusterName": "east",
        "pluginName": "snmp",
        "indicatorName": "if.in.octets",
        "units": "bytes"
    })
}

pub fn zabbix_record() -> Value {
    json!({
        "type": 0,
        "clock": 1700000000,
        "ns": 500000000,
        "name": "FS [/var]: Space utilization",
        "value": "73.25",
        "host": {"host": "db-01", "name": "Database 01"},
        "groups": ["Linux servers"],
        "itemid": "28301",
        "item_tags": [{"tag": "component", "value": "storage"}]
    })
}

pub fn netscout_record() -> Value {
    json!({
        "cal_timestamp_time": "2025-09-09 18:05:00.000000 UTC",
        "device_name": "sensor-7",
        "client_site_name": "Porto",
        "application_name": "DNS",
        "upw_in_bytes_count": 2048,
        "upw_in_packets_count": 12,
        "upw_tcp_rtt_avg": 830.5
    })
}

fn key_values(attributes: &[KeyValue]) -> Value {
    attributes
        .iter()
        .map(|kv| {
            let text = match kv.value.as_ref().and_then(|v| v.value.as_ref()) {
                Some(any_value::Value::StringValue(s)) => s.clone(),
                other => panic!("non-string attribute {}: {:?}", kv.key, other),
            };
            json!({"key": kv.key, "value": {"stringValue": text}})
        })
        .collect()
}

/// Re-express a decoded protobuf request in the OTLP JSON shape.
pub fn proto_as_json(request: &ExportMetricsServiceRequest) -> Value {
    let resource_metrics: Vec<Value> = request
        .resource_metrics
        .iter()
        .map(|rm| {
            let resource = rm.resource.as_ref().expect("resource");
            let scope_metrics: Vec<Value> = rm
                .scope_metrics
                .iter()
                .map(|sm| {
                    let scope = sm.scope.as_ref().expect("scope");
                    let metrics: Vec<Value> = sm
                        .metrics
                        .iter()
                        .map(|m| {
                            let Some(metric::Data::Gauge(gauge)) = &m.data else {
                                panic!("metric {} is not a gauge", m.name);
                            };
                            let points: Vec<Value> = gauge
                                .data_points
                                .iter()
                                .map(|p| {
                                    let Some(number_data_point::Value::AsDouble(v)) = &p.value else {
                                        panic!("point is not a double");
                                    };
                                    json!({
                                        "asDouble": v,
                                        "timeUnixNano": p.time_unix_nano.to_string(),
                                        "attributes": key_values(&p.attributes),
                                    })
                                })
                                .collect();
                            let mut out = json!({"name": m.name, "gauge": {"dataPoints": points}});
                            if !m.unit.is_empty() {
                                out["unit"] = json!(m.unit);
                            }
                            out
                        })
                        .collect();
                    json!({
                        "scope": {"name": scope.name, "version": scope.version},
                        "metrics": metrics,
                    })
                })
                .collect();
            json!({
                "resource": {"attributes": key_values(&resource.attributes)},
                "scopeMetrics": scope_metrics,
            })
        })
        .collect();

    json!({ "resourceMetrics": resource_metrics })
}

/// Unwrap JSON output as a parsed document.
pub fn json_doc(encoded: Encoded) -> Value {
    match encoded {
        Encoded::Json(text) => serde_json::from_str(&text).expect("valid JSON output"),
        Encoded::Protobuf(_) => panic!("expected JSON output"),
    }
}
