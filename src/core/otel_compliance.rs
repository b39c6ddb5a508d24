//! OpenTelemetry data model conventions shared by every mapper.
//!
//! Timestamps leave this module as nanoseconds since the Unix epoch no
//! matter which unit the vendor reported.

use std::time::{SystemTime, UNIX_EPOCH};

/// Instrumentation scope name stamped on every envelope.
pub const SCOPE_NAME: &str = "kafka";
/// Instrumentation scope version stamped on every envelope.
pub const SCOPE_VERSION: &str = "streams";

/// Nanoseconds in one second.
pub const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// Convert SystemTime to nanoseconds since Unix epoch.
#[inline(always)]
pub fn system_time_to_nanos(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}

/// Current wall-clock time in nanoseconds since Unix epoch.
#[inline(always)]
pub fn now_nanos() -> u64 {
    system_time_to_nanos(SystemTime::now())
}

/// Current wall-clock time in whole seconds since Unix epoch.
#[inline(always)]
pub fn now_seconds() -> u64 {
    now_nanos() / NANOS_PER_SECOND
}

/// Combine a seconds clock and a nanosecond offset.
///
/// Saturates instead of wrapping for clocks past year 2554.
#[inline(always)]
pub fn seconds_to_nanos(seconds: u64, nanos: u64) -> u64 {
    seconds.saturating_mul(NANOS_PER_SECOND).saturating_add(nanos)
}

/// Attribute keys used across vendors.
pub mod attributes {
    /// Vendor that produced the record
    pub const SOURCE: &str = "source";
    /// Topic the record arrived on
    pub const KAFKA_TOPIC: &str = "kafka.topic";

    /// Monitored host
    pub const HOST_NAME: &str = "host.name";
    /// Monitored network device
    pub const DEVICE_NAME: &str = "device.name";
    /// Device management address
    pub const DEVICE_IP: &str = "device.ip";

    /// SevOne object (interface, disk, ...)
    pub const OBJECT_NAME: &str = "object.name";
    /// SevOne object description
    pub const OBJECT_DESCRIPTION: &str = "object.description";
    /// SevOne cluster
    pub const CLUSTER_NAME: &str = "cluster.name";
    /// SevOne collection plugin
    pub const PLUGIN_NAME: &str = "plugin.name";

    /// Netscout VLAN
    pub const VLAN_NAME: &str = "vlan.name";
    /// Netscout client site
    pub const CLIENT_SITE: &str = "client.site";
    /// Netscout application
    pub const APPLICATION_NAME: &str = "application.name";
    /// Netscout application group
    pub const APPLICATION_GROUP: &str = "application.group";
    /// Netscout application protocol type code
    pub const APP_PROTOCOL_TYPE: &str = "app.protocol.type";

    /// Zabbix host group, repeated per group
    pub const ZABBIX_GROUP: &str = "zabbix.group";
    /// Zabbix item id
    pub const ZABBIX_ITEM_ID: &str = "zabbix.itemid";
    /// Zabbix item value type
    pub const ZABBIX_TYPE: &str = "zabbix.type";
    /// Prefix for Zabbix item tags
    pub const ZABBIX_TAG_PREFIX: &str = "zbx.tag.";
}
