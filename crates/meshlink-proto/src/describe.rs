//! Best-effort, schema-less rendering of `Config`, `ModuleConfig` and
//! `Channel` messages for diagnostics.
//!
//! Known sections and a few well-known fields get names; everything else is
//! shown by field number. Decoding stops quietly at the first malformed byte.

use std::fmt;

use crate::wire::{FieldReader, WireValue};

const CONFIG_SECTIONS: [&str; 11] = [
    "?", "device", "position", "power", "network", "display", "lora", "bluetooth", "security",
    "sessionkey", "device_ui",
];

const MODULE_SECTIONS: [&str; 16] = [
    "?",
    "mqtt",
    "serial",
    "ext_notif",
    "store_fwd",
    "range_test",
    "telemetry",
    "canned_msg",
    "audio",
    "remote_hw",
    "neighbor_info",
    "ambient_light",
    "detection_sensor",
    "paxcounter",
    "statusmessage",
    "traffic_mgmt",
];

const CHANNEL_ROLES: [&str; 3] = ["DISABLED", "PRIMARY", "SECONDARY"];

/// Which envelope field a section came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Config,
    ModuleConfig,
    Channel,
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Config => "Config",
            Self::ModuleConfig => "ModuleConfig",
            Self::Channel => "Channel",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Uint(u32),
    Text(String),
    /// Binary or long data, shown by size only.
    Blob(usize),
    Fixed32(u32),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uint(value) => write!(f, "{value}"),
            Self::Text(text) => write!(f, "\"{text}\""),
            Self::Blob(len) => write!(f, "({len} bytes)"),
            Self::Fixed32(value) => write!(f, "0x{value:08X}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigField {
    /// Field name, or `section.number` when unknown.
    pub name: String,
    pub value: FieldValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSection {
    pub kind: SectionKind,
    /// Section name such as `lora`, or `3 (SECONDARY)` for channels.
    pub name: String,
    pub fields: Vec<ConfigField>,
}

/// Name of a well-known field inside a config section.
pub fn field_name(section: &str, number: u32) -> Option<&'static str> {
    let name = match (section, number) {
        ("lora", 1) => "use_preset",
        ("lora", 2) => "modem_preset",
        ("lora", 3) => "bandwidth",
        ("lora", 4) => "spread_factor",
        ("lora", 5) => "coding_rate",
        ("lora", 7) => "region",
        ("lora", 8) => "hop_limit",
        ("lora", 9) => "tx_enabled",
        ("lora", 10) => "tx_power",
        ("lora", 11) => "channel_num",
        ("lora", 12) => "override_duty_cycle",
        ("lora", 104) => "ignore_mqtt",
        ("lora", 105) => "config_ok_to_mqtt",
        ("bluetooth", 1) => "enabled",
        ("bluetooth", 2) => "mode",
        ("bluetooth", 3) => "fixed_pin",
        ("network", 1) => "wifi_enabled",
        ("network", 3) => "wifi_ssid",
        ("network", 4) => "wifi_psk",
        ("network", 5) => "ntp_server",
        ("network", 6) => "eth_enabled",
        ("mqtt", 1) => "enabled",
        ("mqtt", 2) => "address",
        ("mqtt", 3) => "username",
        ("mqtt", 4) => "password",
        ("mqtt", 5) => "encryption_enabled",
        ("mqtt", 6) => "json_enabled",
        ("mqtt", 7) => "tls_enabled",
        ("mqtt", 8) => "root",
        ("serial", 1) => "enabled",
        ("serial", 2) => "echo",
        ("serial", 3) => "rxd",
        ("serial", 4) => "txd",
        ("serial", 5) => "baud",
        ("serial", 7) => "mode",
        ("ch_settings", 2) => "psk",
        ("ch_settings", 3) => "name",
        ("ch_settings", 5) => "uplink_enabled",
        ("ch_settings", 6) => "downlink_enabled",
        ("device", 1) => "role",
        ("device", 6) => "rebroadcast_mode",
        ("device", 7) => "node_info_broadcast_secs",
        ("device", 11) => "tzdef",
        ("power", 4) => "sds_secs",
        ("power", 6) => "min_wake_secs",
        ("power", 7) => "ls_secs",
        ("power", 8) => "wait_bluetooth_secs",
        _ => return None,
    };
    Some(name)
}

/// Flat field listing of one section body.
pub fn describe_fields(section: &str, buf: &[u8]) -> Vec<ConfigField> {
    FieldReader::new(buf)
        .map_while(|field| field.ok())
        .filter_map(|field| {
            let value = match field.value {
                WireValue::Varint(value) => FieldValue::Uint(value),
                WireValue::Fixed32(value) => FieldValue::Fixed32(value),
                WireValue::Bytes(raw) => printable(raw)
                    .map(FieldValue::Text)
                    .unwrap_or(FieldValue::Blob(raw.len())),
                WireValue::Fixed64(_) => return None,
            };
            let name = match field_name(section, field.number) {
                Some(name) => name.to_owned(),
                None => format!("{section}.{}", field.number),
            };
            Some(ConfigField { name, value })
        })
        .collect()
}

/// Sections of a `Config` message (one `oneof` arm per message in practice).
pub fn describe_config(buf: &[u8]) -> Vec<ConfigSection> {
    describe_sections(SectionKind::Config, &CONFIG_SECTIONS, buf)
}

/// Sections of a `ModuleConfig` message.
pub fn describe_module_config(buf: &[u8]) -> Vec<ConfigSection> {
    describe_sections(SectionKind::ModuleConfig, &MODULE_SECTIONS, buf)
}

/// A `Channel` message: index, role and its settings.
pub fn describe_channel(buf: &[u8]) -> ConfigSection {
    let mut index = 0;
    let mut role = 0;
    let mut settings: &[u8] = &[];
    for field in FieldReader::new(buf).map_while(|field| field.ok()) {
        match (field.number, field.value) {
            (1, WireValue::Varint(value)) => index = value,
            (2, WireValue::Bytes(raw)) => settings = raw,
            (3, WireValue::Varint(value)) => role = value,
            _ => {}
        }
    }
    let role = CHANNEL_ROLES.get(role as usize).copied().unwrap_or("?");
    ConfigSection {
        kind: SectionKind::Channel,
        name: format!("{index} ({role})"),
        fields: describe_fields("ch_settings", settings),
    }
}

fn describe_sections(kind: SectionKind, names: &[&str], buf: &[u8]) -> Vec<ConfigSection> {
    FieldReader::new(buf)
        .map_while(|field| field.ok())
        .filter_map(|field| {
            let WireValue::Bytes(body) = field.value else {
                return None;
            };
            let name = names.get(field.number as usize).copied().unwrap_or("unknown");
            Some(ConfigSection {
                kind,
                name: name.to_owned(),
                fields: describe_fields(name, body),
            })
        })
        .collect()
}

fn printable(raw: &[u8]) -> Option<String> {
    let is_text =
        !raw.is_empty() && raw.len() < 128 && raw.iter().all(|byte| (0x20..=0x7E).contains(byte));
    is_text.then(|| String::from_utf8_lossy(raw).into_owned())
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use super::*;
    use crate::wire::{encode_field_bytes, encode_field_fixed32, encode_field_varint};

    #[test]
    fn lora_section_uses_known_names() {
        let mut lora = BytesMut::new();
        encode_field_varint(7, 3, &mut lora);
        encode_field_varint(10, 27, &mut lora);
        encode_field_varint(99, 1, &mut lora);
        let mut config = BytesMut::new();
        encode_field_bytes(6, &lora, &mut config);

        let sections = describe_config(&config);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].kind, SectionKind::Config);
        assert_eq!(sections[0].name, "lora");

        let rendered: Vec<String> = sections[0]
            .fields
            .iter()
            .map(|field| format!("{} = {}", field.name, field.value))
            .collect();
        assert_eq!(rendered, ["region = 3", "tx_power = 27", "lora.99 = 1"]);
    }

    #[test]
    fn text_and_blob_values() {
        let mut mqtt = BytesMut::new();
        encode_field_bytes(2, b"mqtt.example.net", &mut mqtt);
        encode_field_bytes(4, &[0x00, 0xFF], &mut mqtt);
        encode_field_fixed32(50, 0xAB, &mut mqtt);

        let fields = describe_fields("mqtt", &mqtt);
        assert_eq!(fields[0].value, FieldValue::Text("mqtt.example.net".into()));
        assert_eq!(fields[1].name, "password");
        assert_eq!(fields[1].value.to_string(), "(2 bytes)");
        assert_eq!(fields[2].value.to_string(), "0x000000AB");
    }

    #[test]
    fn module_section_out_of_range_is_unknown() {
        let mut module = BytesMut::new();
        encode_field_bytes(40, &[0x08, 0x01], &mut module);
        let sections = describe_module_config(&module);
        assert_eq!(sections[0].name, "unknown");
        assert_eq!(sections[0].fields[0].name, "unknown.1");
    }

    #[test]
    fn channel_with_settings() {
        let mut settings = BytesMut::new();
        encode_field_bytes(3, b"LongFast", &mut settings);
        let mut channel = BytesMut::new();
        encode_field_varint(1, 0, &mut channel);
        encode_field_bytes(2, &settings, &mut channel);
        encode_field_varint(3, 1, &mut channel);

        let section = describe_channel(&channel);
        assert_eq!(section.name, "0 (PRIMARY)");
        assert_eq!(section.fields[0].name, "name");
        assert_eq!(section.fields[0].value, FieldValue::Text("LongFast".into()));
    }

    #[test]
    fn truncated_body_stops_quietly() {
        let fields = describe_fields("device", &[0x08, 0x01, 0x12, 0x40]);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "role");
    }
}
