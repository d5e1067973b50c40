use std::fmt;

use bytes::Bytes;
use meshlink_proto::{admin, BROADCAST_ADDR};
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const DEFAULT_BOOT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_ACK_TIMEOUT_MS: u64 = 30_000;

/// What to do when the radio has not finished its handshake within
/// [`BridgeConfig::boot_timeout_ms`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BootTimeoutPolicy {
    /// Log a warning and keep retrying the handshake.
    #[default]
    LogOnly,
    /// Power the radio off and on again.
    PowerCycle,
}

/// Bridge configuration.
///
/// Every field is optional in serialized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Time allowed from power-on until the handshake completes.
    pub boot_timeout_ms: u64,
    /// Time to wait for a routing acknowledgement of a sent text.
    pub ack_timeout_ms: u64,
    /// Destination used by `send_default_text`.
    pub default_destination: u32,
    /// Channel index used by `send_default_text`.
    pub default_channel: u8,
    /// Power the radio on from `start()`.
    pub enable_on_boot: bool,
    /// Apply `admin` after the first successful handshake.
    pub configure_on_boot: bool,
    pub boot_timeout_policy: BootTimeoutPolicy,
    pub admin: AdminConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            boot_timeout_ms: DEFAULT_BOOT_TIMEOUT_MS,
            ack_timeout_ms: DEFAULT_ACK_TIMEOUT_MS,
            default_destination: BROADCAST_ADDR,
            default_channel: 0,
            enable_on_boot: true,
            configure_on_boot: true,
            boot_timeout_policy: BootTimeoutPolicy::LogOnly,
            admin: AdminConfig::default(),
        }
    }
}

impl BridgeConfig {
    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Admin messages pushed to the radio during a configuration run.
///
/// Payloads are encoded `AdminMessage`s, hex strings when serialized. They
/// may carry channel keys, so `Debug` shows sizes only.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Sent in order, 200 ms apart. Usually begins with `begin_edit_settings`
    /// and ends with `commit_edit_settings`.
    #[serde(with = "hex_list")]
    pub settings: Vec<Vec<u8>>,
    /// Sent after the settings have been committed.
    #[serde(with = "hex_opt", skip_serializing_if = "Option::is_none")]
    pub channel: Option<Vec<u8>>,
}

impl AdminConfig {
    /// A complete settings transaction: `begin_edit_settings`, one `set_config`
    /// per config section, one `set_module_config` per module section, then
    /// `commit_edit_settings`. `channel` is an encoded `Channel` message.
    pub fn transaction<C, M>(configs: C, modules: M, channel: Option<&[u8]>) -> Self
    where
        C: IntoIterator,
        C::Item: AsRef<[u8]>,
        M: IntoIterator,
        M::Item: AsRef<[u8]>,
    {
        let mut settings = vec![admin::begin_edit_settings()];
        settings.extend(configs.into_iter().map(|c| admin::set_config(c.as_ref())));
        settings.extend(modules.into_iter().map(|m| admin::set_module_config(m.as_ref())));
        settings.push(admin::commit_edit_settings());

        Self {
            settings: settings.into_iter().map(|msg: Bytes| msg.to_vec()).collect(),
            channel: channel.map(|ch| admin::set_channel(ch).to_vec()),
        }
    }

    /// True when there is nothing to send.
    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }
}

impl fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sizes: Vec<usize> = self.settings.iter().map(Vec::len).collect();
        let mut dbg = f.debug_struct("AdminConfig");
        dbg.field("settings", &format_args!("<{} messages: {:?} bytes>", sizes.len(), sizes));
        match &self.channel {
            Some(channel) => dbg.field("channel", &format_args!("<redacted:{} bytes>", channel.len())),
            None => dbg.field("channel", &Option::<Vec<u8>>::None),
        };
        dbg.finish()
    }
}

mod hex_list {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(list: &[Vec<u8>], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(list.iter().map(hex::encode))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Vec<u8>>, D::Error> {
        Vec::<String>::deserialize(deserializer)?
            .iter()
            .map(|item| hex::decode(item).map_err(D::Error::custom))
            .collect()
    }
}

mod hex_opt {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(bytes) => serializer.serialize_some(&hex::encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|item| hex::decode(item).map_err(D::Error::custom))
            .transpose()
    }
}
