use meshlink_frame::{FramedLink, FramerStats};
use meshlink_proto::describe::{describe_channel, describe_config, describe_module_config, ConfigSection};
use meshlink_proto::{
    admin, admin_message, config_nonce, nodeinfo_broadcast, parse_from_radio, portnum,
    routing_error_reason, uplink_text, want_config, FromRadio, FromRadioEvent, MeshPacket,
    PacketIdGenerator, MAX_TEXT_LEN, ROUTING_ERROR_NONE,
};
use meshlink_transport::{Clock, NoPowerLine, PowerLine, SerialLink};
use rand::RngCore;
use tracing::{debug, info, warn};

use crate::config::{BootTimeoutPolicy, BridgeConfig};
use crate::error::{BridgeError, Result};
use crate::listeners::{BridgeListeners, TextMessage};
use crate::state::{ConfigPhase, ConnectionState};

/// Radio boot time after the power line is asserted.
pub const POWER_ON_DELAY_MS: u64 = 3_000;
/// Pause between the wake sequence and `want_config`.
pub const WAKE_SETTLE_MS: u64 = 200;
/// Handshake retry interval while configuring.
pub const CONFIG_RETRY_MS: u64 = 5_000;
/// Spacing between queued admin settings messages.
pub const SETTINGS_SPACING_MS: u64 = 200;
/// Time allowed for the radio to commit settings to flash.
pub const COMMIT_WAIT_MS: u64 = 2_000;
/// Delay before the channel and reboot admin messages.
pub const ADMIN_STEP_MS: u64 = 500;
/// Give up waiting for the post-config reboot after this long.
pub const REBOOT_WAIT_MS: u64 = 15_000;
/// Delay passed in the reboot directive.
pub const REBOOT_DELAY_SECS: u32 = 2;
/// `want_config` nonce used for diagnostic config dumps.
pub const DUMP_NONCE: u32 = 0xDEAD;

/// A text message awaiting its routing acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingSend {
    pub packet_id: u32,
    pub destination: u32,
    pub issued_at_ms: u64,
}

#[derive(Debug, Default)]
struct Identity {
    node_num: u32,
    long_name: String,
    short_name: String,
}

/// Connection to a Meshtastic radio over a serial link.
///
/// Cooperative and poll-driven: call [`tick`](MeshBridge::tick) from the host
/// loop. Nothing blocks; each call drains the bytes that are available and
/// compares the current state's deadline against the clock.
pub struct MeshBridge<L, C, R, P = NoPowerLine> {
    link: FramedLink<L>,
    clock: C,
    rng: R,
    power: Option<P>,
    config: BridgeConfig,
    state: ConnectionState,
    state_since: u64,
    boot_started: u64,
    nonce: u32,
    packet_ids: PacketIdGenerator,
    identity: Identity,
    pending: Option<PendingSend>,
    last_from_node: u32,
    last_channel: u8,
    config_applied: bool,
    dump_active: bool,
    listeners: BridgeListeners,
}

impl<L, C, R> MeshBridge<L, C, R, NoPowerLine>
where
    L: SerialLink,
    C: Clock,
    R: RngCore,
{
    /// Create a bridge in the `Off` state with no power line.
    pub fn new(link: L, clock: C, rng: R, config: BridgeConfig) -> Self {
        let now = clock.now_ms();
        Self {
            link: FramedLink::new(link),
            clock,
            rng,
            power: None,
            config,
            state: ConnectionState::Off,
            state_since: now,
            boot_started: now,
            nonce: 0,
            packet_ids: PacketIdGenerator::new(),
            identity: Identity::default(),
            pending: None,
            last_from_node: 0,
            last_channel: 0,
            config_applied: false,
            dump_active: false,
            listeners: BridgeListeners::default(),
        }
    }

    /// Attach a power-control line for the radio.
    pub fn with_power_line<Q: PowerLine>(self, line: Q) -> MeshBridge<L, C, R, Q> {
        MeshBridge {
            link: self.link,
            clock: self.clock,
            rng: self.rng,
            power: Some(line),
            config: self.config,
            state: self.state,
            state_since: self.state_since,
            boot_started: self.boot_started,
            nonce: self.nonce,
            packet_ids: self.packet_ids,
            identity: self.identity,
            pending: self.pending,
            last_from_node: self.last_from_node,
            last_channel: self.last_channel,
            config_applied: self.config_applied,
            dump_active: self.dump_active,
            listeners: self.listeners,
        }
    }
}

impl<L, C, R, P> MeshBridge<L, C, R, P>
where
    L: SerialLink,
    C: Clock,
    R: RngCore,
    P: PowerLine,
{
    /// Host start-up: hold the radio off, then power it on if
    /// `enable_on_boot` is set.
    pub fn start(&mut self) {
        if let Some(line) = self.power.as_mut() {
            line.digital_write(false);
        }
        if self.config.enable_on_boot {
            self.power_on();
        } else {
            info!("radio off, waiting for power_on()");
        }
    }

    /// Power the radio on and restart the handshake.
    ///
    /// Without a power line the radio is assumed to be running and the
    /// handshake starts straight away with a wake sequence.
    pub fn power_on(&mut self) {
        let now = self.clock.now_ms();
        self.link.reset_framer();
        self.identity = Identity::default();
        self.pending = None;
        self.boot_started = now;

        match self.power.as_mut() {
            Some(line) => {
                info!("powering on radio");
                line.digital_write(true);
                self.enter(ConnectionState::PoweringOn, now);
            }
            None => {
                info!("no power line, re-initializing radio link");
                self.enter(ConnectionState::Initializing, now);
                self.send_wake();
            }
        }
    }

    /// Force the bridge `Off`, dropping any pending send and identity.
    pub fn power_off(&mut self) {
        if let Some(line) = self.power.as_mut() {
            line.digital_write(false);
        }
        if self.state != ConnectionState::Off {
            info!(state = %self.state, "powering off radio");
        }
        self.pending = None;
        self.identity = Identity::default();
        self.dump_active = false;
        let now = self.clock.now_ms();
        self.enter(ConnectionState::Off, now);
    }

    /// Send a text message and wait for its acknowledgement.
    ///
    /// Only valid while `Ready`. Returns the packet id; the outcome is
    /// reported through `on_send_success` / `on_send_failed`.
    pub fn send_text(&mut self, message: &str, destination: u32, channel: u8) -> Result<u32> {
        if !self.state.is_ready() {
            warn!(state = %self.state, "cannot send text, radio not ready");
            return Err(BridgeError::NotReady(self.state));
        }
        if message.len() > MAX_TEXT_LEN {
            warn!(len = message.len(), max = MAX_TEXT_LEN, "message too long");
            return Err(BridgeError::MessageTooLong {
                len: message.len(),
                max: MAX_TEXT_LEN,
            });
        }

        // the counter only advances once the frame is on the wire
        let mut ids = self.packet_ids.clone();
        let packet_id = ids.next_id(&mut self.rng);
        let frame = uplink_text(message, destination, channel, packet_id)?;
        self.link.send(&frame)?;
        self.packet_ids = ids;

        let now = self.clock.now_ms();
        info!(
            packet_id = format_args!("{packet_id:#010x}"),
            destination = format_args!("{destination:#010x}"),
            channel,
            len = message.len(),
            "sent text"
        );
        self.pending = Some(PendingSend {
            packet_id,
            destination,
            issued_at_ms: now,
        });
        self.enter(ConnectionState::Sending, now);
        Ok(packet_id)
    }

    /// [`send_text`](Self::send_text) to the configured default destination
    /// and channel.
    pub fn send_default_text(&mut self, message: &str) -> Result<u32> {
        let (destination, channel) = (self.config.default_destination, self.config.default_channel);
        self.send_text(message, destination, channel)
    }

    /// Broadcast our node info. Fire-and-forget: the bridge stays `Ready`.
    pub fn send_nodeinfo(&mut self) -> Result<u32> {
        if !self.state.is_ready() {
            warn!(state = %self.state, "cannot send nodeinfo, radio not ready");
            return Err(BridgeError::NotReady(self.state));
        }
        if self.identity.node_num == 0 {
            warn!("cannot send nodeinfo, node number not known");
            return Err(BridgeError::NodeNumberUnknown);
        }

        let mut ids = self.packet_ids.clone();
        let packet_id = ids.next_id(&mut self.rng);
        let frame = nodeinfo_broadcast(
            &self.identity.long_name,
            &self.identity.short_name,
            self.identity.node_num,
            packet_id,
        );
        self.link.send(&frame)?;
        self.packet_ids = ids;
        info!(
            packet_id = format_args!("{packet_id:#010x}"),
            long_name = %self.identity.long_name,
            short_name = %self.identity.short_name,
            "sent nodeinfo broadcast"
        );
        Ok(packet_id)
    }

    /// Push the configured admin messages to the radio now.
    pub fn apply_config(&mut self) -> Result<()> {
        if !self.state.is_ready() {
            warn!(state = %self.state, "cannot apply config, radio not ready");
            return Err(BridgeError::NotReady(self.state));
        }
        if self.config.admin.is_empty() {
            warn!("no admin config messages to apply");
            return Err(BridgeError::NoAdminConfig);
        }
        if self.identity.node_num == 0 {
            warn!("cannot apply config, node number not known");
            return Err(BridgeError::NodeNumberUnknown);
        }

        info!(
            settings = self.config.admin.settings.len(),
            channel = self.config.admin.channel.is_some(),
            "applying admin configuration"
        );
        self.config_applied = false;
        let now = self.clock.now_ms();
        self.enter(ConnectionState::ApplyingConfig(ConfigPhase::SendingSettings { next: 0 }), now);
        Ok(())
    }

    /// Ask the radio for a full configuration dump and log every section.
    ///
    /// The dump is requested with a fixed nonce so it never completes a
    /// handshake.
    pub fn dump_radio_config(&mut self) -> Result<()> {
        if matches!(self.state, ConnectionState::Off | ConnectionState::PoweringOn) {
            warn!("cannot dump config, radio is off");
            return Err(BridgeError::NotReady(self.state));
        }
        self.link.send(&want_config(DUMP_NONCE))?;
        info!("requested radio config dump");
        self.dump_active = true;
        Ok(())
    }

    /// Run one scheduler pass.
    pub fn tick(&mut self) {
        if self.state.reads_serial() {
            self.process_serial();
        }

        let now = self.clock.now_ms();
        let elapsed = now.saturating_sub(self.state_since);
        match self.state {
            ConnectionState::Off | ConnectionState::Ready => {}
            ConnectionState::PoweringOn => {
                if elapsed >= POWER_ON_DELAY_MS {
                    debug!("boot delay elapsed, sending wake sequence");
                    self.enter(ConnectionState::Initializing, now);
                    self.send_wake();
                }
            }
            ConnectionState::Initializing => {
                if elapsed >= WAKE_SETTLE_MS {
                    self.request_config();
                    self.enter(ConnectionState::Configuring, now);
                }
            }
            ConnectionState::Configuring => {
                if now.saturating_sub(self.boot_started) >= self.config.boot_timeout_ms {
                    warn!(
                        timeout_ms = self.config.boot_timeout_ms,
                        policy = ?self.config.boot_timeout_policy,
                        "boot timeout, radio not responding"
                    );
                    match self.config.boot_timeout_policy {
                        BootTimeoutPolicy::LogOnly => self.boot_started = now,
                        BootTimeoutPolicy::PowerCycle => {
                            self.power_off();
                            self.power_on();
                            return;
                        }
                    }
                }
                if elapsed >= CONFIG_RETRY_MS {
                    debug!("no config response, retrying wake and config request");
                    self.enter(ConnectionState::Initializing, now);
                    self.send_wake();
                }
            }
            ConnectionState::ApplyingConfig(phase) => self.advance_config(phase, now, elapsed),
            ConnectionState::Sending => {
                let timeout = self.config.ack_timeout_ms;
                if elapsed >= timeout {
                    if let Some(pending) = self.pending.take() {
                        warn!(
                            packet_id = format_args!("{:#010x}", pending.packet_id),
                            timeout_ms = timeout,
                            "ack timeout"
                        );
                    }
                    self.enter(ConnectionState::Ready, now);
                    self.listeners.fire_send_failed();
                }
            }
        }
    }

    fn advance_config(&mut self, phase: ConfigPhase, now: u64, elapsed: u64) {
        match phase {
            ConfigPhase::SendingSettings { next } => {
                if elapsed < SETTINGS_SPACING_MS {
                    return;
                }
                let total = self.config.admin.settings.len();
                match self.config.admin.settings.get(next).cloned() {
                    Some(payload) => {
                        info!(message = next + 1, total, "sending config message");
                        self.send_admin(&payload);
                        let phase = ConfigPhase::SendingSettings { next: next + 1 };
                        self.enter(ConnectionState::ApplyingConfig(phase), now);
                    }
                    None => {
                        info!("all settings sent, waiting for commit");
                        self.enter(ConnectionState::ApplyingConfig(ConfigPhase::AwaitingCommit), now);
                    }
                }
            }
            ConfigPhase::AwaitingCommit => {
                if elapsed >= COMMIT_WAIT_MS {
                    info!("settings committed");
                    self.enter(ConnectionState::ApplyingConfig(self.after_commit()), now);
                }
            }
            ConfigPhase::SendingChannel => {
                if elapsed >= ADMIN_STEP_MS {
                    if let Some(channel) = self.config.admin.channel.clone() {
                        info!("sending channel configuration");
                        self.send_admin(&channel);
                    }
                    self.enter(ConnectionState::ApplyingConfig(ConfigPhase::SendingReboot), now);
                }
            }
            ConfigPhase::SendingReboot => {
                if elapsed >= ADMIN_STEP_MS {
                    info!(seconds = REBOOT_DELAY_SECS, "sending reboot to apply configuration");
                    self.send_admin(&admin::reboot(REBOOT_DELAY_SECS));
                    self.enter(ConnectionState::ApplyingConfig(ConfigPhase::AwaitingReboot), now);
                }
            }
            ConfigPhase::AwaitingReboot => {
                if elapsed >= REBOOT_WAIT_MS {
                    warn!("no reboot detected after config, proceeding");
                    self.finish_config(now);
                }
            }
        }
    }

    fn after_commit(&self) -> ConfigPhase {
        if self.config.admin.channel.is_some() {
            ConfigPhase::SendingChannel
        } else {
            ConfigPhase::SendingReboot
        }
    }

    fn finish_config(&mut self, now: u64) {
        self.config_applied = true;
        self.enter(ConnectionState::Ready, now);
        self.listeners.fire_ready();
    }

    fn process_serial(&mut self) {
        while self.state.reads_serial() {
            let message = match self.link.poll_frame() {
                Ok(Some(frame)) => parse_from_radio(frame),
                Ok(None) => break,
                Err(error) => {
                    warn!(%error, "serial read failed");
                    break;
                }
            };
            self.handle_from_radio(message);
        }
    }

    fn handle_from_radio(&mut self, message: FromRadio) {
        for event in message.events {
            match event {
                FromRadioEvent::Id(id) => debug!(id, "FromRadio"),
                FromRadioEvent::Packet(packet) => self.handle_packet(packet),
                FromRadioEvent::MyInfo { node_num } => {
                    info!(node_num = format_args!("{node_num:#010x}"), "my node number");
                    self.identity.node_num = node_num;
                }
                FromRadioEvent::NodeInfo { num, user } => {
                    if num == 0 || num != self.identity.node_num {
                        continue;
                    }
                    if let Some(user) = user {
                        if !user.long_name.is_empty() {
                            info!(long_name = %user.long_name, "my long name");
                            self.identity.long_name = user.long_name;
                        }
                        if !user.short_name.is_empty() {
                            info!(short_name = %user.short_name, "my short name");
                            self.identity.short_name = user.short_name;
                        }
                    }
                }
                FromRadioEvent::Config(body) => {
                    self.log_sections(describe_config(&body));
                }
                FromRadioEvent::ModuleConfig(body) => {
                    self.log_sections(describe_module_config(&body));
                }
                FromRadioEvent::Channel(body) => {
                    self.log_sections(vec![describe_channel(&body)]);
                }
                FromRadioEvent::ConfigComplete(id) => self.handle_config_complete(id),
                FromRadioEvent::Rebooted(true) => self.handle_rebooted(),
                FromRadioEvent::Rebooted(false) => {}
                FromRadioEvent::QueueStatus { res, mesh_packet_id } => {
                    self.handle_queue_status(res, mesh_packet_id);
                }
            }
        }
    }

    fn handle_packet(&mut self, packet: MeshPacket) {
        let from = packet.from.unwrap_or(0);
        let Some(data) = packet.decoded else {
            debug!(from = format_args!("{from:#010x}"), "encrypted packet");
            return;
        };
        debug!(
            from = format_args!("{from:#010x}"),
            to = format_args!("{:#010x}", packet.to),
            channel = packet.channel,
            portnum = data.portnum,
            request_id = ?data.request_id,
            "mesh packet"
        );

        match data.portnum {
            portnum::TEXT_MESSAGE_APP if !data.payload.is_empty() => {
                let message = TextMessage {
                    from,
                    to: packet.to,
                    channel: packet.channel,
                    packet_id: packet.id,
                    text: data.text(),
                };
                info!(
                    from = format_args!("{from:#010x}"),
                    channel = packet.channel,
                    text = %message.text,
                    "received text"
                );
                self.last_from_node = from;
                self.last_channel = packet.channel;
                self.listeners.fire_text(&message);
            }
            portnum::ROUTING_APP => {
                let Some(pending) = self.pending else {
                    return;
                };
                if data.request_id != Some(pending.packet_id) {
                    return;
                }
                let reason = routing_error_reason(&data.payload).unwrap_or_else(|error| {
                    warn!(%error, "malformed routing payload");
                    u32::MAX
                });

                self.pending = None;
                let now = self.clock.now_ms();
                self.enter(ConnectionState::Ready, now);
                if reason == ROUTING_ERROR_NONE {
                    info!(packet_id = format_args!("{:#010x}", pending.packet_id), "ack received");
                    self.listeners.fire_send_success();
                } else {
                    warn!(
                        packet_id = format_args!("{:#010x}", pending.packet_id),
                        reason,
                        "nak received, delivery failed"
                    );
                    self.listeners.fire_send_failed();
                }
            }
            _ => {}
        }
    }

    fn handle_config_complete(&mut self, id: u32) {
        if self.dump_active {
            self.dump_active = false;
            info!("end of radio config dump");
        }
        if id != self.nonce {
            debug!(id, nonce = self.nonce, "ignoring config_complete");
            return;
        }

        let now = self.clock.now_ms();
        match self.state {
            ConnectionState::Configuring => {
                if self.wants_boot_config() {
                    info!("config complete, applying admin configuration");
                    let phase = ConfigPhase::SendingSettings { next: 0 };
                    self.enter(ConnectionState::ApplyingConfig(phase), now);
                } else {
                    info!("config complete, radio ready");
                    self.enter(ConnectionState::Ready, now);
                    self.listeners.fire_ready();
                }
            }
            ConnectionState::ApplyingConfig(ConfigPhase::AwaitingCommit) => {
                info!("radio back after settings commit");
                self.enter(ConnectionState::ApplyingConfig(self.after_commit()), now);
            }
            ConnectionState::ApplyingConfig(ConfigPhase::AwaitingReboot) => {
                info!("radio rebooted, configuration applied");
                self.finish_config(now);
            }
            _ => debug!(state = %self.state, "config_complete outside handshake"),
        }
    }

    fn handle_rebooted(&mut self) {
        match self.state {
            ConnectionState::ApplyingConfig(phase) if phase.expects_reboot() => {
                info!(phase = phase.index(), "expected radio reboot, re-requesting config");
                self.send_wake();
                self.request_config();
            }
            _ => {
                warn!(state = %self.state, "radio reboot detected, re-initializing");
                let interrupted = self.pending.take().is_some();
                let now = self.clock.now_ms();
                self.enter(ConnectionState::Initializing, now);
                if interrupted {
                    self.listeners.fire_send_failed();
                }
            }
        }
    }

    fn handle_queue_status(&mut self, res: i32, mesh_packet_id: u32) {
        debug!(res, packet_id = format_args!("{mesh_packet_id:#010x}"), "queue status");
        let Some(pending) = self.pending else {
            return;
        };
        if mesh_packet_id == 0 || mesh_packet_id != pending.packet_id {
            return;
        }
        if res == 0 {
            debug!("message queued, waiting for routing confirmation");
            return;
        }

        warn!(res, "radio rejected message");
        self.pending = None;
        let now = self.clock.now_ms();
        self.enter(ConnectionState::Ready, now);
        self.listeners.fire_send_failed();
    }

    fn log_sections(&self, sections: Vec<ConfigSection>) {
        for section in sections {
            if self.dump_active {
                info!(kind = %section.kind, name = %section.name, "radio config");
                for field in &section.fields {
                    info!(section = %section.name, "  {} = {}", field.name, field.value);
                }
            } else {
                debug!(
                    kind = %section.kind,
                    name = %section.name,
                    fields = section.fields.len(),
                    "radio config"
                );
            }
        }
    }

    fn wants_boot_config(&self) -> bool {
        self.config.configure_on_boot && !self.config.admin.is_empty() && !self.config_applied
    }

    fn enter(&mut self, next: ConnectionState, now: u64) {
        self.state_since = now;
        if next != self.state {
            debug!(from = %self.state, to = %next, "state change");
            self.state = next;
            self.listeners.fire_state_change(next);
        }
    }

    fn request_config(&mut self) {
        self.nonce = config_nonce(&mut self.rng);
        debug!(nonce = format_args!("{:#010x}", self.nonce), "requesting config");
        if let Err(error) = self.link.send(&want_config(self.nonce)) {
            warn!(%error, "failed to send config request");
        }
    }

    fn send_wake(&mut self) {
        if let Err(error) = self.link.send_wake() {
            warn!(%error, "failed to send wake sequence");
        }
    }

    fn send_admin(&mut self, payload: &[u8]) {
        let packet_id = self.packet_ids.next_id(&mut self.rng);
        let frame = admin_message(payload, self.identity.node_num, packet_id);
        match self.link.send(&frame) {
            Ok(()) => debug!(
                len = payload.len(),
                packet_id = format_args!("{packet_id:#010x}"),
                "sent admin message"
            ),
            Err(error) => warn!(%error, "failed to send admin message"),
        }
    }

    pub fn on_ready(&mut self, callback: impl FnMut() + 'static) {
        self.listeners.ready.add(Box::new(callback));
    }

    pub fn on_message(&mut self, callback: impl FnMut(&str) + 'static) {
        self.listeners.message.add(Box::new(callback));
    }

    /// Like [`on_message`](Self::on_message), with sender, channel and
    /// packet id.
    pub fn on_text(&mut self, callback: impl FnMut(&TextMessage) + 'static) {
        self.listeners.text.add(Box::new(callback));
    }

    pub fn on_send_success(&mut self, callback: impl FnMut() + 'static) {
        self.listeners.send_success.add(Box::new(callback));
    }

    pub fn on_send_failed(&mut self, callback: impl FnMut() + 'static) {
        self.listeners.send_failed.add(Box::new(callback));
    }

    /// Called on every state change, including moves between config phases.
    pub fn on_state_change(&mut self, callback: impl FnMut(ConnectionState) + 'static) {
        self.listeners.state_change.add(Box::new(callback));
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state.is_ready()
    }

    /// Local node number, or 0 before the radio has reported it.
    pub fn my_node_num(&self) -> u32 {
        self.identity.node_num
    }

    pub fn my_long_name(&self) -> &str {
        &self.identity.long_name
    }

    pub fn my_short_name(&self) -> &str {
        &self.identity.short_name
    }

    /// Sender of the most recent text message.
    pub fn last_from_node(&self) -> u32 {
        self.last_from_node
    }

    /// Channel of the most recent text message.
    pub fn last_channel(&self) -> u8 {
        self.last_channel
    }

    pub fn pending_send(&self) -> Option<&PendingSend> {
        self.pending.as_ref()
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Whether the admin configuration has been applied this session.
    pub fn config_applied(&self) -> bool {
        self.config_applied
    }

    pub fn framer_stats(&self) -> FramerStats {
        self.link.framer().stats()
    }

    pub fn link(&self) -> &L {
        self.link.get_ref()
    }

    pub fn link_mut(&mut self) -> &mut L {
        self.link.get_mut()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

impl<L, C, R, P> std::fmt::Debug for MeshBridge<L, C, R, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeshBridge")
            .field("state", &self.state)
            .field("node_num", &self.identity.node_num)
            .field("pending", &self.pending)
            .field("config_applied", &self.config_applied)
            .finish_non_exhaustive()
    }
}
