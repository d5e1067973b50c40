use std::cell::RefCell;
use std::rc::Rc;

use bytes::BytesMut;
use meshlink_bridge::{
    AdminConfig, BootTimeoutPolicy, BridgeConfig, BridgeError, ConfigPhase, ConnectionState,
    MeshBridge, TextMessage,
};
use meshlink_frame::{encode_frame, SerialFramer};
use meshlink_proto::wire::{encode_field_bytes, encode_field_varint};
use meshlink_proto::{admin, portnum, Data, MeshPacket, ToRadio, User, BROADCAST_ADDR};
use meshlink_transport::{Clock, ManualClock, MemoryLink, PowerLatch};
use rand::rngs::StdRng;
use rand::SeedableRng;

const NODE: u32 = 0x0A0B_0C0D;

type Bridge = MeshBridge<MemoryLink, ManualClock, StdRng, PowerLatch>;

struct Radio {
    bridge: Bridge,
    clock: ManualClock,
    power: PowerLatch,
    events: Rc<RefCell<Vec<String>>>,
}

impl Radio {
    fn new(config: BridgeConfig) -> Self {
        let clock = ManualClock::new();
        let power = PowerLatch::new();
        let mut bridge = MeshBridge::new(
            MemoryLink::new(),
            clock.clone(),
            StdRng::seed_from_u64(0x5EED),
            config,
        )
        .with_power_line(power.clone());

        let events = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&events);
        bridge.on_ready(move || log.borrow_mut().push("ready".to_string()));
        let log = Rc::clone(&events);
        bridge.on_message(move |text| log.borrow_mut().push(format!("message:{text}")));
        let log = Rc::clone(&events);
        bridge.on_send_success(move || log.borrow_mut().push("sent".to_string()));
        let log = Rc::clone(&events);
        bridge.on_send_failed(move || log.borrow_mut().push("failed".to_string()));

        Self {
            bridge,
            clock,
            power,
            events,
        }
    }

    fn advance(&mut self, ms: u64) {
        self.clock.advance(ms);
        self.bridge.tick();
    }

    fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }

    fn take_outbound(&mut self) -> Vec<u8> {
        self.bridge.link_mut().take_outbound()
    }

    /// Frames written since the last call, decoded as `ToRadio`.
    fn sent(&mut self) -> Vec<ToRadio> {
        let wire = self.take_outbound();
        let mut framer = SerialFramer::new();
        let mut frames = Vec::new();
        framer.push_slice(&wire, |frame| {
            let message = ToRadio::decode(frame).expect("outbound frame should decode");
            frames.push(message.expect("outbound frame should carry a message"));
        });
        frames
    }

    fn receive(&mut self, from_radio: &[u8]) {
        let mut wire = BytesMut::new();
        encode_frame(from_radio, &mut wire).expect("test frame should encode");
        self.bridge.link_mut().push_inbound(&wire);
        self.bridge.tick();
    }

    /// Power on and run the handshake up to the `want_config` request.
    fn boot_to_configuring(&mut self) -> u32 {
        self.bridge.power_on();
        self.advance(3_000);
        self.advance(200);
        assert_eq!(self.bridge.state(), ConnectionState::Configuring);
        last_nonce(&self.sent())
    }

    fn boot_to_ready(&mut self) {
        let nonce = self.boot_to_configuring();
        self.receive(&handshake(nonce));
        assert_eq!(self.bridge.state(), ConnectionState::Ready);
        self.events.borrow_mut().clear();
    }
}

fn last_nonce(sent: &[ToRadio]) -> u32 {
    sent.iter()
        .rev()
        .find_map(|message| match message {
            ToRadio::WantConfig(nonce) => Some(*nonce),
            _ => None,
        })
        .expect("a want_config request should have been sent")
}

fn sent_packets(sent: &[ToRadio]) -> Vec<MeshPacket> {
    sent.iter()
        .filter_map(|message| match message {
            ToRadio::Packet(packet) => Some(packet.clone()),
            _ => None,
        })
        .collect()
}

fn from_radio(build: impl FnOnce(&mut BytesMut)) -> Vec<u8> {
    let mut buf = BytesMut::new();
    build(&mut buf);
    buf.to_vec()
}

fn config_complete(nonce: u32) -> Vec<u8> {
    from_radio(|b| encode_field_varint(7, nonce, b))
}

fn rebooted() -> Vec<u8> {
    from_radio(|b| encode_field_varint(8, 1, b))
}

/// my_info, our own node_info, then config_complete.
fn handshake(nonce: u32) -> Vec<u8> {
    let my_info = from_radio(|b| encode_field_varint(1, NODE, b));
    let user = from_radio(|b| User::for_node(NODE, "Gateway", "GW").encode(b));
    let node_info = from_radio(|b| {
        encode_field_varint(1, NODE, b);
        encode_field_bytes(2, &user, b);
    });
    from_radio(|b| {
        encode_field_bytes(3, &my_info, b);
        encode_field_bytes(4, &node_info, b);
        encode_field_varint(7, nonce, b);
    })
}

fn routing_reply(request_id: u32, error_reason: u32) -> Vec<u8> {
    let routing = from_radio(|b| encode_field_varint(3, error_reason, b));
    let data = Data {
        portnum: portnum::ROUTING_APP,
        payload: routing.into(),
        request_id: Some(request_id),
    };
    let packet = MeshPacket {
        from: Some(NODE),
        to: NODE,
        decoded: Some(data),
        ..Default::default()
    };
    from_radio(|b| encode_field_bytes(2, &from_radio(|p| packet.encode(p)), b))
}

fn queue_status(res: i32, packet_id: u32) -> Vec<u8> {
    let status = from_radio(|b| {
        encode_field_varint(1, res as u32, b);
        encode_field_varint(4, packet_id, b);
    });
    from_radio(|b| encode_field_bytes(11, &status, b))
}

fn admin_config() -> BridgeConfig {
    BridgeConfig {
        admin: AdminConfig::transaction([vec![0x32u8, 0x02, 0x38, 0x03]], Vec::<Vec<u8>>::new(), None),
        ..BridgeConfig::default()
    }
}

#[test]
fn power_on_sends_wake_sequence_after_boot_delay() {
    let mut radio = Radio::new(BridgeConfig::default());
    radio.bridge.power_on();
    assert!(radio.power.is_high());
    assert_eq!(radio.bridge.state(), ConnectionState::PoweringOn);

    radio.advance(2_999);
    assert_eq!(radio.bridge.state(), ConnectionState::PoweringOn);
    assert!(radio.take_outbound().is_empty());

    radio.advance(1);
    assert_eq!(radio.bridge.state(), ConnectionState::Initializing);
    assert_eq!(radio.take_outbound(), vec![0xC3; 32]);
}

#[test]
fn want_config_follows_wake_with_odd_nonce() {
    let mut radio = Radio::new(BridgeConfig::default());
    radio.bridge.power_on();
    radio.advance(3_000);
    radio.take_outbound();

    radio.advance(199);
    assert_eq!(radio.bridge.state(), ConnectionState::Initializing);
    radio.advance(1);
    assert_eq!(radio.bridge.state(), ConnectionState::Configuring);

    let sent = radio.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(last_nonce(&sent) & 1, 1);
}

#[test]
fn matching_config_complete_makes_ready_once() {
    let mut radio = Radio::new(BridgeConfig::default());
    let nonce = radio.boot_to_configuring();

    radio.receive(&config_complete(nonce ^ 0x10));
    assert_eq!(radio.bridge.state(), ConnectionState::Configuring);
    assert!(radio.events().is_empty());

    radio.receive(&handshake(nonce));
    assert_eq!(radio.bridge.state(), ConnectionState::Ready);
    assert_eq!(radio.events(), ["ready"]);
    assert_eq!(radio.bridge.my_node_num(), NODE);
    assert_eq!(radio.bridge.my_long_name(), "Gateway");
    assert_eq!(radio.bridge.my_short_name(), "GW");

    radio.receive(&config_complete(nonce));
    radio.advance(60_000);
    assert_eq!(radio.events(), ["ready"]);
}

#[test]
fn silent_radio_is_retried_every_five_seconds() {
    let mut radio = Radio::new(BridgeConfig::default());
    let first = radio.boot_to_configuring();

    radio.advance(4_999);
    assert_eq!(radio.bridge.state(), ConnectionState::Configuring);
    radio.advance(1);
    assert_eq!(radio.bridge.state(), ConnectionState::Initializing);
    assert_eq!(radio.take_outbound(), vec![0xC3; 32]);

    radio.advance(200);
    assert_eq!(radio.bridge.state(), ConnectionState::Configuring);
    let second = last_nonce(&radio.sent());
    assert_ne!(first, second);

    // a late answer to the first request is ignored
    radio.receive(&config_complete(first));
    assert_eq!(radio.bridge.state(), ConnectionState::Configuring);
    radio.receive(&config_complete(second));
    assert_eq!(radio.bridge.state(), ConnectionState::Ready);
}

#[test]
fn boot_timeout_only_logs_by_default() {
    let mut radio = Radio::new(BridgeConfig::default());
    radio.boot_to_configuring();
    for _ in 0..20 {
        radio.advance(2_600);
    }
    assert!(radio.power.is_high());
    assert!(matches!(
        radio.bridge.state(),
        ConnectionState::Configuring | ConnectionState::Initializing
    ));
}

#[test]
fn boot_timeout_can_power_cycle() {
    let mut radio = Radio::new(BridgeConfig {
        boot_timeout_ms: 10_000,
        boot_timeout_policy: BootTimeoutPolicy::PowerCycle,
        ..BridgeConfig::default()
    });
    radio.boot_to_configuring();

    // 3200 ms into the boot; retries continue until 10 s have passed
    radio.advance(4_900);
    assert_eq!(radio.bridge.state(), ConnectionState::Configuring);
    radio.advance(1_900);
    assert_eq!(radio.bridge.state(), ConnectionState::PoweringOn);
    assert!(radio.power.is_high());
}

#[test]
fn send_text_is_acknowledged() {
    let mut radio = Radio::new(BridgeConfig::default());
    radio.boot_to_ready();
    radio.take_outbound();

    let packet_id = radio
        .bridge
        .send_text("hi", BROADCAST_ADDR, 0)
        .expect("send should be accepted");
    assert_ne!(packet_id, 0);
    assert_eq!(radio.bridge.state(), ConnectionState::Sending);
    assert_eq!(
        radio.bridge.pending_send().map(|pending| pending.packet_id),
        Some(packet_id)
    );

    let packets = sent_packets(&radio.sent());
    assert_eq!(packets.len(), 1);
    assert_eq!(packets[0].id, packet_id);
    let data = packets[0].decoded.as_ref().expect("text packet is not encrypted");
    assert_eq!(data.portnum, 1);
    assert_eq!(&data.payload[..], b"hi");

    // an ack for some other packet changes nothing
    radio.receive(&routing_reply(packet_id ^ 0x400, 0));
    assert_eq!(radio.bridge.state(), ConnectionState::Sending);

    radio.receive(&routing_reply(packet_id, 0));
    assert_eq!(radio.bridge.state(), ConnectionState::Ready);
    assert!(radio.bridge.pending_send().is_none());
    assert_eq!(radio.events(), ["sent"]);
}

#[test]
fn missing_ack_fails_exactly_once() {
    let mut radio = Radio::new(BridgeConfig::default());
    radio.boot_to_ready();
    radio
        .bridge
        .send_text("anyone?", BROADCAST_ADDR, 0)
        .expect("send should be accepted");

    radio.advance(29_999);
    assert_eq!(radio.bridge.state(), ConnectionState::Sending);
    radio.advance(1);
    assert_eq!(radio.bridge.state(), ConnectionState::Ready);
    assert_eq!(radio.events(), ["failed"]);

    radio.advance(30_000);
    radio.advance(30_000);
    assert_eq!(radio.events(), ["failed"]);
}

#[test]
fn nak_reports_failure() {
    let mut radio = Radio::new(BridgeConfig::default());
    radio.boot_to_ready();
    let packet_id = radio
        .bridge
        .send_text("lost", 0x1234_5678, 1)
        .expect("send should be accepted");

    // NO_ROUTE
    radio.receive(&routing_reply(packet_id, 3));
    assert_eq!(radio.bridge.state(), ConnectionState::Ready);
    assert_eq!(radio.events(), ["failed"]);
}

#[test]
fn queue_rejection_fails_immediately() {
    let mut radio = Radio::new(BridgeConfig::default());
    radio.boot_to_ready();
    let packet_id = radio
        .bridge
        .send_default_text("queued")
        .expect("send should be accepted");

    radio.receive(&queue_status(0, packet_id));
    assert_eq!(radio.bridge.state(), ConnectionState::Sending);

    radio.receive(&queue_status(-1, packet_id));
    assert_eq!(radio.bridge.state(), ConnectionState::Ready);
    assert_eq!(radio.events(), ["failed"]);
}

#[test]
fn calls_outside_ready_have_no_side_effects() {
    let mut radio = Radio::new(BridgeConfig::default());
    let nonce = radio.boot_to_configuring();

    assert!(matches!(
        radio.bridge.send_text("early", BROADCAST_ADDR, 0),
        Err(BridgeError::NotReady(ConnectionState::Configuring))
    ));
    assert!(matches!(
        radio.bridge.send_nodeinfo(),
        Err(BridgeError::NotReady(_))
    ));
    assert!(radio.take_outbound().is_empty());
    assert_eq!(radio.bridge.state(), ConnectionState::Configuring);

    radio.receive(&handshake(nonce));
    radio
        .bridge
        .send_text("first", BROADCAST_ADDR, 0)
        .expect("send should be accepted");
    radio.take_outbound();
    assert!(matches!(
        radio.bridge.send_text("second", BROADCAST_ADDR, 0),
        Err(BridgeError::NotReady(ConnectionState::Sending))
    ));
    assert!(radio.take_outbound().is_empty());
}

#[test]
fn oversized_text_is_rejected_without_traffic() {
    let mut radio = Radio::new(BridgeConfig::default());
    radio.boot_to_ready();
    radio.take_outbound();

    let long = "x".repeat(234);
    assert!(matches!(
        radio.bridge.send_text(&long, BROADCAST_ADDR, 0),
        Err(BridgeError::MessageTooLong { len: 234, max: 233 })
    ));
    assert_eq!(radio.bridge.state(), ConnectionState::Ready);
    assert!(radio.take_outbound().is_empty());
}

#[test]
fn nodeinfo_broadcast_is_fire_and_forget() {
    let mut radio = Radio::new(BridgeConfig::default());
    radio.boot_to_ready();
    radio.take_outbound();

    let packet_id = radio.bridge.send_nodeinfo().expect("nodeinfo should be sent");
    assert_ne!(packet_id, 0);
    assert_eq!(radio.bridge.state(), ConnectionState::Ready);

    let packets = sent_packets(&radio.sent());
    assert_eq!(packets[0].to, BROADCAST_ADDR);
    assert!(!packets[0].want_ack);
    let data = packets[0].decoded.as_ref().expect("nodeinfo is not encrypted");
    let user = User::decode(&data.payload).expect("user should decode");
    assert_eq!(user.id, "!0a0b0c0d");
    assert_eq!(user.long_name, "Gateway");
}

#[test]
fn incoming_text_reaches_listeners() {
    let mut radio = Radio::new(BridgeConfig::default());
    radio.boot_to_ready();
    let received = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&received);
    radio.bridge.on_text(move |msg: &TextMessage| sink.borrow_mut().push(msg.clone()));

    let packet = MeshPacket {
        id: 0x55,
        from: Some(0x7777_0001),
        to: BROADCAST_ADDR,
        channel: 2,
        decoded: Some(Data {
            portnum: portnum::TEXT_MESSAGE_APP,
            payload: "hello mesh".into(),
            request_id: None,
        }),
        ..Default::default()
    };
    radio.receive(&from_radio(|b| {
        encode_field_bytes(2, &from_radio(|p| packet.encode(p)), b)
    }));

    assert_eq!(radio.events(), ["message:hello mesh"]);
    assert_eq!(
        *received.borrow(),
        [TextMessage {
            from: 0x7777_0001,
            to: BROADCAST_ADDR,
            channel: 2,
            packet_id: 0x55,
            text: "hello mesh".into(),
        }]
    );
    assert_eq!(radio.bridge.last_from_node(), 0x7777_0001);
    assert_eq!(radio.bridge.last_channel(), 2);
}

#[test]
fn unexpected_reboot_restarts_handshake() {
    let mut radio = Radio::new(BridgeConfig::default());
    radio.boot_to_ready();
    radio
        .bridge
        .send_text("in flight", BROADCAST_ADDR, 0)
        .expect("send should be accepted");

    radio.receive(&rebooted());
    assert_eq!(radio.bridge.state(), ConnectionState::Initializing);
    assert!(radio.bridge.pending_send().is_none());
    assert_eq!(radio.events(), ["failed"]);

    radio.take_outbound();
    radio.advance(200);
    assert_eq!(radio.bridge.state(), ConnectionState::Configuring);
    let nonce = last_nonce(&radio.sent());
    radio.receive(&config_complete(nonce));
    assert_eq!(radio.bridge.state(), ConnectionState::Ready);
}

#[test]
fn power_off_is_idempotent() {
    let mut radio = Radio::new(BridgeConfig::default());
    radio.boot_to_ready();
    radio
        .bridge
        .send_text("bye", BROADCAST_ADDR, 0)
        .expect("send should be accepted");

    let states = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&states);
    radio.bridge.on_state_change(move |state| log.borrow_mut().push(state));

    radio.bridge.power_off();
    let after_once = (
        radio.bridge.state(),
        radio.power.is_high(),
        radio.bridge.my_node_num(),
        radio.bridge.pending_send().copied(),
        radio.events(),
        states.borrow().clone(),
    );
    radio.bridge.power_off();
    let after_twice = (
        radio.bridge.state(),
        radio.power.is_high(),
        radio.bridge.my_node_num(),
        radio.bridge.pending_send().copied(),
        radio.events(),
        states.borrow().clone(),
    );

    assert_eq!(after_once, after_twice);
    assert_eq!(after_once.0, ConnectionState::Off);
    assert!(!after_once.1);
    assert_eq!(after_once.2, 0);
    assert_eq!(after_once.5, [ConnectionState::Off]);
}

#[test]
fn serial_is_ignored_while_off() {
    let mut radio = Radio::new(BridgeConfig::default());
    radio.receive(&handshake(1));
    assert_eq!(radio.bridge.state(), ConnectionState::Off);
    assert_eq!(radio.bridge.my_node_num(), 0);
}

#[test]
fn start_respects_enable_on_boot() {
    let mut radio = Radio::new(BridgeConfig {
        enable_on_boot: false,
        ..BridgeConfig::default()
    });
    radio.bridge.start();
    assert_eq!(radio.bridge.state(), ConnectionState::Off);
    assert!(!radio.power.is_high());

    let mut radio = Radio::new(BridgeConfig::default());
    radio.bridge.start();
    assert_eq!(radio.bridge.state(), ConnectionState::PoweringOn);
}

#[test]
fn without_power_line_power_on_wakes_immediately() {
    let clock = ManualClock::starting_at(1_000);
    let mut bridge = MeshBridge::new(
        MemoryLink::new(),
        clock.clone(),
        StdRng::seed_from_u64(1),
        BridgeConfig::default(),
    );
    bridge.power_on();
    assert_eq!(bridge.state(), ConnectionState::Initializing);
    assert_eq!(bridge.link_mut().take_outbound(), vec![0xC3; 32]);
    assert_eq!(bridge.clock().now_ms(), 1_000);

    clock.advance(200);
    bridge.tick();
    assert_eq!(bridge.state(), ConnectionState::Configuring);
}

#[test]
fn admin_config_is_applied_on_first_boot() {
    let mut radio = Radio::new(admin_config());
    let states = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&states);
    radio.bridge.on_state_change(move |state| log.borrow_mut().push(state));

    let nonce = radio.boot_to_configuring();
    radio.receive(&handshake(nonce));
    assert_eq!(
        radio.bridge.state(),
        ConnectionState::ApplyingConfig(ConfigPhase::SendingSettings { next: 0 })
    );
    assert!(radio.events().is_empty());

    // begin_edit, set_config, commit_edit at 200 ms spacing
    for _ in 0..3 {
        radio.advance(199);
        assert!(radio.sent().is_empty());
        radio.advance(1);
        assert_eq!(sent_packets(&radio.sent()).len(), 1);
    }
    radio.advance(200);
    assert_eq!(
        radio.bridge.state(),
        ConnectionState::ApplyingConfig(ConfigPhase::AwaitingCommit)
    );

    radio.advance(2_000);
    assert_eq!(
        radio.bridge.state(),
        ConnectionState::ApplyingConfig(ConfigPhase::SendingReboot)
    );
    radio.advance(500);
    assert_eq!(
        radio.bridge.state(),
        ConnectionState::ApplyingConfig(ConfigPhase::AwaitingReboot)
    );
    let reboot = sent_packets(&radio.sent());
    let data = reboot[0].decoded.as_ref().expect("admin packet is not encrypted");
    assert_eq!(data.portnum, portnum::ADMIN_APP);
    assert_eq!(data.payload, admin::reboot(2));
    assert_eq!(reboot[0].to, NODE);

    // the radio reboots; the bridge asks for config again and waits
    radio.receive(&rebooted());
    assert_eq!(
        radio.bridge.state(),
        ConnectionState::ApplyingConfig(ConfigPhase::AwaitingReboot)
    );
    let nonce = last_nonce(&radio.sent());
    radio.receive(&config_complete(nonce));

    assert_eq!(radio.bridge.state(), ConnectionState::Ready);
    assert!(radio.bridge.config_applied());
    assert_eq!(radio.events(), ["ready"]);
    assert_eq!(states.borrow().first(), Some(&ConnectionState::PoweringOn));
    assert_eq!(states.borrow().last(), Some(&ConnectionState::Ready));

    // a later reboot does not re-apply the configuration
    radio.receive(&rebooted());
    radio.advance(200);
    let nonce = last_nonce(&radio.sent());
    radio.receive(&config_complete(nonce));
    assert_eq!(radio.bridge.state(), ConnectionState::Ready);
}

#[test]
fn channel_config_is_sent_between_commit_and_reboot() {
    let mut config = admin_config();
    config.admin.channel = Some(admin::set_channel(&[0x08, 0x00]).to_vec());
    let mut radio = Radio::new(config);
    let nonce = radio.boot_to_configuring();
    radio.receive(&handshake(nonce));

    for _ in 0..4 {
        radio.advance(200);
    }
    radio.sent();
    radio.advance(2_000);
    assert_eq!(
        radio.bridge.state(),
        ConnectionState::ApplyingConfig(ConfigPhase::SendingChannel)
    );
    radio.advance(500);
    let channel = sent_packets(&radio.sent());
    assert_eq!(channel.len(), 1);
    let data = channel[0].decoded.as_ref().expect("admin packet is not encrypted");
    assert_eq!(data.payload, admin::set_channel(&[0x08, 0x00]));
}

#[test]
fn missing_reboot_falls_back_to_ready() {
    let mut radio = Radio::new(admin_config());
    let nonce = radio.boot_to_configuring();
    radio.receive(&handshake(nonce));
    for _ in 0..4 {
        radio.advance(200);
    }
    radio.advance(2_000);
    radio.advance(500);
    assert_eq!(
        radio.bridge.state(),
        ConnectionState::ApplyingConfig(ConfigPhase::AwaitingReboot)
    );

    radio.advance(14_999);
    assert!(!radio.bridge.is_ready());
    radio.advance(1);
    assert!(radio.bridge.is_ready());
    assert!(radio.bridge.config_applied());
    assert_eq!(radio.events(), ["ready"]);
}

#[test]
fn apply_config_on_demand() {
    let mut radio = Radio::new(BridgeConfig::default());
    radio.boot_to_ready();
    assert!(matches!(radio.bridge.apply_config(), Err(BridgeError::NoAdminConfig)));

    let mut radio = Radio::new(BridgeConfig {
        configure_on_boot: false,
        ..admin_config()
    });
    radio.boot_to_ready();
    assert!(!radio.bridge.config_applied());

    radio.bridge.apply_config().expect("config should start applying");
    assert_eq!(
        radio.bridge.state(),
        ConnectionState::ApplyingConfig(ConfigPhase::SendingSettings { next: 0 })
    );
}

#[test]
fn config_dump_does_not_disturb_state() {
    let mut radio = Radio::new(BridgeConfig::default());
    assert!(matches!(radio.bridge.dump_radio_config(), Err(BridgeError::NotReady(ConnectionState::Off))));

    radio.boot_to_ready();
    radio.take_outbound();
    radio.bridge.dump_radio_config().expect("dump should be requested");
    assert_eq!(radio.sent(), vec![ToRadio::WantConfig(0xDEAD)]);

    let lora = from_radio(|b| encode_field_varint(7, 3, b));
    radio.receive(&from_radio(|b| {
        encode_field_bytes(5, &from_radio(|c| encode_field_bytes(6, &lora, c)), b);
        encode_field_varint(7, 0xDEAD, b);
    }));
    assert_eq!(radio.bridge.state(), ConnectionState::Ready);
    assert!(radio.events().is_empty());
}

#[test]
fn noise_between_frames_is_skipped() {
    let mut radio = Radio::new(BridgeConfig::default());
    let nonce = radio.boot_to_configuring();

    radio
        .bridge
        .link_mut()
        .push_inbound(b"INFO  | ??:??:?? 2 [Main] booting\r\n");
    radio.receive(&handshake(nonce));
    assert!(radio.bridge.is_ready());
    assert!(radio.bridge.framer_stats().discarded_bytes > 0);
}
