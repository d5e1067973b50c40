use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use meshlink_bridge::{BridgeConfig, MeshBridge};
use meshlink_transport::{MonotonicClock, SerialLink};
use rand::rngs::ThreadRng;
use tracing::info;

use crate::cmd::RadioArgs;
use crate::exit::{bridge_error, io_error, CliError, CliResult, INTERNAL, TIMEOUT};

/// Pause between scheduler passes.
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

pub type Radio = MeshBridge<Box<dyn SerialLink>, MonotonicClock, ThreadRng>;

pub fn load_config(path: Option<&Path>) -> CliResult<BridgeConfig> {
    let Some(path) = path else {
        return Ok(BridgeConfig::default());
    };
    let json = fs::read_to_string(path)
        .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?;
    BridgeConfig::from_json(&json)
        .map_err(|err| bridge_error(&format!("invalid config {}", path.display()), err))
}

/// Open the device and start the handshake.
///
/// The CLI has no power line, so the radio is assumed to be running and is
/// woken straight away regardless of `enable_on_boot`.
pub fn open(args: &RadioArgs) -> CliResult<Radio> {
    let config = load_config(args.config.as_deref())?;
    let link = open_link(args)?;
    let mut radio = MeshBridge::new(link, MonotonicClock::new(), rand::rng(), config);
    radio.power_on();
    Ok(radio)
}

#[cfg(unix)]
fn open_link(args: &RadioArgs) -> CliResult<Box<dyn SerialLink>> {
    let link = meshlink_transport::TtyLink::open_with_baud(&args.device, args.baud)
        .map_err(|err| crate::exit::transport_error("open failed", err))?;
    Ok(Box::new(link))
}

#[cfg(not(unix))]
fn open_link(args: &RadioArgs) -> CliResult<Box<dyn SerialLink>> {
    Err(CliError::new(
        crate::exit::USAGE,
        format!(
            "cannot open {}: serial devices are only supported on unix hosts",
            args.device.display()
        ),
    ))
}

/// Tick until the bridge is ready, the timeout passes, or `running` clears.
pub fn wait_until_ready(radio: &mut Radio, timeout: Duration, running: &AtomicBool) -> CliResult<()> {
    let start = Instant::now();
    while !radio.is_ready() {
        if !running.load(Ordering::SeqCst) {
            return Err(CliError::new(crate::exit::FAILURE, "interrupted"));
        }
        if start.elapsed() >= timeout {
            return Err(CliError::new(
                TIMEOUT,
                format!(
                    "radio not ready after {timeout:?} (state: {})",
                    radio.state().label()
                ),
            ));
        }
        radio.tick();
        std::thread::sleep(POLL_INTERVAL);
    }
    info!(
        node = format_args!("{:#010x}", radio.my_node_num()),
        long_name = radio.my_long_name(),
        "radio ready"
    );
    Ok(())
}

/// Clear the returned flag on Ctrl-C.
pub fn install_ctrlc_handler() -> CliResult<Arc<AtomicBool>> {
    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    ctrlc::set_handler(move || {
        flag.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))?;
    Ok(running)
}
