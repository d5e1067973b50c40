use std::cell::Cell;
use std::rc::Rc;
use std::sync::atomic::Ordering;

use crate::cmd::radio::{self, Radio, POLL_INTERVAL};
use crate::cmd::SendArgs;
use crate::exit::{bridge_error, CliError, CliResult, DELIVERY_FAILED, FAILURE, SUCCESS};
use crate::output::{destination_name, print_send, OutputFormat, SendOutput};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let running = radio::install_ctrlc_handler()?;
    let mut radio = radio::open(&args.radio)?;
    let outcome = watch_outcome(&mut radio);

    radio::wait_until_ready(&mut radio, args.radio.ready_timeout, &running)?;

    let destination = args.to.unwrap_or(radio.config().default_destination);
    let channel = args.channel.unwrap_or(radio.config().default_channel);
    let packet_id = radio
        .send_text(&args.message, destination, channel)
        .map_err(|err| bridge_error("send failed", err))?;

    let mut out = SendOutput {
        packet_id,
        destination: destination_name(destination),
        channel,
        delivered: None,
    };
    if args.no_ack {
        print_send(&out, format);
        return Ok(SUCCESS);
    }

    // the bridge fails the send itself once its ack timeout passes
    while outcome.get().is_none() {
        if !running.load(Ordering::SeqCst) {
            return Err(CliError::new(FAILURE, "interrupted while waiting for ack"));
        }
        radio.tick();
        std::thread::sleep(POLL_INTERVAL);
    }

    out.delivered = outcome.get();
    print_send(&out, format);
    Ok(match out.delivered {
        Some(true) => SUCCESS,
        _ => DELIVERY_FAILED,
    })
}

fn watch_outcome(radio: &mut Radio) -> Rc<Cell<Option<bool>>> {
    let outcome = Rc::new(Cell::new(None));
    let delivered = Rc::clone(&outcome);
    radio.on_send_success(move || delivered.set(Some(true)));
    let failed = Rc::clone(&outcome);
    radio.on_send_failed(move || failed.set(Some(false)));
    outcome
}
