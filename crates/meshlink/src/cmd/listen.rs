use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::Ordering;

use meshlink_bridge::TextMessage;
use tracing::info;

use crate::cmd::radio::{self, POLL_INTERVAL};
use crate::cmd::ListenArgs;
use crate::exit::{bridge_error, CliResult, SUCCESS};
use crate::output::{print_message, OutputFormat};

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let running = radio::install_ctrlc_handler()?;
    let mut radio = radio::open(&args.radio)?;

    let inbox: Rc<RefCell<Vec<TextMessage>>> = Rc::default();
    let sink = Rc::clone(&inbox);
    radio.on_text(move |message| sink.borrow_mut().push(message.clone()));
    radio.on_state_change(|state| info!(%state, "radio state"));

    radio::wait_until_ready(&mut radio, args.radio.ready_timeout, &running)?;
    if args.dump_config {
        radio
            .dump_radio_config()
            .map_err(|err| bridge_error("config dump failed", err))?;
    }

    let mut printed = 0usize;
    while running.load(Ordering::SeqCst) {
        radio.tick();
        for message in inbox.borrow_mut().drain(..) {
            print_message(&message, format);
            printed = printed.saturating_add(1);
            if args.count.is_some_and(|count| printed >= count) {
                return Ok(SUCCESS);
            }
        }
        std::thread::sleep(POLL_INTERVAL);
    }

    Ok(SUCCESS)
}
