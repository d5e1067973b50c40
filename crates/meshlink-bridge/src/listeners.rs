use crate::state::ConnectionState;

/// Ordered list of callbacks, invoked in registration order.
pub struct Listeners<F: ?Sized> {
    callbacks: Vec<Box<F>>,
}

impl<F: ?Sized> Listeners<F> {
    pub fn new() -> Self {
        Self {
            callbacks: Vec::new(),
        }
    }

    pub fn add(&mut self, callback: Box<F>) {
        self.callbacks.push(callback);
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut F> {
        self.callbacks.iter_mut().map(|callback| &mut **callback)
    }
}

impl<F: ?Sized> Default for Listeners<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: ?Sized> std::fmt::Debug for Listeners<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Listeners({})", self.callbacks.len())
    }
}

/// A received text message with its envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMessage {
    pub from: u32,
    pub to: u32,
    pub channel: u8,
    pub packet_id: u32,
    pub text: String,
}

/// Every event a bridge reports to its host.
#[derive(Debug, Default)]
pub(crate) struct BridgeListeners {
    pub ready: Listeners<dyn FnMut()>,
    pub message: Listeners<dyn FnMut(&str)>,
    pub text: Listeners<dyn FnMut(&TextMessage)>,
    pub send_success: Listeners<dyn FnMut()>,
    pub send_failed: Listeners<dyn FnMut()>,
    pub state_change: Listeners<dyn FnMut(ConnectionState)>,
}

impl BridgeListeners {
    pub fn fire_ready(&mut self) {
        self.ready.iter_mut().for_each(|callback| callback());
    }

    pub fn fire_message(&mut self, text: &str) {
        self.message.iter_mut().for_each(|callback| callback(text));
    }

    pub fn fire_text(&mut self, message: &TextMessage) {
        self.text.iter_mut().for_each(|callback| callback(message));
        self.fire_message(&message.text);
    }

    pub fn fire_send_success(&mut self) {
        self.send_success.iter_mut().for_each(|callback| callback());
    }

    pub fn fire_send_failed(&mut self) {
        self.send_failed.iter_mut().for_each(|callback| callback());
    }

    pub fn fire_state_change(&mut self, state: ConnectionState) {
        self.state_change.iter_mut().for_each(|callback| callback(state));
    }
}
