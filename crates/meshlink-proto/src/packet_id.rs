use rand::RngCore;

const COUNTER_BITS: u32 = 10;
const COUNTER_MASK: u32 = (1 << COUNTER_BITS) - 1;
const RANDOM_MASK: u32 = 0x003F_FFFF;

/// Produces mesh packet ids: 22 random high bits over a 10-bit counter.
///
/// Ids are never zero, since the radio reserves 0 for "no id".
#[derive(Debug, Clone, Default)]
pub struct PacketIdGenerator {
    counter: u32,
}

impl PacketIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self, rng: &mut impl RngCore) -> u32 {
        loop {
            self.counter = self.counter.wrapping_add(1);
            let random = rng.next_u32() & RANDOM_MASK;
            let id = (random << COUNTER_BITS) | (self.counter & COUNTER_MASK);
            if id != 0 {
                return id;
            }
        }
    }
}

/// Nonce for a `want_config` request: random with the low bit forced on.
pub fn config_nonce(rng: &mut impl RngCore) -> u32 {
    rng.next_u32() | 1
}
