use std::fmt;

/// Step of an admin configuration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigPhase {
    /// Sending queued settings messages; `next` indexes the next one.
    SendingSettings { next: usize },
    /// Waiting for the radio to commit settings to flash.
    AwaitingCommit,
    SendingChannel,
    SendingReboot,
    /// Waiting for the radio to come back after the reboot directive.
    AwaitingReboot,
}

impl ConfigPhase {
    /// Phase number, `0..=4`.
    pub fn index(&self) -> u8 {
        match self {
            Self::SendingSettings { .. } => 0,
            Self::AwaitingCommit => 1,
            Self::SendingChannel => 2,
            Self::SendingReboot => 3,
            Self::AwaitingReboot => 4,
        }
    }

    /// Phases in which a reboot from the radio is expected.
    pub fn expects_reboot(&self) -> bool {
        matches!(self, Self::AwaitingCommit | Self::AwaitingReboot)
    }
}

/// Connection state of the radio link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
    #[default]
    Off,
    PoweringOn,
    Initializing,
    Configuring,
    ApplyingConfig(ConfigPhase),
    Ready,
    Sending,
}

impl ConnectionState {
    /// Human-readable label, as shown in status displays.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Off => "Off",
            Self::PoweringOn => "Booting",
            Self::Initializing => "Initializing",
            Self::Configuring => "Configuring",
            Self::ApplyingConfig(_) => "Applying Config",
            Self::Ready => "Ready",
            Self::Sending => "Sending",
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// States in which inbound serial bytes are read and dispatched.
    pub fn reads_serial(&self) -> bool {
        matches!(
            self,
            Self::Configuring | Self::ApplyingConfig(_) | Self::Ready | Self::Sending
        )
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApplyingConfig(phase) => write!(f, "{} (phase {})", self.label(), phase.index()),
            _ => f.write_str(self.label()),
        }
    }
}
