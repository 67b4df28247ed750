//! Init-system classification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of init system running as PID 1.
///
/// Probed once at startup and passed to the reporting layer, which only
/// queries unit names on systemd-class hosts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitSystemKind {
    /// No init system could be observed (e.g. a bare container)
    #[default]
    None,
    /// systemd or a compatible manager answering `systemctl`
    SystemdClass,
    /// Some other init system
    Other,
}

impl InitSystemKind {
    /// Whether unit names can be looked up on this host.
    #[must_use]
    pub const fn has_units(self) -> bool {
        matches!(self, Self::SystemdClass)
    }
}

impl fmt::Display for InitSystemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::SystemdClass => write!(f, "systemd"),
            Self::Other => write!(f, "other"),
        }
    }
}
