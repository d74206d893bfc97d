//! Status code selection for the simulated oracles.

use rand::Rng;

use crate::config::StatusPolicy;
use crate::models::FlightStatus;

/// Where an oracle's answer comes from. Injected into the dispatcher so
/// tests can pin the drawn codes and drive the contract's consensus rule
/// deterministically.
pub trait StatusSource: Send + Sync {
    /// Draws the status one oracle reports for one request. Drawn once per
    /// oracle per cycle; oracles never share a draw.
    fn draw(&self) -> FlightStatus;
}

/// Uniform draw over the codes the configured policy allows.
pub struct RandomStatusSource {
    policy: StatusPolicy,
}

impl RandomStatusSource {
    pub fn new(policy: StatusPolicy) -> Self {
        RandomStatusSource { policy }
    }
}

impl StatusSource for RandomStatusSource {
    fn draw(&self) -> FlightStatus {
        let codes: &[FlightStatus] = match self.policy {
            StatusPolicy::LateOnly => &FlightStatus::LATE,
            StatusPolicy::Any => &FlightStatus::ALL,
        };
        codes[rand::thread_rng().gen_range(0..codes.len())]
    }
}

/// Always answers the same code. Lets tests make every oracle agree so the
/// ledger-side consensus threshold is reached on demand.
pub struct FixedStatusSource(pub FlightStatus);

impl StatusSource for FixedStatusSource {
    fn draw(&self) -> FlightStatus {
        self.0
    }
}
