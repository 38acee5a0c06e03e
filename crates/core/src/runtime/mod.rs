mod clock;
mod scheduler;
mod shutdown;

pub use clock::SimulationClock;
pub use scheduler::{Runtime, RuntimeError, RuntimeTask};
pub use shutdown::ShutdownGuard;
pub use crate::types::DashboardStatus;
