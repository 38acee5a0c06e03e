pub mod forecast;
pub mod machine;
pub mod recharge;
pub mod threshold;

pub use machine::{StepOutcome, StepParams, step};
pub use recharge::recharge;
pub use threshold::{ThresholdError, parse_threshold};
