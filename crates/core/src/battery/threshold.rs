/// Error type for threshold input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ThresholdError {
    #[error("threshold is empty")]
    Empty,
    #[error("threshold is not a number: {0:?}")]
    NotANumber(String),
}

/// Parse a threshold typed by the user.
///
/// Any finite real is accepted, including values outside [0, 100]; those
/// simply never trigger or trigger at once.
pub fn parse_threshold(input: &str) -> Result<f64, ThresholdError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ThresholdError::Empty);
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ThresholdError::NotANumber(trimmed.to_owned())),
    }
}
