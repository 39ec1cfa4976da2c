use crate::{FscError, FscResult};

/// Reject NaN and infinities.
pub fn ensure_finite(v: f64, what: &'static str) -> FscResult<f64> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(FscError::NonFinite { what, value: v })
    }
}

/// Finite and `>= 0`. Used for hysteresis bands.
pub fn ensure_non_negative(v: f64, what: &'static str) -> FscResult<f64> {
    let v = ensure_finite(v, what)?;
    if v < 0.0 {
        return Err(FscError::Negative { what, value: v });
    }
    Ok(v)
}

/// Finite and strictly positive. Used for sampling intervals.
pub fn ensure_positive(v: f64, what: &'static str) -> FscResult<f64> {
    let v = ensure_finite(v, what)?;
    if v <= 0.0 {
        return Err(FscError::InvalidArg { what });
    }
    Ok(v)
}
