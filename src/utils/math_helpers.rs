/// Returns `true` if `value` is finite and strictly positive.
#[inline]
pub fn is_positive_finite(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
