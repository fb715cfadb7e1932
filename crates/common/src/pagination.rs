/// Default page size for list endpoints.
pub const DEFAULT_LIMIT: usize = 50;
/// Hard cap on page size regardless of what the client asks for.
pub const MAX_LIMIT: usize = 100;

/// Clamp an optional client-supplied limit into `1..=MAX_LIMIT`.
/// Fractional values are floored; unparseable or absent values fall back
/// to `DEFAULT_LIMIT`.
pub fn clamp_limit(raw: Option<&str>) -> usize {
    match raw.and_then(|v| v.trim().parse::<f64>().ok()) {
        Some(n) if n.is_finite() && n.floor() >= 1.0 => (n.floor() as usize).min(MAX_LIMIT),
        Some(n) if n.is_finite() => 1,
        _ => DEFAULT_LIMIT,
    }
}
