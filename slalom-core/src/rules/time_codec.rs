//! Localized time tokens <-> seconds.
//!
//! Sheets print times as `SS,cc` or `MM:SS,cc`, with either a comma or a
//! period as decimal separator. Parsing never fails loudly: anything that is
//! not a time becomes `None`.

/// Parse a time token into seconds.
///
/// Accepts `SS[,.]cc` and `MM:SS[,.]cc`. Returns `None` for empty input,
/// non-numeric parts, more than one colon, or a non-finite result. The
/// seconds part is not checked against 60.
pub fn parse_time(text: &str) -> Option<f64> {
    let token = text.trim();
    if token.is_empty() {
        return None;
    }

    let normalized = token.replace(',', ".");
    let value = match normalized.split_once(':') {
        Some((minutes, seconds)) => {
            if seconds.contains(':') {
                return None;
            }
            let minutes: u64 = minutes.trim().parse().ok()?;
            let seconds: f64 = seconds.trim().parse().ok()?;
            minutes as f64 * 60.0 + seconds
        }
        None => normalized.parse::<f64>().ok()?,
    };

    value.is_finite().then_some(value)
}

/// `parse_time` for a field that may be missing altogether.
pub fn parse_time_opt(text: Option<&str>) -> Option<f64> {
    text.and_then(parse_time)
}

/// Rewrite period decimal separators to the comma used in output.
pub fn normalize_separator(token: &str) -> String {
    token.replace('.', ",")
}

/// Two fractional digits, comma separator.
///
/// Rounding is done by `{:.2}` on the binary value, so `1.005` (stored as
/// 1.00499...) renders as `1,00`.
pub fn format_decimal(value: f64) -> String {
    format!("{value:.2}").replace('.', ",")
}

/// `format_decimal` with a trailing percent sign.
pub fn format_percent(value: f64) -> String {
    format!("{}%", format_decimal(value))
}

/// Render an optional number; `None` becomes an empty field.
pub fn format_optional(value: Option<f64>) -> String {
    value.map(format_decimal).unwrap_or_default()
}
