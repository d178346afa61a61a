//! Pure field normalizers for the messy numeric encodings the source page
//! uses: `"+1.23%"`, `"(-3.45%)"`, `"1,234.56"`, `"45.6M"`, `"N/A"`, `"—"`.
//!
//! Every function here is total: any input string yields either a typed
//! value or `None`, never a panic. `None` means "could not determine" and
//! is distinct from zero — `"0"` and `"0%"` normalize to `Some(0.0)`.

/// Normalizes a percent string into a signed decimal.
///
/// Strips surrounding parentheses, a leading `+`, a trailing `%`, and
/// thousands separators. A leading `-` or a parenthesized form is negative.
///
/// # Arguments
/// * `text`: Raw percent text, e.g. `"+1.23%"`, `"(-3.45%)"`, `"0%"`
///
/// # Returns
/// The signed decimal value, or `None` on empty, `"N/A"`, or non-numeric
/// residue.
pub fn normalize_percent(text: &str) -> Option<f64> {
    let mut t = text.trim();
    if t.is_empty() {
        return None;
    }

    let mut negative = false;
    if t.starts_with('(') && t.ends_with(')') && t.len() >= 2 {
        negative = true;
        t = t[1..t.len() - 1].trim();
    }

    t = t.strip_suffix('%').unwrap_or(t).trim_end();
    t = t.strip_prefix('+').unwrap_or(t);
    if let Some(rest) = t.strip_prefix('-') {
        negative = true;
        t = rest;
    }

    let value = parse_plain_number(t)?;
    Some(if negative { -value } else { value })
}

/// Normalizes a currency-like price string into a decimal.
///
/// Strips thousands separators and a leading currency symbol (`$`, `€`,
/// `£`). Returns `None` on non-numeric residue.
pub fn normalize_price(text: &str) -> Option<f64> {
    let mut t = text.trim();
    if t.is_empty() {
        return None;
    }

    t = t.strip_prefix('+').unwrap_or(t);
    let negative = if let Some(rest) = t.strip_prefix('-') {
        t = rest;
        true
    } else {
        false
    };
    for symbol in ['$', '€', '£'] {
        if let Some(rest) = t.strip_prefix(symbol) {
            t = rest.trim_start();
            break;
        }
    }

    let value = parse_plain_number(t)?;
    Some(if negative { -value } else { value })
}

/// Normalizes an abbreviated-magnitude string into a decimal.
///
/// Recognizes case-insensitive suffixes `K`/`M`/`B`/`T` meaning
/// ×10³/10⁶/10⁹/10¹² applied to the numeric prefix. Plain numeric strings
/// pass through unscaled. Placeholders (`"—"`, `"N/A"`) and anything else
/// non-numeric return `None`.
pub fn normalize_magnitude(text: &str) -> Option<f64> {
    let t = text.trim();
    if t.is_empty() {
        return None;
    }

    let (prefix, scale) = match t.chars().last() {
        Some(c) if c.eq_ignore_ascii_case(&'k') => (&t[..t.len() - c.len_utf8()], 1e3),
        Some(c) if c.eq_ignore_ascii_case(&'m') => (&t[..t.len() - c.len_utf8()], 1e6),
        Some(c) if c.eq_ignore_ascii_case(&'b') => (&t[..t.len() - c.len_utf8()], 1e9),
        Some(c) if c.eq_ignore_ascii_case(&'t') => (&t[..t.len() - c.len_utf8()], 1e12),
        _ => (t, 1.0),
    };

    let value = parse_plain_number(prefix.trim_end())?;
    Some(value * scale)
}

/// Parses a number after removing thousands separators. `None` when the
/// residue is empty or not a plain decimal.
fn parse_plain_number(text: &str) -> Option<f64> {
    let cleaned: String = text.chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}
