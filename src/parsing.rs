use tracing::debug;

use crate::accumulator::ErrorSink;
use crate::error::{GatherError, QuantityError};

/// A parsed resource quantity: `mantissa * 10^exp10 * 2^exp2`.
///
/// The decimal point of the source string is folded into `exp10`, so
/// `"2.5Gi"` becomes `25 * 10^-1 * 2^30`. Keeping the parts separate lets
/// scaling happen before any division, which avoids truncating sub-unit
/// values such as `"250m"` to zero before they are expressed in millicores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantity {
    pub mantissa: i128,
    pub exp10: i32,
    pub exp2: u32,
}

impl Quantity {
    /// Magnitude multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> f64 {
        let mut value = self.mantissa as f64 * factor * 2f64.powi(self.exp2 as i32);
        if self.exp10 >= 0 {
            value *= 10f64.powi(self.exp10);
        } else {
            value /= 10f64.powi(-self.exp10);
        }
        value
    }

    pub fn as_f64(&self) -> f64 {
        self.scaled(1.0)
    }
}

const BINARY_SUFFIXES: &[(&str, u32)] = &[
    ("Ki", 10),
    ("Mi", 20),
    ("Gi", 30),
    ("Ti", 40),
    ("Pi", 50),
    ("Ei", 60),
];

const DECIMAL_SUFFIXES: &[(&str, i32)] = &[
    ("n", -9),
    ("u", -6),
    ("m", -3),
    ("k", 3),
    ("M", 6),
    ("G", 9),
    ("T", 12),
    ("P", 15),
    ("E", 18),
];

/// Parse a resource quantity string (`"1500m"`, `"4Gi"`, `"1e3"`, `"0.5"`).
pub fn parse_quantity(raw: &str) -> Result<Quantity, QuantityError> {
    let q = raw.trim();
    if q.is_empty() {
        return Err(QuantityError::new(raw, "empty string"));
    }

    let (negative, rest) = match q.as_bytes()[0] {
        b'-' => (true, &q[1..]),
        b'+' => (false, &q[1..]),
        _ => (false, q),
    };

    let number_len = rest
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(rest.len());
    let (number, suffix) = rest.split_at(number_len);

    let (int_part, frac_part) = match number.split_once('.') {
        Some((i, f)) => (i, f),
        None => (number, ""),
    };
    if frac_part.contains('.') {
        return Err(QuantityError::new(raw, "more than one decimal point"));
    }
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(QuantityError::new(raw, "missing digits"));
    }

    let digits = format!("{}{}", int_part, frac_part);
    let mut mantissa: i128 = digits
        .parse()
        .map_err(|_| QuantityError::new(raw, "too many digits"))?;
    if negative {
        mantissa = -mantissa;
    }
    let frac_len = i32::try_from(frac_part.len())
        .map_err(|_| QuantityError::new(raw, "too many digits"))?;

    let (exp10, exp2) = parse_suffix(suffix).ok_or_else(|| QuantityError::new(raw, "unknown suffix"))?;

    Ok(Quantity {
        mantissa,
        exp10: exp10 - frac_len,
        exp2,
    })
}

fn parse_suffix(suffix: &str) -> Option<(i32, u32)> {
    if suffix.is_empty() {
        return Some((0, 0));
    }
    if let Some((_, shift)) = BINARY_SUFFIXES.iter().find(|(s, _)| *s == suffix) {
        return Some((0, *shift));
    }
    if let Some((_, exp)) = DECIMAL_SUFFIXES.iter().find(|(s, _)| *s == suffix) {
        return Some((*exp, 0));
    }
    // Order matters: a bare "E" is exa, "E3"/"e-2" is a decimal exponent
    let exponent = suffix.strip_prefix('e').or_else(|| suffix.strip_prefix('E'))?;
    let unsigned = exponent.strip_prefix(&['+', '-'][..]).unwrap_or(exponent);
    if unsigned.is_empty() || !unsigned.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    exponent.parse::<i32>().ok().map(|e| (e, 0))
}

/// Convert a quantity string to an integer at the given scale.
///
/// A factor below 1 is treated as 1. On a malformed string the error is
/// handed to `errors` and zero is returned; the caller carries on.
pub fn convert_quantity<S: ErrorSink + ?Sized>(raw: &str, factor: f64, errors: &S) -> i64 {
    let factor = if factor < 1.0 { 1.0 } else { factor };
    match parse_quantity(raw) {
        Ok(q) => q.scaled(factor) as i64,
        Err(e) => {
            debug!("failed to parse quantity: {}", e);
            errors.add_error(GatherError::from(e));
            0
        }
    }
}

/// Plain integer counts such as the node `pods` capacity. Anything else reads as 0.
pub fn parse_count(raw: &str) -> i64 {
    raw.trim().parse::<i64>().unwrap_or(0)
}
