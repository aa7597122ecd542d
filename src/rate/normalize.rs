// Rate input normalization: anything the UI hands us (a list item's value, a
// slider position, a number from the host) becomes a finite playback rate.

/// Rate used whenever an input cannot be read as a finite number. This is the
/// system default, not the configured `default_value`.
pub const DEFAULT_PLAYBACK_RATE: f64 = 1.0;

/// Raw playback-rate input as it arrives from the presentation layer or host.
pub trait ToRate {
    /// Numeric reading of the input, `NaN` when it is not a number.
    fn to_number(&self) -> f64;
}

impl ToRate for f64 {
    fn to_number(&self) -> f64 {
        *self
    }
}

impl ToRate for f32 {
    fn to_number(&self) -> f64 {
        f64::from(*self)
    }
}

macro_rules! int_to_rate {
    ($($t:ty),*) => {
        $(impl ToRate for $t {
            fn to_number(&self) -> f64 {
                f64::from(*self)
            }
        })*
    };
}

int_to_rate!(i8, i16, i32, u8, u16, u32);

impl ToRate for &str {
    fn to_number(&self) -> f64 {
        let trimmed = self.trim();
        // Blank text reads as zero, the way a form value does.
        if trimmed.is_empty() {
            return 0.0;
        }
        if let Some(value) = parse_radix(trimmed) {
            return value;
        }
        trimmed.parse::<f64>().unwrap_or(f64::NAN)
    }
}

// Unsigned `0x`/`0o`/`0b` integer literals, as numeric text coercion reads
// them. A sign in front makes them invalid.
fn parse_radix(text: &str) -> Option<f64> {
    let radix = match text.get(..2)? {
        "0x" | "0X" => 16,
        "0o" | "0O" => 8,
        "0b" | "0B" => 2,
        _ => return None,
    };
    let digits = &text[2..];
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return Some(f64::NAN);
    }
    Some(u64::from_str_radix(digits, radix).map_or(f64::NAN, |v| v as f64))
}

impl ToRate for String {
    fn to_number(&self) -> f64 {
        self.as_str().to_number()
    }
}

impl ToRate for &String {
    fn to_number(&self) -> f64 {
        self.as_str().to_number()
    }
}

/// Convert raw input to a finite rate, falling back to [`DEFAULT_PLAYBACK_RATE`].
pub fn normalize(raw: impl ToRate) -> f64 {
    let value = raw.to_number();
    if value.is_finite() {
        value
    } else {
        DEFAULT_PLAYBACK_RATE
    }
}
