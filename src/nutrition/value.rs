use serde::{Deserialize, Deserializer, Serialize};

/// A number as clients and the dining API send it: a bare JSON number or a
/// string that may carry a unit suffix ("12g", "300mg", "2000 kcal").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Number(f64),
    Text(String),
}

impl Numeric {
    /// Unit-tolerant parse used for nutrient amounts. Every character that is
    /// not an ASCII digit or a dot is dropped, then the leading decimal is
    /// read. Anything unparseable is zero and the sign is never kept.
    pub fn nutrient(&self) -> f64 {
        match self {
            Numeric::Number(n) if n.is_finite() => n.abs(),
            Numeric::Number(_) => 0.0,
            Numeric::Text(s) => {
                let kept: String = s
                    .chars()
                    .filter(|c| c.is_ascii_digit() || *c == '.')
                    .collect();
                leading_decimal(&kept).unwrap_or(0.0)
            }
        }
    }

    /// Leading-number parse used for targets and body measurements. Keeps the
    /// sign and ignores whatever follows the number.
    pub fn leading(&self) -> Option<f64> {
        match self {
            Numeric::Number(n) if n.is_finite() => Some(*n),
            Numeric::Number(_) => None,
            Numeric::Text(s) => leading_signed(s.trim()),
        }
    }
}

impl From<f64> for Numeric {
    fn from(value: f64) -> Self {
        Numeric::Number(value)
    }
}

impl From<&str> for Numeric {
    fn from(value: &str) -> Self {
        Numeric::Text(value.to_string())
    }
}

/// Parses an optional nutrient amount; a missing value counts as zero.
pub fn parse_nutrient(value: Option<&Numeric>) -> f64 {
    value.map_or(0.0, Numeric::nutrient)
}

/// Serde helper: accepts a number, a numeric string or null and yields the
/// leading number, defaulting to zero.
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Numeric>::deserialize(deserializer)?;
    Ok(raw.and_then(|n| n.leading()).unwrap_or(0.0))
}

fn leading_decimal(s: &str) -> Option<f64> {
    let mut end = 0;
    let mut digits = 0;
    let mut seen_dot = false;
    for (i, c) in s.char_indices() {
        if c.is_ascii_digit() {
            digits += 1;
            end = i + 1;
        } else if c == '.' && !seen_dot {
            seen_dot = true;
            end = i + 1;
        } else {
            break;
        }
    }
    if digits == 0 {
        return None;
    }
    s[..end].parse().ok()
}

fn leading_signed(s: &str) -> Option<f64> {
    if let Some(rest) = s.strip_prefix('-') {
        leading_decimal(rest).map(|v| -v)
    } else {
        leading_decimal(s.strip_prefix('+').unwrap_or(s))
    }
}

/// Half-up rounding to an integer, matching how targets have always been
/// rounded (2.5 → 3, -2.5 → -2).
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Rounds to one decimal place.
pub fn round1(value: f64) -> f64 {
    round_half_up(value * 10.0) / 10.0
}
