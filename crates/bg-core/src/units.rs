// bg-core/src/units.rs

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uom::si::f64::{Length as UomLength, Mass as UomMass};

use crate::{CoreError, CoreResult};

// Public canonical unit types (SI, f64)
pub type Length = UomLength;
pub type Mass = UomMass;

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn mm(v: f64) -> Length {
    use uom::si::length::millimeter;
    Length::new::<millimeter>(v)
}

#[inline]
pub fn g(v: f64) -> Mass {
    use uom::si::mass::gram;
    Mass::new::<gram>(v)
}

#[inline]
pub fn length_mm(l: Length) -> f64 {
    use uom::si::length::millimeter;
    l.get::<millimeter>()
}

#[inline]
pub fn mass_g(mass: Mass) -> f64 {
    use uom::si::mass::gram;
    mass.get::<gram>()
}

/// A quantity as it appears in a resource or board file: either a bare number
/// in the default unit or text carrying its own unit suffix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuantityText {
    Number(f64),
    Text(String),
}

impl QuantityText {
    pub fn to_length(&self) -> CoreResult<Length> {
        match self {
            QuantityText::Number(v) => Ok(m(finite(*v, "length")?)),
            QuantityText::Text(text) => parse_length(text),
        }
    }

    pub fn to_mass(&self) -> CoreResult<Mass> {
        match self {
            QuantityText::Number(v) => Ok(g(finite(*v, "mass")?)),
            QuantityText::Text(text) => parse_mass(text),
        }
    }
}

fn finite(v: f64, what: &'static str) -> CoreResult<f64> {
    crate::ensure_finite(v, what)
}

/// Split `"12.5 mm"` into `(12.5, "mm")`. The unit part is trimmed and may be empty.
fn split_quantity<'a>(what: &'static str, text: &'a str) -> CoreResult<(f64, &'a str)> {
    let trimmed = text.trim();
    let end = trimmed
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E')))
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(end);
    let value: f64 = number.parse().map_err(|_| CoreError::BadQuantity {
        what,
        text: text.to_string(),
        reason: format!("\"{number}\" is not a number"),
    })?;
    Ok((finite(value, what)?, unit.trim()))
}

/// Parse a length such as `"5.3in"`, `"12 mm"` or `"2"` (meters when no unit is given).
pub fn parse_length(text: &str) -> CoreResult<Length> {
    use uom::si::length::{centimeter, foot, inch, meter, millimeter};

    let (value, unit) = split_quantity("length", text)?;
    let length = match unit.to_ascii_lowercase().as_str() {
        "" | "m" | "meter" | "meters" => Length::new::<meter>(value),
        "cm" | "centimeter" | "centimeters" => Length::new::<centimeter>(value),
        "mm" | "millimeter" | "millimeters" => Length::new::<millimeter>(value),
        "in" | "inch" | "inches" => Length::new::<inch>(value),
        "ft" | "foot" | "feet" => Length::new::<foot>(value),
        _ => {
            return Err(CoreError::UnknownUnit {
                what: "length",
                unit: unit.to_string(),
            });
        }
    };
    Ok(length)
}

/// Parse a mass such as `"12.41 lbs"` or `"51g"` (grams when no unit is given).
pub fn parse_mass(text: &str) -> CoreResult<Mass> {
    use uom::si::mass::{gram, kilogram, milligram};

    // International avoirdupois definitions; uom rounds the pound to 7 digits.
    const GRAMS_PER_POUND: f64 = 453.592_37;
    const GRAMS_PER_OUNCE: f64 = GRAMS_PER_POUND / 16.0;

    let (value, unit) = split_quantity("mass", text)?;
    let mass = match unit.to_ascii_lowercase().as_str() {
        "" | "g" | "gram" | "grams" => Mass::new::<gram>(value),
        "mg" | "milligram" | "milligrams" => Mass::new::<milligram>(value),
        "kg" | "kilogram" | "kilograms" | "kilos" => Mass::new::<kilogram>(value),
        "lb" | "lbs" | "pound" | "pounds" => Mass::new::<gram>(value * GRAMS_PER_POUND),
        "oz" | "ounce" | "ounces" => Mass::new::<gram>(value * GRAMS_PER_OUNCE),
        _ => {
            return Err(CoreError::UnknownUnit {
                what: "mass",
                unit: unit.to_string(),
            });
        }
    };
    Ok(mass)
}

pub fn format_length(l: Length) -> String {
    format!("{}mm", length_mm(l))
}

pub fn format_mass(mass: Mass) -> String {
    format!("{}g", mass_g(mass))
}

/// An amount of US dollars stored as fixed-point micro-dollars.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Usd(u64);

impl Usd {
    const DECIMALS: usize = 6;
    const PER_DOLLAR: u64 = 1_000_000;
    const PER_CENT: u64 = 10_000;

    pub const ZERO: Usd = Usd(0);

    /// `None` if the amount does not fit in micro-dollars.
    pub fn new(dollars: u64, cents: u64) -> Option<Usd> {
        dollars
            .checked_mul(Self::PER_DOLLAR)?
            .checked_add(cents.checked_mul(Self::PER_CENT)?)
            .map(Usd)
    }

    pub fn from_micros(micros: u64) -> Self {
        Self(micros)
    }

    pub fn micros(self) -> u64 {
        self.0
    }

    pub fn dollars(self) -> u64 {
        self.0 / Self::PER_DOLLAR
    }

    /// Whole cents past the dollar amount.
    pub fn cents(self) -> u64 {
        (self.0 % Self::PER_DOLLAR) / Self::PER_CENT
    }

    pub fn checked_mul(self, n: u64) -> Option<Usd> {
        self.0.checked_mul(n).map(Usd)
    }

    pub fn checked_add(self, other: Usd) -> Option<Usd> {
        self.0.checked_add(other.0).map(Usd)
    }

    fn bad(text: &str, reason: impl Into<String>) -> CoreError {
        CoreError::BadQuantity {
            what: "USD",
            text: text.to_string(),
            reason: reason.into(),
        }
    }

    fn parse_whole(text: &str, digits: &str, what: &str) -> CoreResult<u64> {
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Self::bad(text, format!("invalid {what} \"{digits}\"")));
        }
        digits
            .parse()
            .map_err(|_| Self::bad(text, format!("{what} out of range")))
    }
}

impl FromStr for Usd {
    type Err = CoreError;

    /// Accepts `"$5.99"`, `"5.5"` (five dollars fifty), `"40"` and `"40c"`.
    fn from_str(text: &str) -> CoreResult<Usd> {
        let s = text.trim();
        if s.is_empty() {
            return Err(Self::bad(text, "empty amount"));
        }
        let (dollar_sign, s) = match s.strip_prefix('$') {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        if let Some(cents) = s.strip_suffix('c') {
            if dollar_sign {
                return Err(Self::bad(text, "amount starts with '$' and ends with 'c'"));
            }
            if cents.contains('.') {
                return Err(Self::bad(text, "cent amounts cannot have a decimal point"));
            }
            let cents = Self::parse_whole(text, cents, "cents")?;
            return cents
                .checked_mul(Self::PER_CENT)
                .map(Usd)
                .ok_or_else(|| Self::bad(text, "amount out of range"));
        }

        let (whole, frac) = s.split_once('.').unwrap_or((s, ""));
        let dollars = Self::parse_whole(text, whole, "dollars")?;
        let frac_micros = if frac.is_empty() {
            0
        } else {
            if frac.len() > Self::DECIMALS {
                return Err(Self::bad(text, "more than six decimal places"));
            }
            let digits = Self::parse_whole(text, frac, "fraction")?;
            digits * 10_u64.pow((Self::DECIMALS - frac.len()) as u32)
        };
        dollars
            .checked_mul(Self::PER_DOLLAR)
            .and_then(|d| d.checked_add(frac_micros))
            .map(Usd)
            .ok_or_else(|| Self::bad(text, "amount out of range"))
    }
}

impl fmt::Display for Usd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.dollars(), self.cents())
    }
}

impl Serialize for Usd {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Usd {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match QuantityText::deserialize(deserializer)? {
            QuantityText::Text(text) => text.parse().map_err(serde::de::Error::custom),
            QuantityText::Number(v) if v.is_finite() && v >= 0.0 => {
                let micros = (v * Usd::PER_DOLLAR as f64).round();
                if micros < u64::MAX as f64 {
                    Ok(Usd(micros as u64))
                } else {
                    Err(serde::de::Error::custom(format!(
                        "{v} is out of range for a USD amount"
                    )))
                }
            }
            QuantityText::Number(v) => Err(serde::de::Error::custom(format!(
                "{v} is not a valid USD amount"
            ))),
        }
    }
}
