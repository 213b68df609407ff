//! Exact hour quantities.
//!
//! Hours are held as integer hundredths so sums and comparisons never depend
//! on the order rows arrive in. Decimal text is only produced at the edges:
//! [`Hours`]'s `Display` for client-facing text, [`Hours::to_fixed`] for
//! reports, and a JSON number for serialized output.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};

use serde::{Serialize, Serializer};

/// A number of hours in hundredths (`1550` is 15.5 hours).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hours(i64);

impl Hours {
    pub const ZERO: Hours = Hours(0);

    pub const fn from_centi(centi: i64) -> Self {
        Hours(centi)
    }

    pub const fn centi(self) -> i64 {
        self.0
    }

    /// Round a float to the nearest hundredth. Used for numeric workbook
    /// cells and operator-entered values; non-finite input saturates.
    pub fn from_f64(hours: f64) -> Self {
        Hours((hours * 100.0).round() as i64)
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Absolute difference, inclusive comparison against `tolerance`.
    pub fn within(self, other: Hours, tolerance: Hours) -> bool {
        self.0.saturating_sub(other.0).saturating_abs() <= tolerance.0
    }

    /// Parse a non-negative decimal such as `8`, `7.5` or `1,040.25`.
    ///
    /// Commas and inner whitespace are ignored. A third decimal rounds half
    /// up; further digits are dropped. Signs, exponents and any other
    /// characters yield `None`.
    pub fn parse(text: &str) -> Option<Hours> {
        let cleaned: String = text
            .chars()
            .filter(|c| *c != ',' && !c.is_whitespace())
            .collect();
        let (whole, frac) = cleaned.split_once('.').unwrap_or((cleaned.as_str(), ""));

        if whole.is_empty() && frac.is_empty() {
            return None;
        }
        if !whole.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
            return None;
        }

        let mut centi: i64 = 0;
        for b in whole.bytes() {
            centi = centi.checked_mul(10)?.checked_add(i64::from(b - b'0'))?;
        }

        let mut digits = frac.bytes().map(|b| i64::from(b - b'0'));
        let tenths = digits.next().unwrap_or(0);
        let hundredths = digits.next().unwrap_or(0);
        let round_up = i64::from(digits.next().is_some_and(|d| d >= 5));

        centi
            .checked_mul(100)?
            .checked_add(tenths * 10 + hundredths + round_up)
            .map(Hours)
    }

    /// Always two decimals: `2.00`, `-6.50`.
    pub fn to_fixed(self) -> String {
        let (sign, whole, frac) = self.parts();
        format!("{sign}{whole}.{frac:02}")
    }

    fn parts(self) -> (&'static str, u64, u64) {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        (sign, abs / 100, abs % 100)
    }
}

/// Shortest form without trailing zeros: `40`, `37.5`, `7.25`.
impl fmt::Display for Hours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (sign, whole, frac) = self.parts();
        match frac {
            0 => write!(f, "{sign}{whole}"),
            n if n % 10 == 0 => write!(f, "{sign}{whole}.{}", n / 10),
            n => write!(f, "{sign}{whole}.{n:02}"),
        }
    }
}

impl Add for Hours {
    type Output = Hours;

    fn add(self, rhs: Hours) -> Hours {
        Hours(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Hours {
    fn add_assign(&mut self, rhs: Hours) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for Hours {
    type Output = Hours;

    fn sub(self, rhs: Hours) -> Hours {
        Hours(self.0.saturating_sub(rhs.0))
    }
}

impl Sum for Hours {
    fn sum<I: Iterator<Item = Hours>>(iter: I) -> Hours {
        iter.fold(Hours::ZERO, Add::add)
    }
}

impl Serialize for Hours {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}
