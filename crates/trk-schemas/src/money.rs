//! Fixed-point naira amounts.
//!
//! The backend sends prices and totals as JSON numbers in naira. They are
//! converted to integer kobo (1/100 naira) at the decode boundary so no
//! float survives past deserialization.
//!
//! `Money` deliberately has no `From<i64>`; use [`Money::from_kobo`] or
//! [`Money::from_naira`] so the scale is always explicit at the call site.

use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Kobo per naira.
const SCALE: i64 = 100;

/// Currency symbol used by [`Money`]'s `Display` impl.
pub const NAIRA_SIGN: &str = "₦";

/// A monetary amount in kobo.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    #[inline]
    pub const fn from_kobo(kobo: i64) -> Self {
        Money(kobo)
    }

    /// Whole naira, no fractional part.
    #[inline]
    pub const fn from_whole_naira(naira: i64) -> Self {
        Money(naira * SCALE)
    }

    /// Convert a decimal naira amount, rounding to the nearest kobo.
    ///
    /// Returns `None` for NaN, infinities and values outside the `i64` kobo
    /// range.
    pub fn from_naira(naira: f64) -> Option<Self> {
        if !naira.is_finite() {
            return None;
        }
        let kobo = (naira * SCALE as f64).round();
        if kobo >= i64::MAX as f64 || kobo <= i64::MIN as f64 {
            return None;
        }
        Some(Money(kobo as i64))
    }

    #[inline]
    pub const fn kobo(self) -> i64 {
        self.0
    }

    #[inline]
    pub fn is_non_negative(self) -> bool {
        self.0 >= 0
    }

    /// Unit price times quantity. `None` on overflow.
    #[inline]
    pub fn checked_mul_qty(self, qty: u32) -> Option<Money> {
        self.0.checked_mul(i64::from(qty)).map(Money)
    }

    /// `None` on overflow.
    #[inline]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }
}

/// `₦1,000` for whole amounts, `₦1,000.50` otherwise.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let abs = self.0.unsigned_abs();
        let whole = abs / SCALE as u64;
        let frac = abs % SCALE as u64;
        let sign = if self.0 < 0 { "-" } else { "" };
        if frac == 0 {
            write!(f, "{sign}{NAIRA_SIGN}{}", group_thousands(whole))
        } else {
            write!(f, "{sign}{NAIRA_SIGN}{}.{frac:02}", group_thousands(whole))
        }
    }
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let naira = f64::deserialize(deserializer)?;
        Money::from_naira(naira)
            .ok_or_else(|| de::Error::custom(format!("amount out of range: {naira}")))
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0 % SCALE == 0 {
            serializer.serialize_i64(self.0 / SCALE)
        } else {
            serializer.serialize_f64(self.0 as f64 / SCALE as f64)
        }
    }
}
