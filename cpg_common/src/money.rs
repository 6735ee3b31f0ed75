use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Mul},
    str::FromStr,
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::Type;
use thiserror::Error;

use crate::op;

pub const CURRENCY_CODE: &str = "INR";
pub const CURRENCY_CODE_LOWER: &str = "inr";

/// A monetary amount, stored as an integer number of paise (hundredths of a rupee).
///
/// Order totals are computed once, in paise, so the usual floating-point rounding
/// problems cannot creep into stored amounts. Over the wire, `Money` is represented
/// as a decimal number of rupees with two decimal places, which is what clients and
/// the payment gateway exchange.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, PartialEq, Eq, Hash)]
#[sqlx(transparent)]
pub struct Money(i64);

op!(binary Money, Add, add);
op!(binary Money, Sub, sub);
op!(inplace Money, SubAssign, sub_assign);
op!(unary Money, Neg, neg);

impl Mul<i64> for Money {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented as a monetary amount: {0}")]
pub struct MoneyConversionError(String);

impl Money {
    pub fn from_paise(value: i64) -> Self {
        Self(value)
    }

    /// Converts a decimal rupee amount (as supplied in JSON payloads) into paise,
    /// rounding to the nearest paisa. Non-finite values are rejected.
    pub fn from_rupees(rupees: f64) -> Result<Self, MoneyConversionError> {
        if !rupees.is_finite() {
            return Err(MoneyConversionError(format!("{rupees} is not a finite number")));
        }
        let paise = (rupees * 100.0).round();
        if paise.abs() >= i64::MAX as f64 {
            return Err(MoneyConversionError(format!("{rupees} is out of range")));
        }
        Ok(Self(paise as i64))
    }

    /// The amount in paise.
    pub fn value(&self) -> i64 {
        self.0
    }

    /// The amount as a decimal number of rupees.
    pub fn to_rupees(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Overflow-safe multiplication for amounts derived from untrusted input.
    pub fn checked_mul(self, rhs: i64) -> Option<Self> {
        self.0.checked_mul(rhs).map(Self)
    }

    /// Overflow-safe addition for amounts derived from untrusted input.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "₹{:.2}", self.to_rupees())
    }
}

impl FromStr for Money {
    type Err = MoneyConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rupees = s.trim().trim_start_matches('₹').parse::<f64>().map_err(|e| MoneyConversionError(e.to_string()))?;
        Self::from_rupees(rupees)
    }
}

// Over the wire, amounts are decimal rupees, not paise.
impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_rupees())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let rupees = f64::deserialize(deserializer)?;
        Money::from_rupees(rupees).map_err(serde::de::Error::custom)
    }
}
