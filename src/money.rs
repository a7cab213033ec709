use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

/// Largest gap between an expense total and the sum of its splits that still
/// counts as balanced.
pub const SPLIT_TOLERANCE: Money = Money(Decimal::from_parts(1, 0, 0, false, 2));

/// Largest magnitude accepted from user input (10^15). Anything beyond it is
/// treated as invalid input.
pub const MAX_AMOUNT: Money = Money(Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0));

/// A currency amount. Arithmetic is exact decimal arithmetic that saturates
/// at the limits of [`Decimal`]; rounding only happens when the amount is
/// displayed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    pub fn value(self) -> Decimal {
        self.0
    }

    /// Parses free-text numeric input. Anything that is not a number, or is
    /// larger than [`MAX_AMOUNT`], becomes zero.
    pub fn parse_or_zero(input: &str) -> Self {
        Self::parse(input).unwrap_or(Self::ZERO)
    }

    /// Parses an expense total, which must be strictly positive and no
    /// larger than [`MAX_AMOUNT`].
    pub fn parse_positive(input: &str) -> Option<Self> {
        Self::parse(input).filter(|amount| amount.is_positive())
    }

    fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }
        Decimal::from_str(input)
            .or_else(|_| Decimal::from_scientific(input))
            .ok()
            .map(Self)
            .filter(|amount| amount.abs() <= MAX_AMOUNT)
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Divides evenly into `count` shares. `count` must be non-zero.
    pub fn div_by(self, count: usize) -> Self {
        Self(self.0 / Decimal::from(count))
    }

    pub fn round_to_cents(self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// True when `self` and `other` differ by no more than [`SPLIT_TOLERANCE`].
    pub fn within_tolerance(self, other: Money) -> bool {
        (self - other).abs() <= SPLIT_TOLERANCE
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.round_to_cents().0)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_sub(rhs.0);
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, value| acc + value)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}
