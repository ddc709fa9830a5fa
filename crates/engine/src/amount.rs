use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};

use crate::{EngineError, ResultEngine};

/// Signed decimal money amount, `coefficient * 10^exponent`.
///
/// Storage uses integer cents ([`Amount::to_minor`]), but the type itself keeps
/// whatever precision it was built with so validation can reject values with
/// more than two decimals instead of silently rounding them.
///
/// # Examples
///
/// ```rust
/// use engine::Amount;
///
/// let amount = Amount::from_parts(-1061, -2).unwrap();
/// assert_eq!(amount.display(), "-$10.61");
/// assert_eq!(amount.raw_display(), "-10.61");
///
/// let parsed: Amount = "1500.581".parse().unwrap();
/// assert_eq!(parsed.to_string(), "$1,500.58");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Builds `coefficient * 10^exponent`.
    pub fn from_parts(coefficient: i64, exponent: i32) -> ResultEngine<Self> {
        let overflow = || {
            EngineError::InvalidAmount(format!(
                "amount {coefficient}e{exponent} can not be represented"
            ))
        };

        let value = if exponent <= 0 {
            Decimal::try_from_i128_with_scale(i128::from(coefficient), exponent.unsigned_abs())
                .map_err(|_| overflow())?
        } else {
            let factor = 10i128
                .checked_pow(exponent.unsigned_abs())
                .ok_or_else(overflow)?;
            let scaled = i128::from(coefficient)
                .checked_mul(factor)
                .ok_or_else(overflow)?;
            Decimal::try_from_i128_with_scale(scaled, 0).map_err(|_| overflow())?
        };

        Ok(Self(value))
    }

    /// Creates an amount from integer cents.
    #[must_use]
    pub fn from_minor(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Returns the amount in integer cents.
    ///
    /// Fails when the amount has more than two decimals or does not fit.
    pub fn to_minor(self) -> ResultEngine<i64> {
        if !self.has_max_precision(2) {
            return Err(EngineError::InvalidAmount(
                "Amount must have at most 2 decimal points".to_string(),
            ));
        }
        self.0
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|cents| cents.to_i64())
            .ok_or_else(|| EngineError::InvalidAmount("amount too large".to_string()))
    }

    #[must_use]
    pub fn value(self) -> Decimal {
        self.0
    }

    #[must_use]
    pub fn coefficient(self) -> i128 {
        self.0.mantissa()
    }

    #[must_use]
    pub fn exponent(self) -> i32 {
        -(self.0.scale() as i32)
    }

    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    #[must_use]
    pub fn is_positive(self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    #[must_use]
    pub fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    #[must_use]
    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// `true` when the value needs at most `places` fractional digits.
    #[must_use]
    pub fn has_max_precision(self, places: u32) -> bool {
        self.0.normalize().scale() <= places
    }

    /// Currency string: `$` symbol, thousands separators, exactly two decimals.
    ///
    /// Rounds half away from zero; the sign goes before the symbol.
    #[must_use]
    pub fn display(self) -> String {
        let mut rounded = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let negative = rounded.is_sign_negative() && !rounded.is_zero();
        rounded.set_sign_positive(true);
        rounded.rescale(2);

        let text = rounded.to_string();
        let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));
        let sign = if negative { "-" } else { "" };
        format!("{sign}${}.{fraction}", group_thousands(whole))
    }

    /// Plain decimal string without trailing zeros, e.g. `10.5` or `-0.01`.
    #[must_use]
    pub fn raw_display(self) -> String {
        self.0.normalize().to_string()
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl From<Amount> for Decimal {
    fn from(value: Amount) -> Self {
        value.0
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Self::Output {
        Amount(self.0 + rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        self.0 += rhs.0;
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Amount) -> Self::Output {
        Amount(self.0 - rhs.0)
    }
}

impl SubAssign for Amount {
    fn sub_assign(&mut self, rhs: Amount) {
        self.0 -= rhs.0;
    }
}

impl Neg for Amount {
    type Output = Amount;

    fn neg(self) -> Self::Output {
        Amount(-self.0)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl FromStr for Amount {
    type Err = EngineError;

    /// Parses a plain decimal string: optional sign, digits, optional `.` fraction.
    ///
    /// Surrounding whitespace is ignored. Thousands separators, exponents and
    /// empty input are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || EngineError::InvalidAmount(format!("invalid amount \"{trimmed}\""));

        if trimmed.is_empty() {
            return Err(EngineError::InvalidAmount("empty amount".to_string()));
        }

        let (negative, unsigned) = if let Some(rest) = trimmed.strip_prefix('-') {
            (true, rest)
        } else if let Some(rest) = trimmed.strip_prefix('+') {
            (false, rest)
        } else {
            (false, trimmed)
        };

        let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction)
        {
            return Err(invalid());
        }

        let whole = if whole.is_empty() { "0" } else { whole };
        let canonical = if fraction.is_empty() {
            whole.to_string()
        } else {
            format!("{whole}.{fraction}")
        };

        let value = Decimal::from_str_exact(&canonical)
            .map_err(|_| EngineError::InvalidAmount("amount too large".to_string()))?;

        Ok(Self(if negative { -value } else { value }))
    }
}
