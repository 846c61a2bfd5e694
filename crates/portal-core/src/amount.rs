//! Fixed-point money amounts.
//!
//! Amounts are kept as integer cents and travel as decimal text
//! (`"250.00"`), so sums over the ledger never drift.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

impl Amount {
  pub const ZERO: Self = Self(0);

  pub const fn from_cents(cents: i64) -> Self { Self(cents) }

  pub const fn from_units(units: i64) -> Self { Self(units * 100) }

  pub const fn cents(self) -> i64 { self.0 }

  pub fn is_positive(self) -> bool { self.0 > 0 }

  pub fn checked_add(self, other: Self) -> Option<Self> {
    self.0.checked_add(other.0).map(Self)
  }

  /// `None` if the total leaves the `i64` cent range.
  pub fn checked_sum(amounts: impl IntoIterator<Item = Self>) -> Option<Self> {
    amounts.into_iter().try_fold(Self::ZERO, Self::checked_add)
  }
}

impl FromStr for Amount {
  type Err = Error;

  /// Accepts `"100"`, `"100.5"`, `"100.50"` and a leading `-`. More than two
  /// fractional digits, exponents, and thousands separators are rejected.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let invalid = || Error::validation("amount", format!("{s:?} is not a decimal amount"));

    let s = s.trim();
    let (negative, digits) = match s.strip_prefix('-') {
      Some(rest) => (true, rest),
      None => (false, s),
    };
    let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));

    if whole.is_empty() || frac.len() > 2 {
      return Err(invalid());
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
      return Err(invalid());
    }
    if digits.ends_with('.') {
      return Err(invalid());
    }

    let whole: i64 = whole.parse().map_err(|_| invalid())?;
    let frac: i64 = match frac.len() {
      0 => 0,
      1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
      _ => frac.parse().map_err(|_| invalid())?,
    };
    let cents = whole
      .checked_mul(100)
      .and_then(|c| c.checked_add(frac))
      .ok_or_else(invalid)?;

    Ok(Self(if negative { -cents } else { cents }))
  }
}

impl fmt::Display for Amount {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let sign = if self.0 < 0 { "-" } else { "" };
    let abs = self.0.unsigned_abs();
    write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
  }
}

impl Serialize for Amount {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

impl<'de> Deserialize<'de> for Amount {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    struct AmountVisitor;

    impl de::Visitor<'_> for AmountVisitor {
      type Value = Amount;

      fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal amount as a string or integer")
      }

      fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
        v.parse().map_err(E::custom)
      }

      fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
        i64::try_from(v)
          .ok()
          .and_then(|u| u.checked_mul(100))
          .map(Amount)
          .ok_or_else(|| E::custom("amount out of range"))
      }

      fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
        v.checked_mul(100)
          .map(Amount)
          .ok_or_else(|| E::custom("amount out of range"))
      }
    }

    deserializer.deserialize_any(AmountVisitor)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_decimal_text() {
    assert_eq!("100.00".parse::<Amount>().unwrap(), Amount::from_cents(10_000));
    assert_eq!("100".parse::<Amount>().unwrap(), Amount::from_units(100));
    assert_eq!("0.5".parse::<Amount>().unwrap(), Amount::from_cents(50));
    assert_eq!(" 12.34 ".parse::<Amount>().unwrap(), Amount::from_cents(1234));
    assert_eq!("-3.10".parse::<Amount>().unwrap(), Amount::from_cents(-310));
  }

  #[test]
  fn rejects_malformed_text() {
    for bad in ["", ".", "1.", ".50", "1.234", "1e3", "1,000", "abc", "--1", "1.-2"] {
      assert!(bad.parse::<Amount>().is_err(), "{bad:?} should be rejected");
    }
  }

  #[test]
  fn displays_two_fraction_digits() {
    assert_eq!(Amount::from_cents(25_000).to_string(), "250.00");
    assert_eq!(Amount::from_cents(5).to_string(), "0.05");
    assert_eq!(Amount::from_cents(-150).to_string(), "-1.50");
  }

  #[test]
  fn sums_without_drift() {
    let total = Amount::checked_sum(std::iter::repeat_n(Amount::from_cents(10), 1000));
    assert_eq!(total, Some(Amount::from_units(100)));
  }

  #[test]
  fn sums_refuse_to_overflow() {
    assert_eq!(Amount::checked_sum([Amount::from_cents(i64::MAX), Amount::from_cents(1)]), None);
    assert_eq!(Amount::checked_sum([]), Some(Amount::ZERO));
  }

  #[test]
  fn serde_uses_strings() {
    let json = serde_json::to_string(&Amount::from_cents(1999)).unwrap();
    assert_eq!(json, "\"19.99\"");

    let parsed: Amount = serde_json::from_str("\"250.00\"").unwrap();
    assert_eq!(parsed, Amount::from_units(250));
    let parsed: Amount = serde_json::from_str("40").unwrap();
    assert_eq!(parsed, Amount::from_units(40));
  }
}
