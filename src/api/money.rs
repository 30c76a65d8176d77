//! Rupiah amounts as whole integers with storefront display formatting.

// crates.io
use serde::de::{self, Deserializer, Visitor};
// self
use crate::_prelude::*;

/// Whole-rupiah amount.
///
/// Deserialization accepts integers, floats (rounded), and numeric strings such as the
/// `"150000.00"` gross amounts payment gateways report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Money(pub i64);
impl Money {
	/// Zero rupiah.
	pub const ZERO: Self = Self(0);

	/// Returns the amount multiplied by `quantity`, saturating on overflow.
	pub fn times(self, quantity: u32) -> Self {
		Self(self.0.saturating_mul(i64::from(quantity)))
	}

	/// Returns the sum of both amounts, saturating on overflow.
	pub fn saturating_add(self, other: Self) -> Self {
		Self(self.0.saturating_add(other.0))
	}
}
impl Display for Money {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let digits = self.0.unsigned_abs().to_string();
		let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

		for (idx, ch) in digits.chars().enumerate() {
			if idx > 0 && (digits.len() - idx) % 3 == 0 {
				grouped.push('.');
			}

			grouped.push(ch);
		}

		if self.0 < 0 { write!(f, "-Rp {grouped}") } else { write!(f, "Rp {grouped}") }
	}
}
impl<'de> Deserialize<'de> for Money {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		deserializer.deserialize_any(MoneyVisitor)
	}
}

struct MoneyVisitor;
impl Visitor<'_> for MoneyVisitor {
	type Value = Money;

	fn expecting(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("a rupiah amount as a number or numeric string")
	}

	fn visit_i64<E>(self, value: i64) -> Result<Money, E>
	where
		E: de::Error,
	{
		Ok(Money(value))
	}

	fn visit_u64<E>(self, value: u64) -> Result<Money, E>
	where
		E: de::Error,
	{
		i64::try_from(value).map(Money).map_err(|_| E::custom("rupiah amount is out of range"))
	}

	fn visit_f64<E>(self, value: f64) -> Result<Money, E>
	where
		E: de::Error,
	{
		if !value.is_finite() || value.abs() >= i64::MAX as f64 {
			return Err(E::custom("rupiah amount is out of range"));
		}

		Ok(Money(value.round() as i64))
	}

	fn visit_str<E>(self, value: &str) -> Result<Money, E>
	where
		E: de::Error,
	{
		let trimmed = value.trim();

		if let Ok(whole) = trimmed.parse::<i64>() {
			return Ok(Money(whole));
		}

		trimmed
			.parse::<f64>()
			.map_err(|_| E::invalid_value(de::Unexpected::Str(value), &self))
			.and_then(|parsed| self.visit_f64(parsed))
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn display_groups_thousands() {
		assert_eq!(Money(0).to_string(), "Rp 0");
		assert_eq!(Money(999).to_string(), "Rp 999");
		assert_eq!(Money(150_000).to_string(), "Rp 150.000");
		assert_eq!(Money(12_345_678).to_string(), "Rp 12.345.678");
		assert_eq!(Money(-1_500).to_string(), "-Rp 1.500");
	}

	#[test]
	fn deserializes_numbers_and_numeric_strings() {
		let amounts: Vec<Money> = serde_json::from_str(r#"[150000, 150000.4, "150000.00", " 25000 "]"#)
			.expect("Amounts should deserialize.");

		assert_eq!(amounts, vec![Money(150_000), Money(150_000), Money(150_000), Money(25_000)]);
		assert!(serde_json::from_str::<Money>("\"gratis\"").is_err());
		assert!(serde_json::from_str::<Money>("true").is_err());
	}

	#[test]
	fn arithmetic_saturates() {
		assert_eq!(Money(25_000).times(3), Money(75_000));
		assert_eq!(Money(i64::MAX).saturating_add(Money(1)), Money(i64::MAX));
	}
}
