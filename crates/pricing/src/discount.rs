use serde::{Deserialize, Serialize};

use orderflow_core::{DomainError, DomainResult};

/// Discount rule, decided once at promotion creation.
///
/// Human-entered discount text goes through [`Discount::parse`] exactly once;
/// after that the variant is first-class data and is never re-parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Discount {
    /// Percentage off the base price, in whole percent (0..=100).
    Percentage { pct: u8 },
    /// Fixed amount off the base price, in smallest currency unit.
    FixedAmount { amount: u64 },
}

impl Discount {
    pub fn percentage(pct: u8) -> DomainResult<Self> {
        let discount = Self::Percentage { pct };
        discount.validate()?;
        Ok(discount)
    }

    pub fn fixed_amount(amount: u64) -> Self {
        Self::FixedAmount { amount }
    }

    pub fn validate(&self) -> DomainResult<()> {
        match self {
            Self::Percentage { pct } if *pct > 100 => Err(DomainError::validation(format!(
                "percentage discount must be within 0..=100, got {pct}"
            ))),
            _ => Ok(()),
        }
    }

    /// Parse human-entered discount text: `"20%"` or a currency amount with
    /// up to two decimals (`"15"`, `"15.50"`).
    ///
    /// Malformed text is a validation error at creation time, never a silent
    /// no-discount.
    pub fn parse(text: &str) -> DomainResult<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DomainError::validation("discount text cannot be empty"));
        }

        if let Some(pct_text) = text.strip_suffix('%') {
            let pct: u8 = pct_text.trim().parse().map_err(|_| {
                DomainError::validation(format!("unparseable percentage discount: {text:?}"))
            })?;
            return Self::percentage(pct);
        }

        let (whole, fraction) = match text.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (text, ""),
        };

        if fraction.len() > 2 || !fraction.chars().all(|c| c.is_ascii_digit()) {
            return Err(DomainError::validation(format!(
                "unparseable fixed discount: {text:?}"
            )));
        }

        let whole: u64 = whole.parse().map_err(|_| {
            DomainError::validation(format!("unparseable fixed discount: {text:?}"))
        })?;

        // "15.5" means 15.50, not 15.05.
        let cents = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<u64>().unwrap_or(0) * 10,
            _ => fraction.parse::<u64>().unwrap_or(0),
        };

        let amount = whole
            .checked_mul(100)
            .and_then(|minor| minor.checked_add(cents))
            .ok_or_else(|| {
                DomainError::validation(format!("fixed discount out of range: {text:?}"))
            })?;

        Ok(Self::fixed_amount(amount))
    }

    /// Apply the discount to a base price in smallest currency units.
    ///
    /// Percentage math floors to whole cents; a fixed amount larger than the
    /// base price caps the result at zero.
    pub fn apply(&self, base_price: u64) -> u64 {
        match self {
            Self::Percentage { pct } => {
                let pct = u64::from((*pct).min(100));
                base_price * (100 - pct) / 100
            }
            Self::FixedAmount { amount } => base_price.saturating_sub(*amount),
        }
    }
}
