//! Fixed-point token amounts with 18 decimals. No floating point on the
//! value path.
//!
//! 1 token = 10^18 base units (wei). Stored as `U256` so approvals of
//! `U256::MAX` and on-chain balances are representable as-is.

use std::fmt;

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::error::AmountError;

/// Token amount in base units, assuming 18 decimals.
///
/// # Examples
///
/// ```
/// use blockflow_types::TokenAmount;
///
/// let amount = TokenAmount::from_decimal_str("1.5").unwrap();
/// assert_eq!(amount.to_plain_string(), "1.5");
/// assert_eq!(amount.to_fixed(4), "1.5000");
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenAmount(U256);

impl TokenAmount {
    /// Zero.
    pub const ZERO: Self = TokenAmount(U256::ZERO);
    /// Largest representable amount (an "infinite" approval).
    pub const MAX: Self = TokenAmount(U256::MAX);

    /// Number of decimal places (18).
    pub const DECIMALS: usize = 18;
    /// Base units per whole token.
    const SCALE: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

    /// Create from raw base units.
    #[inline]
    pub fn from_wei(wei: U256) -> Self {
        TokenAmount(wei)
    }

    /// Create from whole tokens.
    pub fn from_tokens(tokens: u64) -> Self {
        TokenAmount(U256::from(tokens).saturating_mul(Self::SCALE))
    }

    /// Raw base units.
    #[inline]
    pub fn wei(&self) -> U256 {
        self.0
    }

    /// Parse a user-entered decimal string like `"1.5"`, `".25"` or `"3"`.
    ///
    /// Up to 18 decimal places accepted. Empty input, signs, exponents and
    /// any other non-digit characters are rejected.
    pub fn from_decimal_str(s: &str) -> Result<Self, AmountError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AmountError::Empty);
        }
        if s.starts_with('-') {
            return Err(AmountError::Negative(s.to_string()));
        }

        let (whole, frac) = s.split_once('.').unwrap_or((s, ""));
        if whole.is_empty() && frac.is_empty() {
            return Err(AmountError::InvalidDigits(s.to_string()));
        }
        if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
            return Err(AmountError::InvalidDigits(s.to_string()));
        }
        if frac.len() > Self::DECIMALS {
            return Err(AmountError::TooManyDecimals(s.to_string()));
        }

        let whole_val = if whole.is_empty() {
            U256::ZERO
        } else {
            U256::from_str_radix(whole, 10).map_err(|_| AmountError::Overflow)?
        };
        let frac_val = if frac.is_empty() {
            U256::ZERO
        } else {
            let padded = format!("{:0<18}", frac); // right-pad to 18 digits
            U256::from_str_radix(&padded, 10).map_err(|_| AmountError::InvalidDigits(s.to_string()))?
        };

        let value = whole_val
            .checked_mul(Self::SCALE)
            .and_then(|w| w.checked_add(frac_val))
            .ok_or(AmountError::Overflow)?;
        Ok(TokenAmount(value))
    }

    /// Format with all 18 decimals, e.g. `"1.500000000000000000"`.
    pub fn to_decimal_string(&self) -> String {
        let whole = self.0 / Self::SCALE;
        let frac = (self.0 % Self::SCALE).to_string();
        format!("{}.{:0>18}", whole, frac)
    }

    /// Full precision with trailing zeros stripped, e.g. `"1.5"` or `"3"`.
    ///
    /// This is what the MAX shortcut writes into the amount field.
    pub fn to_plain_string(&self) -> String {
        let s = self.to_decimal_string();
        let s = s.trim_end_matches('0');
        s.trim_end_matches('.').to_string()
    }

    /// Truncate to `places` decimals for display, e.g. `to_fixed(4)` →
    /// `"1.5000"`.
    pub fn to_fixed(&self, places: usize) -> String {
        let full = self.to_decimal_string();
        let (whole, frac) = full.split_once('.').unwrap_or((full.as_str(), ""));
        let places = places.min(Self::DECIMALS);
        if places == 0 {
            return whole.to_string();
        }
        format!("{}.{}", whole, &frac[..places])
    }

    /// Checked addition, returns `None` on overflow.
    #[inline]
    pub fn checked_add(&self, rhs: &Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(TokenAmount)
    }

    /// Checked subtraction, returns `None` if the result would be negative.
    #[inline]
    pub fn checked_sub(&self, rhs: &Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(TokenAmount)
    }

    /// Convert through an 18-decimal exchange rate quoted as "base per
    /// wrapped token": `self * 10^18 / rate`. `None` for a zero rate.
    pub fn div_by_rate(&self, rate: &Self) -> Option<Self> {
        if rate.is_zero() {
            return None;
        }
        self.0
            .checked_mul(Self::SCALE)
            .and_then(|v| v.checked_div(rate.0))
            .map(TokenAmount)
    }

    /// Returns `true` if the amount is exactly zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_plain_string())
    }
}

impl From<U256> for TokenAmount {
    fn from(value: U256) -> Self {
        TokenAmount(value)
    }
}

/// Convert a ray-scaled (10^27) annual rate into a percentage, e.g. a
/// liquidity rate of `0.0312 * 10^27` → `3.12`.
pub fn ray_to_percent(rate: U256) -> f64 {
    // 10^27 ray == 100 %, keep four decimals of the percentage
    let basis = U256::from(10u64).pow(U256::from(21u64));
    let scaled = u128::try_from(rate / basis).unwrap_or(u128::MAX);
    scaled as f64 / 10_000.0
}
