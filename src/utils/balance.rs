//! SUI/MIST value handling.
//!
//! Amounts travel through the SDK as MIST (1 SUI = 1e9 MIST), either as the
//! `Mist` newtype or as the decimal strings stored on proposals, wallets and
//! DAOs. Conversion to SUI happens only for display, using exact integer
//! arithmetic so treasury-sized values never go through `f64`.

use crate::core::constants::{DISPLAY_FRACTION_DIGITS, MIST_PER_SUI, SUI_DECIMALS, SUI_SYMBOL};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// MIST value, the smallest unit of SUI.
///
/// # Examples
/// ```
/// use sui_dao_rs::utils::balance::Mist;
/// let one_sui = Mist::PER_SUI;
/// assert_eq!(one_sui.as_u128(), 1_000_000_000);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Mist(pub u128);

impl Mist {
    pub const ZERO: Self = Self(0);

    /// MIST_PER_SUI MIST = 1 SUI
    pub const PER_SUI: Self = Self(MIST_PER_SUI);

    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    pub const fn as_u128(self) -> u128 {
        self.0
    }

    /// Create from a whole number of SUI, saturating on overflow
    pub fn from_sui(sui: u128) -> Self {
        Self(sui.saturating_mul(MIST_PER_SUI))
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Decimal string as stored on the wire
    pub fn to_base_units(self) -> String {
        self.0.to_string()
    }

    /// Display form: thousands separators, at most two fraction digits
    pub fn format_sui(self) -> String {
        format_mist_as_sui(self.0)
    }
}

impl fmt::Display for Mist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.format_sui(), SUI_SYMBOL)
    }
}

impl Add for Mist {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        self.saturating_add(other)
    }
}

impl Sub for Mist {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        self.saturating_sub(other)
    }
}

impl From<u128> for Mist {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

impl From<Mist> for u128 {
    fn from(mist: Mist) -> Self {
        mist.0
    }
}

/// Format a MIST base-unit string as SUI for display.
///
/// `"125000000000000"` becomes `"125,000"`; `"1500000000"` becomes `"1.5"`.
/// Strings that are not a non-negative integer render as `"0"`.
pub fn format_sui(amount: &str) -> String {
    match amount.trim().parse::<u128>() {
        Ok(mist) => format_mist_as_sui(mist),
        Err(_) => {
            tracing::warn!(amount, "Cannot format non-integer MIST amount");
            "0".to_string()
        }
    }
}

/// Format an integer voting weight or count with thousands separators
pub fn format_count(value: u64) -> String {
    group_thousands(value as u128)
}

/// Round to `DISPLAY_FRACTION_DIGITS` (half up), group the integer part
/// with commas and drop trailing zeros from the fraction.
pub fn format_mist_as_sui(mist: u128) -> String {
    let scale = 10u128.pow(DISPLAY_FRACTION_DIGITS);
    let step = MIST_PER_SUI / scale;
    let rounded = mist / step + u128::from(mist % step >= step / 2);

    let whole = rounded / scale;
    let fraction = rounded % scale;

    let mut out = group_thousands(whole);
    if fraction > 0 {
        let digits = format!("{:0width$}", fraction, width = DISPLAY_FRACTION_DIGITS as usize);
        out.push('.');
        out.push_str(digits.trim_end_matches('0'));
    }
    out
}

fn group_thousands(value: u128) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Parse a user-entered SUI amount into MIST.
///
/// Supports formats:
/// - "50000" → 50_000_000_000_000 MIST
/// - "0.5" → 500_000_000 MIST
/// - "1,250.75 SUI" → 1_250_750_000_000 MIST
///
/// Returns `None` for negative, malformed, or over-precise (more than nine
/// fraction digits) input.
pub fn parse_sui_amount(s: &str) -> Option<Mist> {
    let cleaned: String = s
        .trim()
        .trim_end_matches(SUI_SYMBOL)
        .trim_end_matches("sui")
        .chars()
        .filter(|c| !matches!(c, ',' | '_' | ' '))
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    let (whole_str, frac_str) = match cleaned.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (cleaned.as_str(), ""),
    };

    if whole_str.is_empty() && frac_str.is_empty() {
        return None;
    }
    if !whole_str.chars().all(|c| c.is_ascii_digit())
        || !frac_str.chars().all(|c| c.is_ascii_digit())
        || frac_str.len() > SUI_DECIMALS
    {
        return None;
    }

    let whole: u128 = if whole_str.is_empty() {
        0
    } else {
        whole_str.parse().ok()?
    };
    let fraction: u128 = if frac_str.is_empty() {
        0
    } else {
        format!("{:0<width$}", frac_str, width = SUI_DECIMALS).parse().ok()?
    };

    whole
        .checked_mul(MIST_PER_SUI)?
        .checked_add(fraction)
        .map(Mist)
}
