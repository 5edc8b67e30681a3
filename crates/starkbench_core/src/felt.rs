//! The STARK field element.
//!
//! Every value a contract manipulates is a [`Felt`]: an integer modulo the STARK prime
//! `P = 2^251 + 17·2^192 + 1`. The representative is always canonical (`0 <= v < P`).
//!
//! ## Notes
//! - Parsing is strict: literals `>= P` are rejected rather than silently reduced, matching how the compiler treats
//!   integer literals.
//! - `-x` is `P - x`; use [`Felt::from`] with an `i64` to build negative constants.
//! - Serialized form (serde) is a `0x`-prefixed lowercase hex string.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;
use std::sync::LazyLock;

use num_bigint::BigUint;
use num_traits::{Num, One, ToPrimitive, Zero};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

static PRIME: LazyLock<BigUint> =
    LazyLock::new(|| (BigUint::one() << 251u32) + (BigUint::from(17u32) << 192u32) + BigUint::one());

/// Maximum number of bytes a short string literal can pack into one field element.
pub const MAX_SHORT_STRING_LEN: usize = 31;

/// The field modulus.
pub fn prime() -> &'static BigUint {
    &PRIME
}

/// Errors produced when parsing text into a [`Felt`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeltParseError {
    #[error("empty field element literal")]
    Empty,

    #[error("invalid field element literal '{0}'")]
    Invalid(String),

    #[error("value {0} is out of range for a field element (must be below the STARK prime)")]
    OutOfRange(String),

    #[error("short string is {0} characters long; at most 31 fit in a field element")]
    ShortStringTooLong(usize),

    #[error("short strings must be ASCII")]
    NonAsciiShortString,
}

/// An element of the STARK prime field.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Felt(BigUint);

impl Felt {
    /// The additive identity.
    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    /// The multiplicative identity.
    pub fn one() -> Self {
        Self(BigUint::one())
    }

    /// Build a felt from any integer, reducing it modulo `P`.
    pub fn from_biguint_reduced(value: BigUint) -> Self {
        if value < *PRIME { Self(value) } else { Self(value % &*PRIME) }
    }

    /// Build a felt from an integer that must already be below `P`.
    pub fn try_from_biguint(value: BigUint) -> Result<Self, FeltParseError> {
        if value < *PRIME {
            Ok(Self(value))
        } else {
            Err(FeltParseError::OutOfRange(value.to_string()))
        }
    }

    /// Parse a decimal literal.
    pub fn from_dec_str(text: &str) -> Result<Self, FeltParseError> {
        Self::parse_radix(text, 10)
    }

    /// Parse a hex literal, with or without a `0x` prefix.
    pub fn from_hex_str(text: &str) -> Result<Self, FeltParseError> {
        let digits = text
            .strip_prefix("0x")
            .or_else(|| text.strip_prefix("0X"))
            .unwrap_or(text);
        Self::parse_radix(digits, 16)
    }

    fn parse_radix(digits: &str, radix: u32) -> Result<Self, FeltParseError> {
        if digits.is_empty() {
            return Err(FeltParseError::Empty);
        }
        let cleaned: String = digits.chars().filter(|c| *c != '_').collect();
        let value =
            BigUint::from_str_radix(&cleaned, radix).map_err(|_| FeltParseError::Invalid(digits.to_string()))?;
        Self::try_from_biguint(value)
    }

    /// Encode up to 31 ASCII characters big-endian, as Cairo short strings do (`'abc'`).
    pub fn from_short_string(text: &str) -> Result<Self, FeltParseError> {
        if !text.is_ascii() {
            return Err(FeltParseError::NonAsciiShortString);
        }
        if text.len() > MAX_SHORT_STRING_LEN {
            return Err(FeltParseError::ShortStringTooLong(text.len()));
        }
        Ok(Self(BigUint::from_bytes_be(text.as_bytes())))
    }

    /// Interpret 32 (or fewer) big-endian bytes as an integer and reduce it into the field.
    pub fn from_bytes_be(bytes: &[u8]) -> Self {
        Self::from_biguint_reduced(BigUint::from_bytes_be(bytes))
    }

    /// Canonical 32-byte big-endian encoding.
    pub fn to_bytes_be(&self) -> [u8; 32] {
        let raw = self.0.to_bytes_be();
        let mut out = [0u8; 32];
        out[32 - raw.len()..].copy_from_slice(&raw);
        out
    }

    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    pub fn into_biguint(self) -> BigUint {
        self.0
    }

    pub fn to_u64(&self) -> Option<u64> {
        self.0.to_u64()
    }

    pub fn to_usize(&self) -> Option<usize> {
        self.0.to_usize()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Number of significant bits of the canonical representative.
    pub fn bits(&self) -> u64 {
        self.0.bits()
    }

    /// Multiplicative inverse, `None` for zero.
    pub fn inverse(&self) -> Option<Self> {
        if self.is_zero() {
            return None;
        }
        let exponent = &*PRIME - BigUint::from(2u32);
        Some(Self(self.0.modpow(&exponent, &PRIME)))
    }

    /// Field division `self * rhs^-1`, `None` when `rhs` is zero.
    pub fn checked_div(&self, rhs: &Self) -> Option<Self> {
        rhs.inverse().map(|inv| self * &inv)
    }

    /// Integer quotient and remainder of the canonical representatives, `None` when `rhs` is zero.
    pub fn div_rem(&self, rhs: &Self) -> Option<(Self, Self)> {
        if rhs.is_zero() {
            return None;
        }
        Some((Self(&self.0 / &rhs.0), Self(&self.0 % &rhs.0)))
    }
}

// ============================================================================
// Arithmetic
// ============================================================================

impl Add<&Felt> for &Felt {
    type Output = Felt;

    fn add(self, rhs: &Felt) -> Felt {
        Felt::from_biguint_reduced(&self.0 + &rhs.0)
    }
}

impl Sub<&Felt> for &Felt {
    type Output = Felt;

    fn sub(self, rhs: &Felt) -> Felt {
        if self.0 >= rhs.0 {
            Felt(&self.0 - &rhs.0)
        } else {
            Felt(&*PRIME - (&rhs.0 - &self.0))
        }
    }
}

impl Mul<&Felt> for &Felt {
    type Output = Felt;

    fn mul(self, rhs: &Felt) -> Felt {
        Felt::from_biguint_reduced(&self.0 * &rhs.0)
    }
}

impl Neg for &Felt {
    type Output = Felt;

    fn neg(self) -> Felt {
        if self.is_zero() { Felt::zero() } else { Felt(&*PRIME - &self.0) }
    }
}

impl Neg for Felt {
    type Output = Felt;

    fn neg(self) -> Felt {
        -&self
    }
}

macro_rules! forward_owned_binop {
    ($($trait:ident :: $method:ident),* $(,)?) => {
        $(
            impl $trait<Felt> for Felt {
                type Output = Felt;

                fn $method(self, rhs: Felt) -> Felt {
                    (&self).$method(&rhs)
                }
            }

            impl $trait<&Felt> for Felt {
                type Output = Felt;

                fn $method(self, rhs: &Felt) -> Felt {
                    (&self).$method(rhs)
                }
            }

            impl $trait<Felt> for &Felt {
                type Output = Felt;

                fn $method(self, rhs: Felt) -> Felt {
                    self.$method(&rhs)
                }
            }
        )*
    };
}

forward_owned_binop!(Add::add, Sub::sub, Mul::mul);

// ============================================================================
// Conversions
// ============================================================================

macro_rules! from_unsigned {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Felt {
                fn from(value: $ty) -> Self {
                    Felt(BigUint::from(value))
                }
            }
        )*
    };
}

from_unsigned!(u8, u16, u32, u64, u128, usize);

impl From<i64> for Felt {
    fn from(value: i64) -> Self {
        let magnitude = Felt(BigUint::from(value.unsigned_abs()));
        if value < 0 { -magnitude } else { magnitude }
    }
}

impl From<bool> for Felt {
    fn from(value: bool) -> Self {
        if value { Felt::one() } else { Felt::zero() }
    }
}

impl FromStr for Felt {
    type Err = FeltParseError;

    /// Accepts `123`, `0x7b` and a leading `-` (field negation).
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.trim();
        if let Some(rest) = text.strip_prefix('-') {
            return rest.parse::<Felt>().map(|v| -v);
        }
        if text.starts_with("0x") || text.starts_with("0X") {
            Self::from_hex_str(text)
        } else {
            Self::from_dec_str(text)
        }
    }
}

impl fmt::Display for Felt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::LowerHex for Felt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl fmt::Debug for Felt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Felt({:#x})", self.0)
    }
}

impl Serialize for Felt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{:#x}", self.0))
    }
}

impl<'de> Deserialize<'de> for Felt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FeltVisitor;

        impl Visitor<'_> for FeltVisitor {
            type Value = Felt;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a field element as a hex or decimal string")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Felt, E> {
                value.parse().map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Felt, E> {
                Ok(Felt::from(value))
            }
        }

        deserializer.deserialize_any(FeltVisitor)
    }
}

// ============================================================================
// TESTS
// ============================================================================
