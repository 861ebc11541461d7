//! Structural equality and hash codes for message fields
//!
//! Floating-point values compare and hash by bit pattern, so equality is
//! reflexive for `NaN` and `a == b` always implies equal hash codes.
//! Hash codes follow the `31 * result + h` accumulator seeded with 1,
//! matching the values other ROS1 client libraries compute.

use crate::time::{Duration, Time};

/// Seed of the hash accumulator
pub const HASH_SEED: i32 = 1;

/// Multiplier of the hash accumulator
pub const HASH_PRIME: i32 = 31;

/// Fold one field hash into the accumulator
#[must_use]
#[inline]
pub const fn combine_hash(result: i32, hash: i32) -> i32 {
    HASH_PRIME.wrapping_mul(result).wrapping_add(hash)
}

/// Field-wise structural equality
pub trait MessageEq {
    /// Compare two values structurally
    fn message_eq(&self, other: &Self) -> bool;
}

/// Deterministic 32-bit hash code
pub trait HashCode {
    /// Compute the hash code
    fn hash_code(&self) -> i32;
}

macro_rules! impl_small_int {
    ($($ty:ty),*) => {
        $(
            impl MessageEq for $ty {
                #[inline]
                fn message_eq(&self, other: &Self) -> bool {
                    self == other
                }
            }

            impl HashCode for $ty {
                #[inline]
                fn hash_code(&self) -> i32 {
                    i32::from(*self)
                }
            }
        )*
    };
}

impl_small_int!(i8, u8, i16, u16, i32);

#[allow(clippy::cast_possible_truncation)]
const fn fold_u64(bits: u64) -> i32 {
    (bits ^ (bits >> 32)) as i32
}

impl MessageEq for bool {
    fn message_eq(&self, other: &Self) -> bool {
        self == other
    }
}

impl HashCode for bool {
    fn hash_code(&self) -> i32 {
        if *self { 1231 } else { 1237 }
    }
}

impl MessageEq for u32 {
    fn message_eq(&self, other: &Self) -> bool {
        self == other
    }
}

impl HashCode for u32 {
    #[allow(clippy::cast_possible_wrap)]
    fn hash_code(&self) -> i32 {
        *self as i32
    }
}

impl MessageEq for i64 {
    fn message_eq(&self, other: &Self) -> bool {
        self == other
    }
}

impl HashCode for i64 {
    #[allow(clippy::cast_sign_loss)]
    fn hash_code(&self) -> i32 {
        fold_u64(*self as u64)
    }
}

impl MessageEq for u64 {
    fn message_eq(&self, other: &Self) -> bool {
        self == other
    }
}

impl HashCode for u64 {
    fn hash_code(&self) -> i32 {
        fold_u64(*self)
    }
}

impl MessageEq for f32 {
    fn message_eq(&self, other: &Self) -> bool {
        self.to_bits() == other.to_bits()
    }
}

impl HashCode for f32 {
    #[allow(clippy::cast_possible_wrap)]
    fn hash_code(&self) -> i32 {
        self.to_bits() as i32
    }
}

impl MessageEq for f64 {
    fn message_eq(&self, other: &Self) -> bool {
        self.to_bits() == other.to_bits()
    }
}

impl HashCode for f64 {
    fn hash_code(&self) -> i32 {
        fold_u64(self.to_bits())
    }
}

impl MessageEq for String {
    fn message_eq(&self, other: &Self) -> bool {
        self == other
    }
}

impl HashCode for String {
    fn hash_code(&self) -> i32 {
        self.encode_utf16().fold(0i32, |acc, unit| {
            HASH_PRIME.wrapping_mul(acc).wrapping_add(i32::from(unit))
        })
    }
}

impl MessageEq for Time {
    fn message_eq(&self, other: &Self) -> bool {
        self == other
    }
}

impl HashCode for Time {
    fn hash_code(&self) -> i32 {
        let result = combine_hash(HASH_SEED, self.nsecs.hash_code());
        combine_hash(result, self.secs.hash_code())
    }
}

impl MessageEq for Duration {
    fn message_eq(&self, other: &Self) -> bool {
        self == other
    }
}

impl HashCode for Duration {
    fn hash_code(&self) -> i32 {
        let result = combine_hash(HASH_SEED, self.nsecs);
        combine_hash(result, self.secs)
    }
}

fn slice_eq<T: MessageEq>(a: &[T], b: &[T]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.message_eq(y))
}

fn slice_hash<T: HashCode>(items: &[T]) -> i32 {
    items
        .iter()
        .fold(HASH_SEED, |acc, item| combine_hash(acc, item.hash_code()))
}

impl<T: MessageEq> MessageEq for Vec<T> {
    fn message_eq(&self, other: &Self) -> bool {
        slice_eq(self, other)
    }
}

impl<T: HashCode> HashCode for Vec<T> {
    fn hash_code(&self) -> i32 {
        slice_hash(self)
    }
}

impl<T: MessageEq, const N: usize> MessageEq for [T; N] {
    fn message_eq(&self, other: &Self) -> bool {
        slice_eq(self, other)
    }
}

impl<T: HashCode, const N: usize> HashCode for [T; N] {
    fn hash_code(&self) -> i32 {
        slice_hash(self)
    }
}
