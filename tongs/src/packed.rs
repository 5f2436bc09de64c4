/*
 *  Tongs, a tuner for hand-crafted evaluation weights.
 *  Copyright (C) 2024 ToTheAnd
 *
 *  Tongs is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  Tongs is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with Tongs. If not, see <https://www.gnu.org/licenses/>.
 */

//! Two 16 bit scores in one `i32`, so that a single integer addition updates the midgame and the endgame value.

use std::fmt::{Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// A tapered score. The midgame value lives in the lower 16 bits, the endgame value in the upper 16 bits.
///
/// Each half must stay within the `i16` range. This is not checked in release builds: an evaluation function
/// whose individual terms can leave that range is buggy.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
#[must_use]
pub struct PackedScore(pub i32);

/// Shorthand for [`PackedScore::new`], named after the usual `S(mg, eg)` macro of C++ engines.
pub const fn s(mg: i16, eg: i16) -> PackedScore {
    PackedScore::new(mg, eg)
}

impl PackedScore {
    pub const fn new(mg: i16, eg: i16) -> Self {
        Self(((eg as i32) << 16).wrapping_add(mg as i32))
    }

    pub const fn mg(self) -> i16 {
        self.0 as i16
    }

    /// The `0x8000` corrects for the borrow from the upper half when the midgame value is negative.
    pub const fn eg(self) -> i16 {
        ((self.0.wrapping_add(0x8000) as u32) >> 16) as u16 as i16
    }
}

// The packed value itself may wrap around even when both halves are in range, e.g. for `s(-1, i16::MIN)`.
impl Add for PackedScore {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.wrapping_add(rhs.0))
    }
}

impl AddAssign for PackedScore {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for PackedScore {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0.wrapping_sub(rhs.0))
    }
}

impl SubAssign for PackedScore {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Neg for PackedScore {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(self.0.wrapping_neg())
    }
}

impl Sum for PackedScore {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, x| acc + x)
    }
}

impl Mul<i32> for PackedScore {
    type Output = Self;

    fn mul(self, rhs: i32) -> Self::Output {
        debug_assert!(
            (self.mg() as i32 * rhs).abs() <= i16::MAX as i32
                && (self.eg() as i32 * rhs).abs() <= i16::MAX as i32,
            "{self} * {rhs} overflows"
        );
        Self(self.0.wrapping_mul(rhs))
    }
}

impl MulAssign<i32> for PackedScore {
    fn mul_assign(&mut self, rhs: i32) {
        *self = *self * rhs;
    }
}

impl Display for PackedScore {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "S({0:4}, {1:4})", self.mg(), self.eg())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn corner_cases_test() {
        for (mg, eg) in [
            (0, 0),
            (-1, 0),
            (0, -1),
            (-1, -1),
            (i16::MIN, i16::MAX),
            (i16::MAX, i16::MIN),
            (i16::MIN, i16::MIN),
            (i16::MAX, i16::MAX),
        ] {
            let score = s(mg, eg);
            assert_eq!(score.mg(), mg);
            assert_eq!(score.eg(), eg);
        }
        assert_eq!(s(3, -4).to_string(), "S(   3,   -4)");
    }

    proptest! {
        #[test]
        fn roundtrip_test(mg in any::<i16>(), eg in any::<i16>()) {
            let score = PackedScore::new(mg, eg);
            prop_assert_eq!(score.mg(), mg);
            prop_assert_eq!(score.eg(), eg);
        }

        #[test]
        fn addition_test(a in -16_000_i16..16_000, b in -16_000_i16..16_000, c in -16_000_i16..16_000, d in -16_000_i16..16_000) {
            let sum = s(a, b) + s(c, d);
            prop_assert_eq!(sum.mg(), a + c);
            prop_assert_eq!(sum.eg(), b + d);
            let diff = s(a, b) - s(c, d);
            prop_assert_eq!(diff.mg(), a - c);
            prop_assert_eq!(diff.eg(), b - d);
            let neg = -s(a, b);
            prop_assert_eq!(neg.mg(), -a);
            prop_assert_eq!(neg.eg(), -b);
        }

        #[test]
        fn multiplication_test(mg in -3000_i16..3000, eg in -3000_i16..3000, factor in -10_i32..=10) {
            let product = s(mg, eg) * factor;
            prop_assert_eq!(product.mg() as i32, mg as i32 * factor);
            prop_assert_eq!(product.eg() as i32, eg as i32 * factor);
        }
    }
}
