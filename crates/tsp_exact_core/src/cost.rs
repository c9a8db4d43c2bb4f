use std::fmt::{Debug, Display};

use serde::{Serialize, de::DeserializeOwned};

/// Numeric edge cost accumulated by the solver.
///
/// Integer costs stay exact and report overflow through [`Cost::checked_add`].
/// Float costs are added in the order the solver visits transitions.
pub trait Cost:
    Copy + PartialOrd + Debug + Display + Send + Sync + Serialize + DeserializeOwned + 'static
{
    fn zero() -> Self;

    /// `None` when the sum cannot be represented.
    fn checked_add(self, rhs: Self) -> Option<Self>;

    /// Values that mean "no edge" when they appear in a matrix.
    fn is_sentinel(self) -> bool;

    fn is_negative(self) -> bool;

    fn as_f64(self) -> f64;
}

macro_rules! int_cost {
    ($($ty:ty),*) => {$(
        impl Cost for $ty {
            fn zero() -> Self {
                0
            }

            fn checked_add(self, rhs: Self) -> Option<Self> {
                <$ty>::checked_add(self, rhs)
            }

            fn is_sentinel(self) -> bool {
                self == <$ty>::MAX
            }

            #[allow(unused_comparisons)]
            fn is_negative(self) -> bool {
                self < 0
            }

            fn as_f64(self) -> f64 {
                self as f64
            }
        }
    )*};
}

macro_rules! float_cost {
    ($($ty:ty),*) => {$(
        impl Cost for $ty {
            fn zero() -> Self {
                0.0
            }

            fn checked_add(self, rhs: Self) -> Option<Self> {
                let sum = self + rhs;
                sum.is_finite().then_some(sum)
            }

            fn is_sentinel(self) -> bool {
                !self.is_finite()
            }

            fn is_negative(self) -> bool {
                self < 0.0
            }

            fn as_f64(self) -> f64 {
                self as f64
            }
        }
    )*};
}

int_cost!(i32, i64, u32, u64);
float_cost!(f32, f64);
