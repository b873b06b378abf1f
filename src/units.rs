#![allow(missing_docs)]

//! This module defines various unit types and their conversions.
//!
//! Capacities are in MW, energy in MWh and mass in kg. Money is in an unspecified currency.
use serde::Serialize;

/// Represents a dimensionless quantity.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    PartialOrd,
    Default,
    Serialize,
    derive_more::Add,
    derive_more::Sub,
    derive_more::AddAssign,
)]
pub struct Dimensionless(pub f64);

impl std::ops::Mul for Dimensionless {
    type Output = Dimensionless;

    fn mul(self, rhs: Dimensionless) -> Self::Output {
        Dimensionless(self.0 * rhs.0)
    }
}

impl std::ops::Div for Dimensionless {
    type Output = Dimensionless;

    fn div(self, rhs: Dimensionless) -> Self::Output {
        Dimensionless(self.0 / rhs.0)
    }
}

impl Dimensionless {
    pub fn powi(self, rhs: i32) -> Self {
        Dimensionless(self.0.powi(rhs))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<f64> for Dimensionless {
    fn from(val: f64) -> Self {
        Self(val)
    }
}

impl From<Dimensionless> for f64 {
    fn from(val: Dimensionless) -> Self {
        val.0
    }
}

impl float_cmp::ApproxEq for Dimensionless {
    type Margin = float_cmp::F64Margin;

    fn approx_eq<M: Into<Self::Margin>>(self, other: Self, margin: M) -> bool {
        self.0.approx_eq(other.0, margin)
    }
}

macro_rules! unit_struct {
    ($name:ident) => {
        /// Represents a type of quantity.
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            PartialOrd,
            Default,
            Serialize,
            derive_more::Add,
            derive_more::Sub,
            derive_more::AddAssign,
        )]
        pub struct $name(pub f64);

        impl $name {
            /// Creates a new instance of the unit type from a f64 value.
            pub fn new(val: f64) -> Self {
                Self(val)
            }

            /// Returns the value of the unit type as a f64.
            pub fn value(self) -> f64 {
                self.0
            }

            /// Whether the underlying value is finite
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }

            /// Round to the nearest whole number
            pub fn round(self) -> Self {
                Self(self.0.round())
            }
        }

        impl std::ops::Mul<Dimensionless> for $name {
            type Output = $name;
            fn mul(self, rhs: Dimensionless) -> $name {
                $name(self.0 * rhs.0)
            }
        }

        impl std::ops::Mul<$name> for Dimensionless {
            type Output = $name;
            fn mul(self, rhs: $name) -> $name {
                $name(self.0 * rhs.0)
            }
        }

        impl std::ops::Div<Dimensionless> for $name {
            type Output = $name;
            fn div(self, rhs: Dimensionless) -> $name {
                $name(self.0 / rhs.0)
            }
        }

        impl std::ops::Div for $name {
            type Output = Dimensionless;
            fn div(self, rhs: $name) -> Dimensionless {
                Dimensionless(self.0 / rhs.0)
            }
        }

        impl std::ops::Neg for $name {
            type Output = $name;
            fn neg(self) -> $name {
                $name(-self.0)
            }
        }

        impl std::iter::Sum for $name {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                $name(iter.map(|x| x.0).sum())
            }
        }

        impl float_cmp::ApproxEq for $name {
            type Margin = float_cmp::F64Margin;

            fn approx_eq<M: Into<Self::Margin>>(self, other: Self, margin: M) -> bool {
                self.0.approx_eq(other.0, margin)
            }
        }
    };
}

macro_rules! impl_mul {
    ($Lhs:ty, $Rhs:ty, $Out:ty) => {
        impl std::ops::Mul<$Rhs> for $Lhs {
            type Output = $Out;
            fn mul(self, rhs: $Rhs) -> $Out {
                <$Out>::new(self.0 * rhs.0)
            }
        }
        impl std::ops::Mul<$Lhs> for $Rhs {
            type Output = $Out;
            fn mul(self, lhs: $Lhs) -> $Out {
                <$Out>::new(self.0 * lhs.0)
            }
        }
    };
}

macro_rules! impl_div {
    ($Lhs:ty, $Rhs:ty, $Out:ty) => {
        impl std::ops::Div<$Rhs> for $Lhs {
            type Output = $Out;
            fn div(self, rhs: $Rhs) -> $Out {
                <$Out>::new(self.0 / rhs.0)
            }
        }
    };
}

// Base quantities
unit_struct!(Money);
unit_struct!(Energy);
unit_struct!(Capacity);
unit_struct!(Mass);
unit_struct!(Hours);

// Derived quantities
unit_struct!(MoneyPerCapacity);
unit_struct!(MoneyPerEnergy);
unit_struct!(MoneyPerMass);
unit_struct!(EnergyPerMass);

// Division rules
impl_div!(Money, Capacity, MoneyPerCapacity);
impl_div!(Money, Energy, MoneyPerEnergy);
impl_div!(Money, Mass, MoneyPerMass);
impl_div!(Energy, Capacity, Hours);
impl_div!(Energy, Mass, EnergyPerMass);

// Multiplication rules
impl_mul!(MoneyPerCapacity, Capacity, Money);
impl_mul!(MoneyPerEnergy, Energy, Money);
impl_mul!(MoneyPerMass, Mass, Money);
impl_mul!(Capacity, Hours, Energy);
impl_mul!(EnergyPerMass, Mass, Energy);

/// Number of kW in one MW
pub const KW_PER_MW: f64 = 1000.0;

/// Number of kg in one tonne
pub const KG_PER_TONNE: f64 = 1000.0;

/// Convert a percentage into a proportion
pub fn percent(value: f64) -> Dimensionless {
    Dimensionless(value / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn test_unit_arithmetic() {
        let energy = Capacity(10.0) * Hours(4.0);
        assert_eq!(energy, Energy(40.0));
        assert_eq!(MoneyPerEnergy(50.0) * energy, Money(2000.0));
        assert_eq!(Money(2000.0) / Mass(400.0), MoneyPerMass(5.0));
        assert_eq!(Money(3.0) / Money(4.0), Dimensionless(0.75));
        assert_eq!(-Money(1.5), Money(-1.5));
    }

    #[test]
    fn test_sum_and_round() {
        let total: Money = [Money(1.2), Money(2.4), Money(0.3)].into_iter().sum();
        assert_approx_eq!(Money, total, Money(3.9));
        assert_eq!(total.round(), Money(4.0));
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(25.0), Dimensionless(0.25));
    }
}
