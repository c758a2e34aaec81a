//! Odometer and fuel gauge readings taken at pickup and return

use std::str::FromStr;

use crate::shared::errors::{DomainError, DomainResult};

/// Fuel gauge position. An ordinal scale, not a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FuelLevel {
    Empty,
    Quarter,
    Half,
    ThreeQuarters,
    Full,
}

impl FuelLevel {
    pub const ALL: [FuelLevel; 5] = [
        Self::Empty,
        Self::Quarter,
        Self::Half,
        Self::ThreeQuarters,
        Self::Full,
    ];

    /// 0 = Empty ... 4 = Full
    pub fn from_ordinal(value: i32) -> DomainResult<Self> {
        usize::try_from(value)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or_else(|| {
                DomainError::InvalidFuelLevel(format!("{value} is outside the 0..=4 scale"))
            })
    }

    pub fn ordinal(&self) -> i32 {
        *self as i32
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "Empty",
            Self::Quarter => "Quarter",
            Self::Half => "Half",
            Self::ThreeQuarters => "ThreeQuarters",
            Self::Full => "Full",
        }
    }
}

impl FromStr for FuelLevel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DomainError::InvalidFuelLevel(format!("unknown level '{s}'")))
    }
}

impl std::fmt::Display for FuelLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Odometer reading in whole kilometres
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Odometer(u32);

impl Odometer {
    pub fn new(km: i64) -> DomainResult<Self> {
        u32::try_from(km)
            .map(Self)
            .map_err(|_| DomainError::InvalidKm(format!("{km} km is not a valid odometer reading")))
    }

    pub fn km(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for Odometer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} km", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fuel_ordinals() {
        assert_eq!(FuelLevel::from_ordinal(0).unwrap(), FuelLevel::Empty);
        assert_eq!(FuelLevel::from_ordinal(4).unwrap(), FuelLevel::Full);
        assert_eq!(FuelLevel::ThreeQuarters.ordinal(), 3);
        assert!(FuelLevel::Quarter < FuelLevel::Half);
    }

    #[test]
    fn fuel_out_of_range() {
        for bad in [-1, 5, 100] {
            let err = FuelLevel::from_ordinal(bad).unwrap_err();
            assert!(matches!(err, DomainError::InvalidFuelLevel(_)), "{bad}");
        }
    }

    #[test]
    fn fuel_parse_is_case_insensitive() {
        assert_eq!("threequarters".parse::<FuelLevel>().unwrap(), FuelLevel::ThreeQuarters);
        assert_eq!("Full".parse::<FuelLevel>().unwrap(), FuelLevel::Full);
        assert!("brimming".parse::<FuelLevel>().is_err());
    }

    #[test]
    fn odometer_rejects_negative_and_huge() {
        assert_eq!(Odometer::new(0).unwrap().km(), 0);
        assert_eq!(Odometer::new(152_300).unwrap().km(), 152_300);
        assert!(matches!(Odometer::new(-1), Err(DomainError::InvalidKm(_))));
        assert!(matches!(
            Odometer::new(i64::from(u32::MAX) + 1),
            Err(DomainError::InvalidKm(_))
        ));
    }
}
