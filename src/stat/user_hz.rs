use std::{
    num::ParseIntError,
    ops::{Add, Div},
    str::FromStr,
};

/// a count of kernel clock ticks.
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd)]
pub struct UserHz(u64);

// === impl UserHz ===

impl UserHz {
    pub const ZERO: Self = Self(0);

    pub const fn new(ticks: u64) -> Self {
        Self(ticks)
    }

    /// returns the ticks elapsed since `earlier`.
    ///
    /// counters that went backwards yield zero.
    pub fn since(self, earlier: Self) -> Self {
        let (Self(now), Self(earlier)) = (self, earlier);
        Self(now.saturating_sub(earlier))
    }
}

impl FromStr for UserHz {
    type Err = ParseIntError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl Add for UserHz {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        let (Self(lhs), Self(rhs)) = (self, rhs);
        Self(lhs.saturating_add(rhs))
    }
}

impl Div for UserHz {
    type Output = f64;
    fn div(self, rhs: Self) -> Self::Output {
        let (Self(lhs), Self(rhs)) = (self, rhs);

        lhs as f64 / rhs as f64
    }
}
