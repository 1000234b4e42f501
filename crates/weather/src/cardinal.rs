use std::fmt;
use std::str::FromStr;

use crate::WeatherError;

/// Sixteen-point compass rose. A forecast label names the direction the wind
/// blows *from*.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinal {
    N,
    Nne,
    Ne,
    Ene,
    E,
    Ese,
    Se,
    Sse,
    S,
    Ssw,
    Sw,
    Wsw,
    W,
    Wnw,
    Nw,
    Nnw,
}

const ROSE: [Cardinal; 16] = [
    Cardinal::N,
    Cardinal::Nne,
    Cardinal::Ne,
    Cardinal::Ene,
    Cardinal::E,
    Cardinal::Ese,
    Cardinal::Se,
    Cardinal::Sse,
    Cardinal::S,
    Cardinal::Ssw,
    Cardinal::Sw,
    Cardinal::Wsw,
    Cardinal::W,
    Cardinal::Wnw,
    Cardinal::Nw,
    Cardinal::Nnw,
];

const STEP_DEG: f64 = 22.5;

impl Cardinal {
    pub fn label(self) -> &'static str {
        match self {
            Self::N => "N",
            Self::Nne => "NNE",
            Self::Ne => "NE",
            Self::Ene => "ENE",
            Self::E => "E",
            Self::Ese => "ESE",
            Self::Se => "SE",
            Self::Sse => "SSE",
            Self::S => "S",
            Self::Ssw => "SSW",
            Self::Sw => "SW",
            Self::Wsw => "WSW",
            Self::W => "W",
            Self::Wnw => "WNW",
            Self::Nw => "NW",
            Self::Nnw => "NNW",
        }
    }

    /// Bearing the wind comes from, degrees clockwise from north.
    pub fn from_deg(self) -> f64 {
        let index = ROSE.iter().position(|c| *c == self).unwrap_or(0);
        index as f64 * STEP_DEG
    }

    /// Bearing the wind blows towards (`from + 180`, wrapped).
    pub fn toward_deg(self) -> f64 {
        toward(self.from_deg())
    }

    /// Closest compass point to an arbitrary "from" bearing.
    pub fn nearest(from_deg: f64) -> Self {
        let index = (from_deg.rem_euclid(360.0) / STEP_DEG).round() as usize % ROSE.len();
        ROSE[index]
    }
}

/// Convert a "blows from" bearing to the "blows towards" bearing.
pub fn toward(from_deg: f64) -> f64 {
    (from_deg + 180.0).rem_euclid(360.0)
}

impl FromStr for Cardinal {
    type Err = WeatherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ROSE.iter()
            .copied()
            .find(|c| c.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| WeatherError::UnknownCardinal(wanted.to_string()))
    }
}

impl fmt::Display for Cardinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
