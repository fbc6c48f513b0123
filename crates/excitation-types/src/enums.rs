//! Enumeration types for the Excitation simulator.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Cell State
// ---------------------------------------------------------------------------

/// The discrete phase of a cell's excitation cycle.
///
/// A cell sits at [`Rest`](Self::Rest) until diffusion from its neighbors
/// pushes its potential over the activation threshold. It then rises
/// exponentially ([`Increasing`](Self::Increasing)) until the peak, decays
/// exponentially ([`Decreasing`](Self::Decreasing)) until the rest floor,
/// and returns to rest.
///
/// Grid input files encode the state as an integer: `0` rest, `1`
/// increasing, `2` decreasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellState {
    /// Quiescent; the only state whose value is updated by diffusion.
    #[default]
    Rest,
    /// Rising toward the peak potential.
    Increasing,
    /// Falling toward the rest floor.
    Decreasing,
}

impl CellState {
    /// Decode the integer state code used by grid input files.
    ///
    /// Returns `None` for any code other than `0`, `1`, or `2`.
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Rest),
            1 => Some(Self::Increasing),
            2 => Some(Self::Decreasing),
            _ => None,
        }
    }

    /// The integer code for this state.
    pub const fn code(self) -> u8 {
        match self {
            Self::Rest => 0,
            Self::Increasing => 1,
            Self::Decreasing => 2,
        }
    }

    /// Returns `true` for [`CellState::Rest`].
    pub const fn is_rest(self) -> bool {
        matches!(self, Self::Rest)
    }
}

impl core::fmt::Display for CellState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let label = match self {
            Self::Rest => "rest",
            Self::Increasing => "increasing",
            Self::Decreasing => "decreasing",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for state in [CellState::Rest, CellState::Increasing, CellState::Decreasing] {
            assert_eq!(CellState::from_code(i64::from(state.code())), Some(state));
        }
    }

    #[test]
    fn unknown_codes_are_rejected() {
        assert_eq!(CellState::from_code(3), None);
        assert_eq!(CellState::from_code(-1), None);
    }

    #[test]
    fn serializes_as_snake_case() {
        let json = serde_json::to_string(&CellState::Increasing).ok();
        assert_eq!(json.as_deref(), Some("\"increasing\""));
    }
}
