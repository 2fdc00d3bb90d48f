//! Modulation schemes offered by the margin-vs-modulation sweep.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::LinkBudgetError;

/// Additional margin lost per unit of modulation index (dB).
pub const INDEX_PENALTY_DB: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Modulation {
    #[serde(rename = "QPSK")]
    Qpsk,
    #[serde(rename = "8PSK")]
    Psk8,
    #[serde(rename = "16QAM")]
    Qam16,
    #[serde(rename = "64QAM")]
    Qam64,
}

impl Modulation {
    pub const ALL: [Modulation; 4] = [
        Modulation::Qpsk,
        Modulation::Psk8,
        Modulation::Qam16,
        Modulation::Qam64,
    ];

    /// Fixed penalty relative to QPSK (dB, non-positive).
    pub fn penalty_db(self) -> f64 {
        match self {
            Modulation::Qpsk => 0.0,
            Modulation::Psk8 => -3.0,
            Modulation::Qam16 => -6.0,
            Modulation::Qam64 => -9.0,
        }
    }

    /// Total margin change for this scheme at `index`.
    pub fn margin_adjustment_db(self, index: f64) -> f64 {
        self.penalty_db() - index * INDEX_PENALTY_DB
    }
}

impl fmt::Display for Modulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Modulation::Qpsk => "QPSK",
            Modulation::Psk8 => "8PSK",
            Modulation::Qam16 => "16QAM",
            Modulation::Qam64 => "64QAM",
        };
        f.write_str(name)
    }
}

impl FromStr for Modulation {
    type Err = LinkBudgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect::<String>()
            .to_ascii_uppercase();
        Modulation::ALL
            .into_iter()
            .find(|m| m.to_string() == normalized)
            .ok_or_else(|| LinkBudgetError::NotSupported(format!("{} modulation", s.trim())))
    }
}
