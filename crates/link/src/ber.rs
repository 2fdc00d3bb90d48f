//! Bit error rate for BPSK/QPSK-equivalent detection in AWGN.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::LinkBudgetError;

/// Closed form used to turn a linear SNR into a bit error rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BerModel {
    /// `0.5·erfc(√snr)`; accurate down to very small error rates.
    #[default]
    Erfc,
    /// `0.5·exp(−snr/2)`. Coarse, over-estimates BER by orders of magnitude at high SNR.
    Exponential,
}

impl BerModel {
    /// BER for a linear (not dB) SNR, clamped to `[0, 0.5]`.
    pub fn bit_error_rate(self, snr_linear: f64) -> f64 {
        let snr = snr_linear.max(0.0);
        let ber = match self {
            BerModel::Erfc => 0.5 * libm::erfc(snr.sqrt()),
            BerModel::Exponential => 0.5 * (-snr / 2.0).exp(),
        };
        ber.clamp(0.0, 0.5)
    }
}

impl FromStr for BerModel {
    type Err = LinkBudgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "erfc" => Ok(BerModel::Erfc),
            "exponential" | "exp" => Ok(BerModel::Exponential),
            other => Err(LinkBudgetError::NotSupported(format!("{other} BER model"))),
        }
    }
}
