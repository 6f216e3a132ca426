use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use qrcode::EcLevel;
use serde::{Deserialize, Serialize};

/// QR error-correction level, trading capacity for resilience
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[value(rename_all = "UPPER")]
pub enum ErrorCorrection {
    /// ~7% of codewords recoverable
    L,
    /// ~15% of codewords recoverable
    #[default]
    M,
    /// ~25% of codewords recoverable
    Q,
    /// ~30% of codewords recoverable
    H,
}

impl ErrorCorrection {
    pub const ALL: [ErrorCorrection; 4] =
        [ErrorCorrection::L, ErrorCorrection::M, ErrorCorrection::Q, ErrorCorrection::H];

    /// Approximate share of damaged codewords the level can recover
    pub fn recovery_percent(self) -> u8 {
        match self {
            ErrorCorrection::L => 7,
            ErrorCorrection::M => 15,
            ErrorCorrection::Q => 25,
            ErrorCorrection::H => 30,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ErrorCorrection::L => "L (low, 7%)",
            ErrorCorrection::M => "M (standard, 15%)",
            ErrorCorrection::Q => "Q (quartile, 25%)",
            ErrorCorrection::H => "H (high, 30%)",
        }
    }
}

impl From<ErrorCorrection> for EcLevel {
    fn from(level: ErrorCorrection) -> Self {
        match level {
            ErrorCorrection::L => EcLevel::L,
            ErrorCorrection::M => EcLevel::M,
            ErrorCorrection::Q => EcLevel::Q,
            ErrorCorrection::H => EcLevel::H,
        }
    }
}

impl fmt::Display for ErrorCorrection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            ErrorCorrection::L => "L",
            ErrorCorrection::M => "M",
            ErrorCorrection::Q => "Q",
            ErrorCorrection::H => "H",
        };
        f.write_str(letter)
    }
}

impl FromStr for ErrorCorrection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "L" => Ok(ErrorCorrection::L),
            "M" => Ok(ErrorCorrection::M),
            "Q" => Ok(ErrorCorrection::Q),
            "H" => Ok(ErrorCorrection::H),
            other => Err(format!("invalid error-correction level '{}' (expected L, M, Q or H)", other)),
        }
    }
}
