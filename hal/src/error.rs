//! Common error types for HAL operations

use core::fmt;

use pulse_core::PulseError;

/// HAL operation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalError {
    /// Invalid parameter provided
    InvalidParameter,
    /// Every fabric or compare channel is already allocated
    NoFreeChannel,
    /// Channel handle does not belong to this peripheral or was freed
    InvalidChannel,
    /// Peripheral is busy
    Busy,
    /// Hardware error occurred
    HardwareError,
}

impl HalError {
    /// Static description used when the error crosses into [`PulseError`].
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidParameter => "invalid parameter",
            Self::NoFreeChannel => "no free channel",
            Self::InvalidChannel => "invalid channel",
            Self::Busy => "peripheral busy",
            Self::HardwareError => "hardware error",
        }
    }
}

impl fmt::Display for HalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HalError {}

#[cfg(feature = "defmt")]
impl defmt::Format for HalError {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{=str}", self.as_str());
    }
}

impl From<HalError> for PulseError {
    fn from(value: HalError) -> Self {
        match value {
            HalError::NoFreeChannel => PulseError::ResourceExhausted,
            other => PulseError::Hardware(other.as_str()),
        }
    }
}

/// Result type for HAL operations
pub type HalResult<T> = Result<T, HalError>;
