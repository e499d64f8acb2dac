//! Process exit signaling

use crate::error::{BrokerError, ConfigError};

/// Outcome of a run as seen by the calling process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Every discovered file was published
    Success,
    /// Bad arguments, bad root or missing configuration
    Usage,
    /// The broker could not be reached or topology could not be declared
    BrokerSetup,
    /// The scan completed but some files failed
    PartialFailure,
}

impl ExitStatus {
    /// Numeric process exit code
    pub fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Usage => 2,
            Self::BrokerSetup => 3,
            Self::PartialFailure => 4,
        }
    }
}

impl From<&ConfigError> for ExitStatus {
    fn from(_: &ConfigError) -> Self {
        Self::Usage
    }
}

impl From<&BrokerError> for ExitStatus {
    fn from(_: &BrokerError) -> Self {
        Self::BrokerSetup
    }
}

impl From<ExitStatus> for std::process::ExitCode {
    fn from(status: ExitStatus) -> Self {
        Self::from(status.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        let codes = [
            ExitStatus::Success.code(),
            ExitStatus::Usage.code(),
            ExitStatus::BrokerSetup.code(),
            ExitStatus::PartialFailure.code(),
        ];
        assert_eq!(codes, [0, 2, 3, 4]);
    }

    #[test]
    fn test_error_mapping() {
        let config = ConfigError::MissingVar("AMQP_URL");
        let broker = BrokerError::InvalidUrl("bad".to_string());

        assert_eq!(ExitStatus::from(&config), ExitStatus::Usage);
        assert_eq!(ExitStatus::from(&broker), ExitStatus::BrokerSetup);
    }
}
