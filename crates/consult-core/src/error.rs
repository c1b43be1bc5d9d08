//! Error types for the consultation core

use thiserror::Error;

use crate::provider::ProviderId;

/// Result type for consultation operations
pub type ConsultResult<T> = Result<T, ConsultError>;

/// Why a call could not be started for a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetRejection {
    /// No provider with this id exists in the catalog
    UnknownProvider,
    /// The provider exists but is not accepting calls
    ProviderOffline,
    /// Another call is already in progress
    CallInProgress,
}

impl std::fmt::Display for TargetRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetRejection::UnknownProvider => write!(f, "unknown provider"),
            TargetRejection::ProviderOffline => write!(f, "provider is offline"),
            TargetRejection::CallInProgress => write!(f, "a call is already in progress"),
        }
    }
}

/// Errors that can occur in the consultation core
#[derive(Debug, Error)]
pub enum ConsultError {
    /// A call was requested for a provider that cannot be called right now
    #[error("Cannot call provider {provider_id}: {reason}")]
    InvalidTarget {
        provider_id: ProviderId,
        reason: TargetRejection,
    },

    /// A call control was used while no call is in progress
    #[error("No call in progress")]
    NoActiveCall,

    /// Two providers in a catalog share an id
    #[error("Duplicate provider id {provider_id}")]
    DuplicateProvider { provider_id: ProviderId },

    /// Provider data could not be read or parsed
    #[error("Provider source error: {message}")]
    ProviderSource { message: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl ConsultError {
    /// Create an invalid target error
    pub fn invalid_target(provider_id: ProviderId, reason: TargetRejection) -> Self {
        Self::InvalidTarget { provider_id, reason }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a provider source error
    pub fn provider_source(message: impl Into<String>) -> Self {
        Self::ProviderSource {
            message: message.into(),
        }
    }

    /// Rejection reason, if this is an `InvalidTarget` error
    pub fn rejection(&self) -> Option<TargetRejection> {
        match self {
            ConsultError::InvalidTarget { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}

impl From<config::ConfigError> for ConsultError {
    fn from(err: config::ConfigError) -> Self {
        Self::config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_target_message_names_provider_and_reason() {
        let err = ConsultError::invalid_target(ProviderId(3), TargetRejection::ProviderOffline);
        assert_eq!(err.to_string(), "Cannot call provider 3: provider is offline");
        assert_eq!(err.rejection(), Some(TargetRejection::ProviderOffline));
        assert_eq!(ConsultError::NoActiveCall.rejection(), None);
    }
}
