use thiserror::Error;

/// Errors raised when a cache configuration is rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Cache capacity must be at least one entry")]
    ZeroCapacity,
    #[error("Cache max age must be greater than zero")]
    ZeroMaxAge,
}

/// Result type for cache configuration.
pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_capacity_display() {
        assert_eq!(
            ConfigError::ZeroCapacity.to_string(),
            "Cache capacity must be at least one entry"
        );
    }

    #[test]
    fn test_zero_max_age_display() {
        assert_eq!(
            ConfigError::ZeroMaxAge.to_string(),
            "Cache max age must be greater than zero"
        );
    }
}
