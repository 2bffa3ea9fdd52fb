//! Funnel behaviour configuration

use chrono::Duration;
use serde::Deserialize;

use super::error::ValidationError;

/// One week.
const MAX_SESSION_TIMEOUT_MINUTES: i64 = 7 * 24 * 60;

/// Session and qualification settings
#[derive(Debug, Clone, Deserialize)]
pub struct FunnelConfig {
    /// Minutes of inactivity after which a conversation expires
    #[serde(default = "default_session_timeout")]
    pub session_timeout_minutes: i64,

    /// Score a reason must strictly exceed to qualify
    #[serde(default = "default_qualification_threshold")]
    pub qualification_threshold: f32,
}

impl FunnelConfig {
    /// Get session timeout as a chrono Duration
    pub fn session_timeout(&self) -> Duration {
        Duration::minutes(self.session_timeout_minutes)
    }

    /// Validate funnel configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=MAX_SESSION_TIMEOUT_MINUTES).contains(&self.session_timeout_minutes) {
            return Err(ValidationError::InvalidSessionTimeout);
        }
        if !(0.0..=1.0).contains(&self.qualification_threshold) {
            return Err(ValidationError::InvalidThreshold);
        }
        Ok(())
    }
}

impl Default for FunnelConfig {
    fn default() -> Self {
        Self {
            session_timeout_minutes: default_session_timeout(),
            qualification_threshold: default_qualification_threshold(),
        }
    }
}

fn default_session_timeout() -> i64 {
    30
}

fn default_qualification_threshold() -> f32 {
    0.7
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_funnel_defaults() {
        let config = FunnelConfig::default();
        assert_eq!(config.session_timeout(), Duration::minutes(30));
        assert_eq!(config.qualification_threshold, 0.7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_zero_timeout() {
        let config = FunnelConfig {
            session_timeout_minutes: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidSessionTimeout));
    }

    #[test]
    fn test_validation_rejects_timeout_beyond_a_week() {
        let config = FunnelConfig {
            session_timeout_minutes: i64::MAX,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidSessionTimeout));

        let config = FunnelConfig {
            session_timeout_minutes: MAX_SESSION_TIMEOUT_MINUTES,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.session_timeout(), Duration::weeks(1));
    }

    #[test]
    fn test_validation_rejects_threshold_above_one() {
        let config = FunnelConfig {
            qualification_threshold: 1.5,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidThreshold));
    }
}
