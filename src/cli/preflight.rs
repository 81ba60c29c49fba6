//! Pre-flight checks before starting the server.
//!
//! Validates that required API keys are present before binding the
//! listener, so misconfiguration fails at startup instead of on the
//! first request.

use crate::engine::{GEMINI_API_KEY_ENV, PINECONE_API_KEY_ENV};
use crate::error::{Result, YogiError};

/// Verify the env keys every external collaborator needs.
pub fn check() -> Result<()> {
    check_env(GEMINI_API_KEY_ENV)?;
    check_env(PINECONE_API_KEY_ENV)?;
    Ok(())
}

fn check_env(name: &str) -> Result<()> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(()),
        Ok(_) => Err(YogiError::Config(format!(
            "{} is empty. Set it with: export {}='...'",
            name, name
        ))),
        Err(_) => Err(YogiError::Config(format!(
            "{} not set. Set it with: export {}='...'",
            name, name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_env_is_config_error() {
        let err = check_env("YOGI_TEST_DEFINITELY_UNSET").unwrap_err();
        assert!(matches!(err, YogiError::Config(_)));
    }
}
