use super::models::Config;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("extractor.binary must not be empty")]
    EmptyExtractorBinary,

    #[error("extractor.extra_args must not contain empty arguments")]
    EmptyExtraArg,

    #[error("staging.prefix must be non-empty and contain no path separators, got '{0}'")]
    InvalidStagingPrefix(String),

    #[error("staging.dir '{0}' does not exist or is not a directory")]
    MissingStagingDir(String),
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_extractor(config)?;
    validate_staging(config)?;
    Ok(())
}

fn validate_extractor(config: &Config) -> Result<(), ValidationError> {
    if config.extractor.binary.trim().is_empty() {
        return Err(ValidationError::EmptyExtractorBinary);
    }

    if config.extractor.extra_args.iter().any(|arg| arg.is_empty()) {
        return Err(ValidationError::EmptyExtraArg);
    }

    Ok(())
}

fn validate_staging(config: &Config) -> Result<(), ValidationError> {
    let prefix = &config.staging.prefix;
    if prefix.is_empty() || prefix.contains(['/', '\\']) {
        return Err(ValidationError::InvalidStagingPrefix(prefix.clone()));
    }

    if let Some(dir) = &config.staging.dir
        && !dir.is_dir()
    {
        return Err(ValidationError::MissingStagingDir(
            dir.display().to_string(),
        ));
    }

    Ok(())
}
