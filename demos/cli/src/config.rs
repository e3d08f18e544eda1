use growth_core::{GrowthError, IdentityPolicy, PivotConfig};

pub const MAX_AGE_ENV: &str = "GROWTH_MAX_AGE_YEARS";
pub const IDENTITY_ENV: &str = "GROWTH_IDENTITY";

/// Engine configuration from the environment, over the defaults.
pub fn from_env() -> Result<PivotConfig, GrowthError> {
    from_env_with(|key| std::env::var(key).ok())
}

/// Same as [`from_env`] with an injectable lookup, so tests never touch the
/// process environment.
pub fn from_env_with<F>(mut get: F) -> Result<PivotConfig, GrowthError>
where
    F: FnMut(&str) -> Option<String>,
{
    let mut config = PivotConfig::default();
    if let Some(raw) = get(MAX_AGE_ENV) {
        config.max_age_years = raw.trim().parse().map_err(|_| {
            GrowthError::InvalidConfig(format!("{MAX_AGE_ENV} must be a whole number, got `{raw}`"))
        })?;
    }
    if let Some(raw) = get(IDENTITY_ENV) {
        config.identity = raw.parse::<IdentityPolicy>()?;
    }
    Ok(config)
}
