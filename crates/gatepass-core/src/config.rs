/// Trait for loading service configuration from environment variables.
///
/// Implementors derive `serde::Deserialize`; field `jwt_secret` is read from
/// `JWT_SECRET`, and so on. Use `#[serde(default = "...")]` for optional keys.
pub trait Config: Sized + serde::de::DeserializeOwned {
    /// Load configuration, returning the first missing or malformed key as an error.
    fn try_from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    /// Load configuration at startup.
    ///
    /// # Panics
    ///
    /// Panics if any required env var is missing or cannot be deserialized.
    fn from_env() -> Self {
        Self::try_from_env().expect("failed to load config from environment")
    }
}
