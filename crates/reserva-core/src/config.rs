/// Trait for loading service configuration from environment variables.
///
/// Implementors derive `serde::Deserialize` (with `#[serde(default = ...)]` for
/// optional settings) and call `Config::from_env()` at startup. Field names map to
/// upper-cased variables: `database_url` reads `DATABASE_URL`. `Vec<String>` fields
/// read comma-separated values.
pub trait Config: Sized + serde::de::DeserializeOwned {
    fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    /// Load from an explicit variable list instead of the process environment.
    fn from_iter<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(vars)
    }
}
