use serde::de::DeserializeOwned;

/// Loads service configuration from environment variables.
///
/// Implementors derive `serde::Deserialize`; field names map to upper-case
/// env vars (`database_url` ← `DATABASE_URL`). Use `#[serde(default)]` or
/// `Option<T>` for optional settings.
pub trait Config: Sized + DeserializeOwned {
    /// Read configuration from the process environment.
    fn load() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    /// Read configuration from an explicit set of key/value pairs.
    fn load_from<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(vars)
    }
}
