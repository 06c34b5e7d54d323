pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the fallible library surface.
///
/// Parsing and conversion never fail: malformed documents are reported through
/// [`crate::model::ParseResult::errors`] and [`crate::model::ParseResult::warnings`] instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid config JSON: {message}")]
    InvalidConfigJson { message: String },

    #[error("Invalid config YAML: {message}")]
    InvalidConfigYaml { message: String },

    #[error("Config root must be an object, got {found}")]
    ConfigNotAnObject { found: &'static str },
}
