use thiserror::Error;

#[derive(Debug, Error)]
pub enum GfxError {
    #[error("invalid {kind} '{id}': {reason}")]
    InvalidDefinition {
        kind: &'static str,
        id: String,
        reason: String,
    },
    #[error("subpalette index {index} out of range (palette has {count} subpalettes)")]
    SubpaletteOutOfRange { index: usize, count: usize },
    #[error("palette index {index} out of range (reference palette has {size} entries)")]
    PaletteIndexOutOfRange { index: usize, size: usize },
    #[error("data too short: need {expected} bytes, got {actual}")]
    DataTooShort { expected: usize, actual: usize },
    #[error("unknown {kind} converter '{name}' (available: {available})")]
    ConverterNotFound {
        kind: &'static str,
        name: String,
        available: String,
    },
    #[error("unknown {kind} '{id}' (available: {available})")]
    DefinitionNotFound {
        kind: &'static str,
        id: String,
        available: String,
    },
    #[error("no {kind} selected: name one explicitly or choose a profile")]
    NoDefinitionSelected { kind: &'static str },
    #[error("malformed definition file: {0}")]
    Catalog(#[from] serde_json::Error),
}

impl GfxError {
    pub(crate) fn invalid(kind: &'static str, id: &str, reason: impl Into<String>) -> Self {
        GfxError::InvalidDefinition {
            kind,
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}
