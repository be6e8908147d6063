#[cfg(feature = "python")]
use pyo3::exceptions::PyRuntimeError;
#[cfg(feature = "python")]
use pyo3::PyErr;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MixoError>;

#[derive(Error, Debug)]
pub enum MixoError {
    #[error("{file}: marker row '{marker}' not found")]
    MissingMarker { file: String, marker: String },

    #[error("{file}: column '{column}' not found")]
    MissingColumn { file: String, column: String },

    #[error("{file}: line {line}, column '{column}': cannot parse '{value}' as a number")]
    Parse {
        file: String,
        line: usize,
        column: String,
        value: String,
    },

    #[error("{file}: {message}")]
    InputFormat { file: String, message: String },

    #[error("{0}")]
    General(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl MixoError {
    pub(crate) fn missing_marker(file: &str, marker: &str) -> Self {
        MixoError::MissingMarker {
            file: file.to_string(),
            marker: marker.to_string(),
        }
    }

    pub(crate) fn missing_column(file: &str, column: &str) -> Self {
        MixoError::MissingColumn {
            file: file.to_string(),
            column: column.to_string(),
        }
    }

    pub(crate) fn input_format(file: &str, message: impl Into<String>) -> Self {
        MixoError::InputFormat {
            file: file.to_string(),
            message: message.into(),
        }
    }
}

#[cfg(feature = "python")]
impl From<MixoError> for PyErr {
    fn from(err: MixoError) -> PyErr {
        PyRuntimeError::new_err(err.to_string())
    }
}
