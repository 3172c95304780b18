use thiserror::Error;

pub type Result<T> = std::result::Result<T, PageError>;

/// Failures raised while talking to the page host.
///
/// None of these are fatal: behaviors catch them at their boundary, log a
/// warning and keep running.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("element not found: {id}")]
    MissingElement { id: String },

    #[error("storage unavailable: {message}")]
    Storage { message: String },

    #[error("invalid selector: {selector}")]
    Selector { selector: String },

    #[error("host operation `{op}` failed: {message}")]
    Host { op: &'static str, message: String },
}

impl PageError {
    #[must_use]
    pub fn host(op: &'static str, message: impl Into<String>) -> Self {
        Self::Host {
            op,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn missing(id: impl Into<String>) -> Self {
        Self::MissingElement { id: id.into() }
    }
}

/// Rejected [`PageConfig`](crate::PageConfig) contents.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("`{field}` must be greater than zero")]
    ZeroInterval { field: &'static str },

    #[error("`default_volume` must be within [0, 1], got {value}")]
    VolumeOutOfRange { value: f64 },

    #[error("`bubble_emojis` must not be empty")]
    EmptyEmojiPalette,
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, PageError};

    #[test]
    fn config_errors_name_the_field() {
        let error = ConfigError::ZeroInterval {
            field: "bubble_interval_ms",
        };
        assert_eq!(
            error.to_string(),
            "`bubble_interval_ms` must be greater than zero"
        );
    }

    #[test]
    fn host_constructor_keeps_operation_name() {
        let error = PageError::host("set_class", "detached node");
        assert_eq!(
            error.to_string(),
            "host operation `set_class` failed: detached node"
        );
    }
}
