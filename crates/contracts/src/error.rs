//! Layered error definitions
//!
//! Categorized by source: config / scene / renderer / frame / sink

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    /// Rotation axis code outside {0, 1, 2}
    #[error("unrecognized rotation axis {value}, expected 0 (X), 1 (Y) or 2 (Z)")]
    UnknownAxis { value: i64 },

    // ===== Scene Errors =====
    /// Mechanical link reference could not be resolved
    #[error("link '{link}' not found on parent model")]
    LinkNotFound { link: String },

    // ===== Renderer Errors =====
    /// No active rendering backend / scene
    #[error("renderer unavailable: {message}")]
    RendererUnavailable { message: String },

    /// Renderer call failed
    #[error("renderer error: {message}")]
    Renderer { message: String },

    // ===== Frame Errors =====
    /// Buffer dimensions disagree (intensity vs. mask, or data vs. header)
    #[error("frame shape mismatch for {what}: expected {expected}, got {actual}")]
    FrameShape {
        what: String,
        expected: String,
        actual: String,
    },

    // ===== Sink Errors =====
    /// Sink write error
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create link-not-found error
    pub fn link_not_found(link: impl Into<String>) -> Self {
        Self::LinkNotFound { link: link.into() }
    }

    /// Create renderer-unavailable error
    pub fn renderer_unavailable(message: impl Into<String>) -> Self {
        Self::RendererUnavailable {
            message: message.into(),
        }
    }

    /// Create renderer error
    pub fn renderer(message: impl Into<String>) -> Self {
        Self::Renderer {
            message: message.into(),
        }
    }

    /// Create frame shape error
    pub fn frame_shape(
        what: impl Into<String>,
        expected: impl ToString,
        actual: impl ToString,
    ) -> Self {
        Self::FrameShape {
            what: what.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }
}
