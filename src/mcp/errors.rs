//! MCP Error Handling
//!
//! Protocol-level failures and their mapping onto JSON-RPC error codes.
//! Weather lookup failures inside a tool call are not protocol errors; they
//! are reported as `isError` tool results instead.

use crate::mcp::protocol::*;
use crate::weather::WeatherError;
use thiserror::Error;
use tracing::{error, warn};

/// MCP-specific errors that can occur during server operation
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Tool not found: {name}")]
    ToolNotFound { name: String },

    #[error("Resource not found: {uri}")]
    ResourceNotFound { uri: String },

    #[error("Invalid parameters for tool '{tool}': {message}")]
    InvalidToolParameters { tool: String, message: String },

    #[error("Resource '{uri}' could not be read: {source}")]
    ResourceAccessFailed {
        uri: String,
        #[source]
        source: WeatherError,
    },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Method not found: {method}")]
    MethodNotFound { method: String },

    #[error("Invalid parameters: {message}")]
    InvalidParameters { message: String },

    #[error("Internal server error: {message}")]
    InternalError { message: String },
}

impl McpError {
    /// Convert MCP error to JSON-RPC error
    #[inline]
    pub fn to_jsonrpc_error(&self) -> JsonRpcError {
        let code = match self {
            Self::ToolNotFound { .. } => mcp_error_codes::TOOL_NOT_FOUND,
            Self::ResourceNotFound { .. } => mcp_error_codes::RESOURCE_NOT_FOUND,
            Self::InvalidToolParameters { .. } | Self::InvalidParameters { .. } => {
                error_codes::INVALID_PARAMS
            }
            Self::InvalidRequest { .. } => error_codes::INVALID_REQUEST,
            Self::MethodNotFound { .. } => error_codes::METHOD_NOT_FOUND,
            Self::ResourceAccessFailed { .. } | Self::InternalError { .. } => {
                error_codes::INTERNAL_ERROR
            }
        };

        JsonRpcError::new(code, self.to_string(), None)
    }

    /// Create error response message
    #[inline]
    pub fn to_error_response(&self, id: Option<RequestId>) -> JsonRpcMessage {
        let error_response = JsonRpcErrorResponse::new(self.to_jsonrpc_error(), id);
        JsonRpcMessage::ErrorResponse(error_response)
    }

    /// Log the error with appropriate level
    #[inline]
    pub fn log(&self) {
        match self {
            Self::InvalidRequest { .. }
            | Self::InvalidParameters { .. }
            | Self::InvalidToolParameters { .. }
            | Self::MethodNotFound { .. } => {
                warn!("Client error: {}", self);
            }
            Self::ToolNotFound { .. } | Self::ResourceNotFound { .. } => {
                warn!("Not found error: {}", self);
            }
            Self::ResourceAccessFailed { .. } | Self::InternalError { .. } => {
                error!("Server error: {}", self);
            }
        }
    }
}

/// Result type for MCP operations
pub type McpResult<T> = Result<T, McpError>;

impl From<serde_json::Error> for McpError {
    #[inline]
    fn from(error: serde_json::Error) -> Self {
        Self::InternalError {
            message: error.to_string(),
        }
    }
}
