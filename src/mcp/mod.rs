//! MCP (Model Context Protocol) Server Implementation
//!
//! A JSON-RPC 2.0 server over newline-delimited stdio exposing the weather
//! lookups as tools and as `weather://` resources.


pub mod errors;
pub mod protocol;
pub mod resources;
pub mod server;
pub mod summary;
pub mod tools;

pub use errors::{McpError, McpResult};
pub use resources::WeatherResourceHandler;
pub use server::{ConnectionState, McpServer, MessageHandler, ResourceHandler, ToolHandler};
pub use tools::{CurrentWeatherHandler, ForecastHandler};
