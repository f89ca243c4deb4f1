//! Model Context Protocol (MCP) server runtime.
//!
//! This module implements the server side of MCP: a message-driven
//! JSON-RPC 2.0 endpoint that advertises a dynamic set of named tools,
//! validates their typed arguments against declared schemas, dispatches
//! them to registered handlers, and serialises results back over an
//! abstract transport.
//!
//! # Architecture
//!
//! ```text
//! Transport ──▶ Server.parse_message
//!                 │
//!                 ├─ protocol: decode (id, method, params)
//!                 ├─ dispatch: initialize │ tools/list │ tools/call │ ping
//!                 │     └─ tools/call: registry find ─▶ property bind
//!                 │                     ─▶ handler ─▶ ReturnValue
//!                 └─ encode response ──▶ sink ──▶ Transport
//! ```
//!
//! # Protocol Version
//!
//! This implementation targets MCP protocol version 2024-11-05.

pub mod content;
pub mod property;
pub mod protocol;
pub mod server;
pub mod tool;
pub mod transport;

pub use content::{ImageContent, ReturnValue, ToolCallResult, ToolContent};
pub use property::{BindError, Property, PropertyKind, PropertyList, PropertyValue, SchemaError};
pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, MCP_PROTOCOL_VERSION};
pub use server::{McpServer, MessageSink, ServerInfo};
pub use tool::{Tool, ToolRegistry};
pub use transport::StdioTransport;
