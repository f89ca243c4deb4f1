//! mcp-toolkit: embeddable MCP server runtime with typed tool schemas
//!
//! This library implements the server side of the Model Context Protocol:
//! a JSON-RPC 2.0 endpoint that advertises named tools, validates their
//! typed arguments against declared schemas, dispatches them to registered
//! handlers, and serialises results back over an abstract transport.
//!
//! # Architecture
//!
//! The core is transport-agnostic and synchronous: a host feeds inbound
//! JSON documents into [`mcp::server::McpServer::parse_message`] and
//! receives outbound documents through a sink callback supplied at
//! construction. A stdio transport for the common case is included.
//!
//! Tool business logic lives outside the core; the bundled [`tools`]
//! modules (calculator, file manager, weather) show the intended wiring.
//!
//! # Modules
//!
//! - [`config`] — Configuration loading and validation
//! - [`error`] — Error types
//! - [`mcp`] — MCP protocol implementation
//! - [`tools`] — Bundled example tool sets

pub mod config;
pub mod error;
pub mod mcp;
pub mod tools;
