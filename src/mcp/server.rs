//! MCP server core: lifecycle, method dispatch and the validation
//! pipeline.
//!
//! A [`McpServer`] is a message-driven JSON-RPC 2.0 endpoint. Each call to
//! [`McpServer::parse_message`] runs to completion on the calling thread:
//! the message is decoded, dispatched, and every response reaches the sink
//! before the call returns. The core has no suspension points and no
//! locks; transports that need concurrency wrap the server in a
//! single-writer mailbox (see [`crate::mcp::transport`]).
//!
//! # Failure semantics
//!
//! Parser and structural failures surface as JSON-RPC `error` objects.
//! Tool-level failures (failed argument binding, handler-reported errors)
//! surface as JSON-RPC *success* responses whose result carries
//! `isError: true`. An unknown tool name in `tools/call` is answered with
//! an `InvalidParams` error.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::mcp::content::{ReturnValue, ToolCallResult};
use crate::mcp::property::PropertyList;
use crate::mcp::protocol::{
    parse_message, IncomingMessage, JsonRpcError, JsonRpcNotification, JsonRpcRequest,
    JsonRpcResponse, MCP_PROTOCOL_VERSION,
};
use crate::mcp::tool::{Tool, ToolRegistry};

/// Outbound sink: receives one serialised JSON document per response.
///
/// Set at construction; the server owns it for its whole lifetime.
pub type MessageSink = Box<dyn FnMut(&str) + Send>;

/// Server capabilities advertised during initialisation.
#[derive(Debug, Clone, Serialize)]
pub struct ServerCapabilities {
    /// Tool-related capabilities.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolCapabilities>,
}

impl Default for ServerCapabilities {
    fn default() -> Self {
        Self {
            tools: Some(ToolCapabilities::default()),
        }
    }
}

/// Tool-specific capabilities.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ToolCapabilities {
    /// Whether the tool list can change during the session.
    #[serde(rename = "listChanged", skip_serializing_if = "is_false")]
    pub list_changed: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)] // serde's skip_serializing_if requires a predicate fn(&T) -> bool, so we must take &bool here
const fn is_false(b: &bool) -> bool {
    !*b
}

/// Server identity reported in the initialisation response.
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    /// Server name.
    pub name: String,
    /// Server version.
    pub version: String,
}

impl ServerInfo {
    /// Creates a server identity.
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// Client information received during initialisation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    /// Client name.
    pub name: String,
    /// Client version.
    #[serde(default)]
    pub version: Option<String>,
}

/// Parameters for the initialize request. All members are optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InitializeParams {
    /// Protocol version requested by the client.
    #[serde(default)]
    protocol_version: Option<String>,
    /// Client information.
    #[serde(default)]
    client_info: Option<ClientInfo>,
}

/// Parameters for tools/list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToolsListParams {
    /// When set, only user-only tools are listed.
    #[serde(default)]
    list_user_only_tools: bool,
}

/// The MCP server: registry, protocol state and outbound sink.
pub struct McpServer {
    /// Server identity.
    info: ServerInfo,
    /// Registered tools, in registration order.
    registry: ToolRegistry,
    /// Outbound message sink.
    sink: MessageSink,
    /// Set by the first successful `initialize` call.
    initialized: bool,
    /// Reject undeclared tool arguments instead of ignoring them.
    strict_arguments: bool,
}

impl McpServer {
    /// Creates a server with the given identity and outbound sink.
    #[must_use]
    pub fn new(info: ServerInfo, sink: MessageSink) -> Self {
        Self {
            info,
            registry: ToolRegistry::new(),
            sink,
            initialized: false,
            strict_arguments: false,
        }
    }

    /// Sets the undeclared-argument policy.
    ///
    /// Permissive (the default) silently ignores arguments not declared in
    /// a tool's schema; strict rejects them with a tool-level error.
    #[must_use]
    pub fn with_strict_arguments(mut self, strict: bool) -> Self {
        self.strict_arguments = strict;
        self
    }

    /// Returns the server identity.
    #[must_use]
    pub const fn info(&self) -> &ServerInfo {
        &self.info
    }

    /// Returns the tool registry.
    #[must_use]
    pub const fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Whether a successful `initialize` call has been processed.
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Registers a tool. Returns `false` if its name collides with an
    /// already-registered tool.
    ///
    /// Registration must complete before the server starts receiving
    /// messages; there is no removal.
    pub fn add_tool(&mut self, tool: Tool) -> bool {
        let name = tool.name().to_string();
        let added = self.registry.add(tool);
        if added {
            tracing::debug!(tool = %name, total = self.registry.len(), "Tool registered");
        } else {
            tracing::warn!(tool = %name, "Duplicate tool name rejected");
        }
        added
    }

    /// Convenience wrapper: builds a [`Tool`] and registers it.
    pub fn add_simple_tool(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        schema: PropertyList,
        handler: impl Fn(&PropertyList) -> ReturnValue + Send + Sync + 'static,
    ) -> bool {
        self.add_tool(Tool::new(name, description, schema, handler))
    }

    /// Processes one inbound JSON document.
    ///
    /// Any responses are emitted to the sink before this method returns.
    /// Notifications (messages without an `id`) never produce output.
    pub fn parse_message(&mut self, message: &str) {
        match parse_message(message) {
            Ok(IncomingMessage::Request(req)) => self.handle_request(req),
            Ok(IncomingMessage::Notification(ref notif)) => Self::handle_notification(notif),
            Err(error) => self.send_error(&error),
        }
    }

    /// Handles an incoming request and emits the response.
    fn handle_request(&mut self, req: JsonRpcRequest) {
        let response = match req.method.as_str() {
            "initialize" => self.handle_initialize(&req),
            "tools/list" => self.handle_tools_list(&req),
            "tools/call" => self.handle_tools_call(&req),
            "ping" => Ok(Self::handle_ping(&req)),
            _ => Err(JsonRpcError::method_not_found(req.id.clone(), &req.method)),
        };

        match response {
            Ok(resp) => self.send_response(&resp),
            Err(error) => self.send_error(&error),
        }
    }

    /// Handles an incoming notification. Never emits output.
    fn handle_notification(notif: &JsonRpcNotification) {
        if notif.method == "notifications/initialized" {
            tracing::debug!("Client reported initialisation complete");
        } else {
            tracing::debug!(method = %notif.method, "Ignoring notification");
        }
    }

    /// Handles the initialize request.
    ///
    /// Idempotent: every call returns the same result object and leaves
    /// the initialised flag set. Params are optional.
    fn handle_initialize(&mut self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        let params: InitializeParams = req
            .params
            .as_ref()
            .and_then(|p| serde_json::from_value(p.clone()).ok())
            .unwrap_or_default();

        if let Some(client) = &params.client_info {
            tracing::info!(
                client = %client.name,
                version = client.version.as_deref().unwrap_or("unknown"),
                "Client connected"
            );
        }
        if let Some(requested) = &params.protocol_version {
            if requested != MCP_PROTOCOL_VERSION {
                tracing::debug!(
                    requested = %requested,
                    supported = MCP_PROTOCOL_VERSION,
                    "Protocol version mismatch, answering with supported version"
                );
            }
        }

        self.initialized = true;

        let result = json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "capabilities": ServerCapabilities::default(),
            "serverInfo": self.info,
        });

        Ok(JsonRpcResponse::success(req.id.clone(), result))
    }

    /// Handles the tools/list request.
    fn handle_tools_list(&self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        let params: ToolsListParams = req
            .params
            .as_ref()
            .and_then(|p| serde_json::from_value(p.clone()).ok())
            .unwrap_or_default();

        let result = json!({
            "tools": self.registry.definitions(params.list_user_only_tools),
        });

        Ok(JsonRpcResponse::success(req.id.clone(), result))
    }

    /// Handles the tools/call request.
    ///
    /// Binding failures and handler-reported errors become `isError: true`
    /// results; a missing/mistyped `name` or an unknown tool name is an
    /// `InvalidParams` protocol error.
    fn handle_tools_call(&self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        let params = req
            .params
            .as_ref()
            .and_then(Value::as_object)
            .ok_or_else(|| {
                JsonRpcError::invalid_params(req.id.clone(), "Missing tool call params")
            })?;

        let name = params.get("name").and_then(Value::as_str).ok_or_else(|| {
            JsonRpcError::invalid_params(req.id.clone(), "Tool name is required")
        })?;

        let tool = self.registry.find(name).ok_or_else(|| {
            JsonRpcError::invalid_params(req.id.clone(), format!("Unknown tool: {name}"))
        })?;

        let arguments: Option<&Map<String, Value>> = match params.get("arguments") {
            None | Some(Value::Null) => None,
            Some(Value::Object(map)) => Some(map),
            Some(_) => {
                return Err(JsonRpcError::invalid_params(
                    req.id.clone(),
                    "Tool arguments must be an object",
                ))
            }
        };

        let result = match tool.schema().bind(arguments, self.strict_arguments) {
            Ok(bound) => {
                tracing::debug!(tool = %name, "Invoking tool");
                ToolCallResult::from(tool.invoke(&bound))
            }
            Err(bind_error) => {
                tracing::debug!(tool = %name, error = %bind_error, "Argument binding failed");
                ToolCallResult::error(format!("Error: {bind_error}"))
            }
        };

        let result_value = serde_json::to_value(&result).map_err(|e| {
            tracing::error!(error = %e, "Failed to serialise tool call result");
            JsonRpcError::internal_error(req.id.clone(), "Internal error: failed to serialise result")
        })?;

        Ok(JsonRpcResponse::success(req.id.clone(), result_value))
    }

    /// Handles the ping request.
    fn handle_ping(req: &JsonRpcRequest) -> JsonRpcResponse {
        JsonRpcResponse::success(req.id.clone(), json!({}))
    }

    /// Serialises and emits a success response.
    fn send_response(&mut self, response: &JsonRpcResponse) {
        match serde_json::to_string(response) {
            Ok(payload) => (self.sink)(&payload),
            Err(e) => tracing::error!(error = %e, "Failed to serialise response"),
        }
    }

    /// Serialises and emits an error response.
    fn send_error(&mut self, error: &JsonRpcError) {
        match serde_json::to_string(error) {
            Ok(payload) => (self.sink)(&payload),
            Err(e) => tracing::error!(error = %e, "Failed to serialise error response"),
        }
    }
}

impl std::fmt::Debug for McpServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpServer")
            .field("info", &self.info)
            .field("tools", &self.registry.len())
            .field("initialized", &self.initialized)
            .field("strict_arguments", &self.strict_arguments)
            .finish_non_exhaustive()
    }
}
