//! Tool records and the tool registry.
//!
//! A [`Tool`] binds a name and description to a [`PropertyList`] schema
//! and a handler function. `Tool::new` consumes the schema by move: after
//! registration the tool is the sole owner, so there is no aliasing to
//! reason about when the server binds arguments against it.
//!
//! The [`ToolRegistry`] is append-only for the lifetime of a session and
//! preserves registration order, which determines `tools/list` order.

use indexmap::IndexMap;
use serde_json::{json, Value};

use crate::mcp::content::ReturnValue;
use crate::mcp::property::PropertyList;

/// Handler invoked with the bound property list of a `tools/call`.
pub type ToolHandler = Box<dyn Fn(&PropertyList) -> ReturnValue + Send + Sync>;

/// A named, documented callable with a typed argument schema.
pub struct Tool {
    name: String,
    description: String,
    schema: PropertyList,
    handler: ToolHandler,
    user_only: bool,
}

impl Tool {
    /// Creates a tool. The schema is consumed: the tool owns it from here
    /// on.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        schema: PropertyList,
        handler: impl Fn(&PropertyList) -> ReturnValue + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            schema,
            handler: Box::new(handler),
            user_only: false,
        }
    }

    /// Marks this tool as user-only.
    ///
    /// User-only tools carry an `annotations.audience = ["user"]` entry in
    /// their definition and can be selected via the `listUserOnlyTools`
    /// parameter of `tools/list`.
    #[must_use]
    pub fn user_only(mut self) -> Self {
        self.user_only = true;
        self
    }

    /// Returns the tool name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the tool description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the argument schema.
    #[must_use]
    pub const fn schema(&self) -> &PropertyList {
        &self.schema
    }

    /// Whether this tool is user-only.
    #[must_use]
    pub const fn is_user_only(&self) -> bool {
        self.user_only
    }

    /// Invokes the handler with a bound property list.
    ///
    /// The server calls this only after a successful bind against the
    /// tool's schema.
    #[must_use]
    pub fn invoke(&self, bound: &PropertyList) -> ReturnValue {
        (self.handler)(bound)
    }

    /// Emits the tool definition for a `tools/list` response.
    #[must_use]
    pub fn definition(&self) -> Value {
        let mut definition = json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": self.schema.input_schema(),
        });
        if self.user_only {
            definition["annotations"] = json!({ "audience": ["user"] });
        }
        definition
    }
}

impl std::fmt::Debug for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("schema", &self.schema)
            .field("user_only", &self.user_only)
            .finish_non_exhaustive()
    }
}

/// An insertion-ordered collection of tools, looked up by name.
///
/// Append-only: there is no removal operation. Lookup is case-sensitive
/// exact match.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: IndexMap<String, Tool>,
}

impl ToolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tools: IndexMap::new(),
        }
    }

    /// Adds a tool. Returns `false` (and leaves the registry untouched)
    /// when the name collides with an existing tool.
    pub fn add(&mut self, tool: Tool) -> bool {
        if self.tools.contains_key(tool.name()) {
            return false;
        }
        self.tools.insert(tool.name().to_string(), tool);
        true
    }

    /// Looks up a tool by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Tool> {
        self.tools.get(name)
    }

    /// Returns the number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Iterates over the tools in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Tool> {
        self.tools.values()
    }

    /// Emits tool definitions in registration order.
    ///
    /// With `user_only_filter` set, only user-only tools are included,
    /// mirroring the `listUserOnlyTools` parameter of `tools/list`.
    #[must_use]
    pub fn definitions(&self, user_only_filter: bool) -> Vec<Value> {
        self.iter()
            .filter(|tool| !user_only_filter || tool.is_user_only())
            .map(Tool::definition)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::property::Property;

    fn dummy_tool(name: &str) -> Tool {
        Tool::new(name, format!("{name} tool"), PropertyList::new(), |_| {
            ReturnValue::Boolean(true)
        })
    }

    #[test]
    fn add_and_find() {
        let mut registry = ToolRegistry::new();
        assert!(registry.add(dummy_tool("echo")));
        assert!(registry.find("echo").is_some());
        assert!(registry.find("Echo").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn duplicate_name_rejected() {
        let mut registry = ToolRegistry::new();
        assert!(registry.add(dummy_tool("echo")));
        assert!(!registry.add(dummy_tool("echo")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn registration_order_preserved() {
        let mut registry = ToolRegistry::new();
        for name in ["add", "subtract", "multiply", "divide"] {
            assert!(registry.add(dummy_tool(name)));
        }

        let names: Vec<&str> = registry.iter().map(Tool::name).collect();
        assert_eq!(names, ["add", "subtract", "multiply", "divide"]);
    }

    #[test]
    fn definition_shape() {
        let mut schema = PropertyList::new();
        schema.push(Property::integer("a", None).unwrap()).unwrap();
        let tool = Tool::new("add", "Add two integers", schema, |_| ReturnValue::Integer(0));

        let definition = tool.definition();
        assert_eq!(definition["name"], "add");
        assert_eq!(definition["description"], "Add two integers");
        assert_eq!(definition["inputSchema"]["type"], "object");
        assert_eq!(definition["inputSchema"]["required"][0], "a");
        assert!(definition.get("annotations").is_none());
    }

    #[test]
    fn user_only_annotation() {
        let tool = dummy_tool("self_destruct").user_only();
        let definition = tool.definition();
        assert_eq!(definition["annotations"]["audience"][0], "user");
    }

    #[test]
    fn user_only_filter() {
        let mut registry = ToolRegistry::new();
        registry.add(dummy_tool("public"));
        registry.add(dummy_tool("private").user_only());

        assert_eq!(registry.definitions(false).len(), 2);
        let filtered = registry.definitions(true);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0]["name"], "private");
    }

    #[test]
    fn invoke_runs_handler() {
        let mut schema = PropertyList::new();
        schema.push(Property::integer("n", None).unwrap()).unwrap();
        let tool = Tool::new("double", "Double a number", schema.clone(), |props| {
            ReturnValue::Integer(props.int_value("n").unwrap_or(0) * 2)
        });

        let bound = schema
            .bind(
                Some(serde_json::json!({"n": 21}).as_object().unwrap()),
                false,
            )
            .unwrap();
        assert_eq!(tool.invoke(&bound), ReturnValue::Integer(42));
    }
}
