//! Calculator tool set: basic integer arithmetic.
//!
//! Handler errors (division by zero, overflow) are reported as
//! `"Error: …"` text results, not protocol faults.

use crate::mcp::content::ReturnValue;
use crate::mcp::property::{Property, PropertyList, SchemaError};
use crate::mcp::server::{McpServer, MessageSink, ServerInfo};

/// Builds a complete calculator server with the given outbound sink.
///
/// # Errors
///
/// Returns an error if a tool schema cannot be declared.
pub fn server(sink: MessageSink) -> Result<McpServer, SchemaError> {
    let mut server = McpServer::new(ServerInfo::new("Calculator Server", "1.0.0"), sink);
    register(&mut server)?;
    Ok(server)
}

/// Registers the calculator tools on an existing server.
///
/// # Errors
///
/// Returns an error if a tool schema cannot be declared.
pub fn register(server: &mut McpServer) -> Result<(), SchemaError> {
    server.add_simple_tool("add", "Add two integers", operand_pair("a", "b")?, add);
    server.add_simple_tool(
        "subtract",
        "Subtract two integers",
        operand_pair("a", "b")?,
        subtract,
    );
    server.add_simple_tool(
        "multiply",
        "Multiply two integers",
        operand_pair("a", "b")?,
        multiply,
    );
    server.add_simple_tool(
        "divide",
        "Divide two integers",
        operand_pair("a", "b")?,
        divide,
    );
    server.add_simple_tool(
        "power",
        "Calculate base^exponent",
        operand_pair("base", "exponent")?,
        power,
    );

    let mut factorial_props = PropertyList::new();
    factorial_props.push(Property::integer_in_range("n", None, 0, 20)?)?;
    server.add_simple_tool(
        "factorial",
        "Calculate n! (factorial)",
        factorial_props,
        factorial,
    );

    Ok(())
}

/// Two required integer operands.
fn operand_pair(first: &str, second: &str) -> Result<PropertyList, SchemaError> {
    let mut props = PropertyList::new();
    props.push(Property::integer(first, None)?)?;
    props.push(Property::integer(second, None)?)?;
    Ok(props)
}

fn add(props: &PropertyList) -> ReturnValue {
    let (Some(a), Some(b)) = (props.int_value("a"), props.int_value("b")) else {
        return ReturnValue::Text("Error: Both parameters must be integers".to_string());
    };

    a.checked_add(b).map_or_else(
        || ReturnValue::Text("Error: Integer overflow".to_string()),
        |sum| ReturnValue::Text(format!("Result: {a} + {b} = {sum}")),
    )
}

fn subtract(props: &PropertyList) -> ReturnValue {
    let (Some(a), Some(b)) = (props.int_value("a"), props.int_value("b")) else {
        return ReturnValue::Text("Error: Both parameters must be integers".to_string());
    };

    a.checked_sub(b).map_or_else(
        || ReturnValue::Text("Error: Integer overflow".to_string()),
        |diff| ReturnValue::Text(format!("Result: {a} - {b} = {diff}")),
    )
}

fn multiply(props: &PropertyList) -> ReturnValue {
    let (Some(a), Some(b)) = (props.int_value("a"), props.int_value("b")) else {
        return ReturnValue::Text("Error: Both parameters must be integers".to_string());
    };

    a.checked_mul(b).map_or_else(
        || ReturnValue::Text("Error: Integer overflow".to_string()),
        |product| ReturnValue::Text(format!("Result: {a} × {b} = {product}")),
    )
}

#[allow(clippy::cast_precision_loss)] // operands far below 2^52 in practice
fn divide(props: &PropertyList) -> ReturnValue {
    let (Some(a), Some(b)) = (props.int_value("a"), props.int_value("b")) else {
        return ReturnValue::Text("Error: Both parameters must be integers".to_string());
    };

    if b == 0 {
        return ReturnValue::Text("Error: Division by zero is not allowed".to_string());
    }

    let quotient = a as f64 / b as f64;
    ReturnValue::Text(format!("Result: {a} ÷ {b} = {quotient:.2}"))
}

#[allow(clippy::cast_precision_loss)] // operands far below 2^52 in practice
fn power(props: &PropertyList) -> ReturnValue {
    let (Some(base), Some(exponent)) = (props.int_value("base"), props.int_value("exponent"))
    else {
        return ReturnValue::Text("Error: Both base and exponent must be integers".to_string());
    };

    let result = (base as f64).powf(exponent as f64);
    ReturnValue::Text(format!("Result: {base}^{exponent} = {result:.2}"))
}

fn factorial(props: &PropertyList) -> ReturnValue {
    // The schema bounds n to [0, 20]; 20! still fits in an i64
    let Some(n) = props.int_value("n") else {
        return ReturnValue::Text("Error: Parameter must be an integer".to_string());
    };

    let product: i64 = (1..=n).product();
    ReturnValue::Text(format!("Result: {n}! = {product}"))
}
