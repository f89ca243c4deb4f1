//! Tool results and content items.
//!
//! A tool handler produces a [`ReturnValue`]; the server wraps it into the
//! MCP `content` array of a `tools/call` response:
//!
//! - `Boolean`, `Integer`, `Text` and `Json` become one `"text"` item
//! - `Image` becomes one `"image"` item with base64-encoded data
//!
//! A `Text` value beginning with `"Error:"` is a handler-reported error:
//! it is framed with `isError: true` but still travels as a JSON-RPC
//! *success* response. Callable-level errors are user-visible data, not
//! protocol faults.

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use serde::Serialize;
use serde_json::Value;

/// Raw image bytes with their MIME type.
///
/// The bytes are held unencoded; base64 encoding happens at serialisation
/// time via the standard alphabet with `=` padding and no line breaks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageContent {
    mime_type: String,
    data: Vec<u8>,
}

impl ImageContent {
    /// Creates an image content value.
    #[must_use]
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }

    /// Returns the MIME type, emitted verbatim on the wire.
    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Returns the raw (unencoded) bytes.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the base64 encoding of the raw bytes.
    #[must_use]
    pub fn encoded_data(&self) -> String {
        BASE64_STANDARD.encode(&self.data)
    }
}

/// The tagged result a tool handler hands back to the server.
///
/// Ownership transfers to the server, which releases the value after
/// serialisation.
#[derive(Debug, Clone, PartialEq)]
pub enum ReturnValue {
    /// A boolean result, serialised as the text `"true"` or `"false"`.
    Boolean(bool),
    /// An integer result, serialised in decimal text form.
    Integer(i64),
    /// A text result. A leading `"Error:"` marks a handler-reported error.
    Text(String),
    /// A structured result, serialised as compact JSON text.
    Json(Value),
    /// An image result.
    Image(ImageContent),
}

/// Content item in a tool call response.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
    /// Image content.
    Image {
        /// Base64-encoded image data.
        data: String,
        /// MIME type of the image.
        #[serde(rename = "mimeType")]
        mime_type: String,
    },
}

/// Result of a tool call, as placed into the JSON-RPC `result` member.
///
/// `isError` is always serialised, `false` included, so that peers see an
/// explicit verdict on every call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    /// Content returned by the tool.
    pub content: Vec<ToolContent>,
    /// Whether the tool call resulted in an error.
    pub is_error: bool,
}

impl ToolCallResult {
    /// Creates a successful text result.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: false,
        }
    }

    /// Creates an error text result.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: message.into(),
            }],
            is_error: true,
        }
    }
}

impl From<ReturnValue> for ToolCallResult {
    fn from(value: ReturnValue) -> Self {
        match value {
            ReturnValue::Boolean(b) => Self::text(if b { "true" } else { "false" }),
            ReturnValue::Integer(i) => Self::text(i.to_string()),
            ReturnValue::Text(s) => {
                if s.starts_with("Error:") {
                    Self::error(s)
                } else {
                    Self::text(s)
                }
            }
            ReturnValue::Json(v) => Self::text(v.to_string()),
            ReturnValue::Image(image) => Self {
                content: vec![ToolContent::Image {
                    data: image.encoded_data(),
                    mime_type: image.mime_type,
                }],
                is_error: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn boolean_maps_to_text() {
        let result = ToolCallResult::from(ReturnValue::Boolean(true));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["content"][0]["type"], "text");
        assert_eq!(json["content"][0]["text"], "true");
        assert_eq!(json["isError"], false);
    }

    #[test]
    fn integer_maps_to_decimal_text() {
        let result = ToolCallResult::from(ReturnValue::Integer(-42));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["content"][0]["text"], "-42");
    }

    #[test]
    fn text_is_carried_verbatim() {
        let result = ToolCallResult::from(ReturnValue::Text("Result: 5 + 3 = 8".to_string()));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["content"][0]["text"], "Result: 5 + 3 = 8");
        assert_eq!(json["isError"], false);
    }

    #[test]
    fn error_prefix_sets_is_error() {
        let result =
            ToolCallResult::from(ReturnValue::Text("Error: Division by zero".to_string()));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["isError"], true);
        assert!(json["content"][0]["text"]
            .as_str()
            .unwrap()
            .starts_with("Error:"));
    }

    #[test]
    fn json_maps_to_compact_text() {
        let result = ToolCallResult::from(ReturnValue::Json(json!({"city": "London"})));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["content"][0]["text"], r#"{"city":"London"}"#);
    }

    #[test]
    fn image_maps_to_image_item() {
        let image = ImageContent::new("image/png", vec![0xDE, 0xAD, 0xBE, 0xEF]);
        let result = ToolCallResult::from(ReturnValue::Image(image));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["content"][0]["type"], "image");
        assert_eq!(json["content"][0]["mimeType"], "image/png");
        assert_eq!(json["content"][0]["data"], "3q2+7w==");
    }

    #[test]
    fn is_error_always_serialised() {
        let result = ToolCallResult::text("ok");
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains(r#""isError":false"#));
    }

    #[test]
    fn base64_round_trip() {
        // One sample per padding length
        for data in [
            vec![],
            vec![1],
            vec![1, 2],
            vec![1, 2, 3],
            (0..=255).collect::<Vec<u8>>(),
        ] {
            let image = ImageContent::new("application/octet-stream", data.clone());
            let decoded = BASE64_STANDARD.decode(image.encoded_data()).unwrap();
            assert_eq!(decoded, data);
        }
    }

    #[test]
    fn encoded_data_has_no_line_breaks() {
        let image = ImageContent::new("image/jpeg", vec![0u8; 4096]);
        assert!(!image.encoded_data().contains('\n'));
    }
}
