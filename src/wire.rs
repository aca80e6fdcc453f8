//! Serde shapes for the OpenAI-compatible chat-completions request body and
//! the envelope returned to callers.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::tool::Tool;

/// Request body posted on every dispatch round: the tool manifest plus the
/// conversation so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub tools: Vec<ToolSpec>,
    pub messages: Vec<ChatMessage>,
}

impl ChatRequest {
    pub fn empty() -> Self {
        Self {
            tools: Vec::new(),
            messages: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub r#type: String,
    pub function: FunctionSpec,
}

/// One manifest entry. `required` sits beside `parameters` inside the
/// function object, matching what lmstudio-style endpoints accept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSpec {
    pub name: String,
    pub description: String,
    pub parameters: FunctionParameters,
    pub required: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionParameters {
    pub r#type: String,
    pub properties: Map<String, Value>,
}

impl From<&Tool> for ToolSpec {
    fn from(tool: &Tool) -> Self {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for param in tool.params() {
            properties.insert(
                param.name.clone(),
                json!({
                    "type": param.type_tag,
                    "description": param.description,
                }),
            );
            if param.required {
                required.push(param.name.clone());
            }
        }

        ToolSpec {
            r#type: "function".to_string(),
            function: FunctionSpec {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameters: FunctionParameters {
                    r#type: "object".to_string(),
                    properties,
                },
                required,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
            tool_call_id: None,
        }
    }

    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: "tool".to_string(),
            content: content.into(),
            tool_call_id: Some(tool_call_id.into()),
        }
    }
}

/// The JSON document every query returns to its caller, success or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub status: String,
    pub message: String,
}

impl Envelope {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
        }
    }

    pub fn to_json(&self) -> String {
        json!({ "status": self.status, "message": self.message }).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::{ParamSpec, ToolRegistry};

    #[test]
    fn manifest_entry_matches_wire_layout() {
        let mut registry = ToolRegistry::new();
        registry
            .add_tool("get_weather")
            .set_description("Current weather for a country.")
            .add_param(ParamSpec::new("country", "string", "Country name.", true))
            .add_param(ParamSpec::new("days", "int", "Forecast days.", false));

        let spec = ToolSpec::from(registry.get("get_weather").unwrap());
        let value = serde_json::to_value(&spec).unwrap();

        assert_eq!(value["type"], "function");
        assert_eq!(value["function"]["name"], "get_weather");
        assert_eq!(value["function"]["parameters"]["type"], "object");
        assert_eq!(
            value["function"]["parameters"]["properties"]["country"]["type"],
            "string"
        );
        assert_eq!(
            value["function"]["parameters"]["properties"]["days"]["description"],
            "Forecast days."
        );
        assert_eq!(value["function"]["required"], serde_json::json!(["country"]));
    }

    #[test]
    fn properties_keep_registration_order() {
        let mut registry = ToolRegistry::new();
        registry
            .add_tool("ordered")
            .add_param(ParamSpec::new("zeta", "string", "", true))
            .add_param(ParamSpec::new("alpha", "string", "", true));

        let spec = ToolSpec::from(registry.get("ordered").unwrap());
        let keys: Vec<&String> = spec.function.parameters.properties.keys().collect();
        assert_eq!(keys, ["zeta", "alpha"]);
    }

    #[test]
    fn tool_message_carries_call_id() {
        let message = ChatMessage::tool("call_0", "done");
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["role"], "tool");
        assert_eq!(value["tool_call_id"], "call_0");

        let user = serde_json::to_value(ChatMessage::user("hi")).unwrap();
        assert!(user.get("tool_call_id").is_none());
    }

    #[test]
    fn envelope_serializes_status_and_message() {
        let ok: Envelope = serde_json::from_str(&Envelope::success("hello").to_json()).unwrap();
        assert_eq!(ok.status, "success");
        assert_eq!(ok.message, "hello");

        let err: Envelope = serde_json::from_str(&Envelope::error("boom").to_json()).unwrap();
        assert_eq!(err.status, "error");
    }
}
