use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::args::{coerce, ArgBag};
use crate::config::AgentConfig;
use crate::error::{AgentError, Result};
use crate::tool::{Tool, ToolRegistry};
use crate::transport::{ChatTransport, HttpTransport};
use crate::wire::{ChatMessage, ChatRequest, Envelope, ToolSpec};

/// A tool-calling agent speaking the OpenAI chat-completions protocol.
///
/// Register tools, then [`query`](Agent::query) a user prompt. The agent
/// relays tool calls from the model to the registered callables and feeds the
/// results back until the model produces a terminal answer. One agent serves
/// one conversation at a time; `query` takes `&mut self` for that reason.
pub struct Agent<T: ChatTransport> {
    transport: T,
    registry: ToolRegistry,
    base: ChatRequest,
    current: ChatRequest,
    manifest_stale: bool,
    max_rounds: Option<usize>,
}

impl Agent<HttpTransport> {
    /// Agent pointed at the default local endpoint.
    pub fn new() -> Self {
        Self::with_transport(HttpTransport::default())
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self::with_transport(HttpTransport::new(endpoint))
    }

    pub fn from_config(config: &AgentConfig) -> Self {
        let transport = HttpTransport::new(&config.endpoint)
            .with_timeout(Duration::from_secs(config.timeout_secs));
        let mut agent = Self::with_transport(transport);
        agent.max_rounds = config.max_rounds;
        agent
    }
}

impl Default for Agent<HttpTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ChatTransport> Agent<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            registry: ToolRegistry::new(),
            base: ChatRequest::empty(),
            current: ChatRequest::empty(),
            manifest_stale: true,
            max_rounds: None,
        }
    }

    /// Bound the number of dispatch rounds per query. Unbounded by default.
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = Some(max_rounds);
        self
    }

    /// Register a tool, or fetch the existing handle when the name is taken.
    /// Mutating the registry marks the manifest stale; the next query
    /// rebuilds it.
    pub fn add_tool(&mut self, name: impl Into<String>) -> &mut Tool {
        self.manifest_stale = true;
        self.registry.add_tool(name)
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Rebuild the tool manifest embedded in every request. The base prompt
    /// lists tools in registration order and starts with no messages.
    pub fn build_manifest(&mut self) {
        self.base.tools = self.registry.iter().map(ToolSpec::from).collect();
        self.base.messages.clear();
        self.current = self.base.clone();
        self.manifest_stale = false;
    }

    pub fn base_prompt(&self) -> &ChatRequest {
        &self.base
    }

    /// Run one full dispatch loop for `user_prompt`. Always returns the
    /// `{status, message}` envelope as a JSON string; errors are surfaced in
    /// the envelope, never as a panic.
    pub async fn query(&mut self, user_prompt: &str) -> String {
        if self.manifest_stale {
            self.build_manifest();
        }
        self.current.messages.clear();
        self.current.messages.push(ChatMessage::user(user_prompt));

        let envelope = match self.dispatch().await {
            Ok(content) => Envelope::success(content),
            Err(err) => {
                warn!(error = %err, "dispatch aborted");
                Envelope::error(err.to_string())
            }
        };
        envelope.to_json()
    }

    async fn dispatch(&mut self) -> Result<String> {
        let mut round = 0usize;
        loop {
            if let Some(limit) = self.max_rounds {
                if round >= limit {
                    return Err(AgentError::RoundLimit(limit));
                }
            }
            round += 1;
            debug!(round, messages = self.current.messages.len(), "posting chat request");

            let response = self.transport.round_trip(&self.current).await?;
            match classify(&response)? {
                Turn::Final(content) => return Ok(content),
                Turn::ToolCalls(calls) => {
                    // An empty batch is legal; the loop simply re-queries.
                    for call in &calls {
                        self.execute_tool_call(call)?;
                    }
                }
            }
        }
    }

    fn execute_tool_call(&mut self, call: &Value) -> Result<()> {
        let id = call.get("id").and_then(Value::as_str).unwrap_or("unknown");
        let call_type = call.get("type").and_then(Value::as_str).unwrap_or("unknown");

        let function = match call.get("function").and_then(Value::as_object) {
            Some(function) => function,
            None => {
                debug!(id, "skipping tool call without a function object");
                return Ok(());
            }
        };
        let name = function.get("name").and_then(Value::as_str).unwrap_or("unknown");
        let raw_args = function
            .get("arguments")
            .and_then(Value::as_str)
            .unwrap_or("{}");

        let tool = self
            .registry
            .get(name)
            .ok_or_else(|| AgentError::UnknownTool(name.to_string()))?;

        let parsed: Value = serde_json::from_str(raw_args).map_err(|err| AgentError::BadToolCall {
            name: name.to_string(),
            detail: format!("arguments are not valid JSON: {err}"),
        })?;

        let mut bag = ArgBag::default();
        for param in tool.params() {
            let Some(raw) = parsed.get(&param.name).and_then(scalar_to_string) else {
                continue;
            };
            if let Some(value) = coerce(&raw, &param.type_tag) {
                bag.set(param.name.clone(), value);
            }
        }

        debug!(id, tool = name, call_type, "invoking tool");
        let output = tool
            .invoke(&bag)
            .ok_or_else(|| AgentError::ToolRefused(name.to_string()))?;
        self.current.messages.push(ChatMessage::tool(id, output));
        Ok(())
    }
}

enum Turn {
    Final(String),
    ToolCalls(Vec<Value>),
}

/// Classify a raw response as a terminal answer, a batch of tool calls, or
/// one of the error shapes. Checked in the order the protocol demands:
/// `choices` first, then `tool_calls`, then `finish_reason`/`content`.
fn classify(response: &Value) -> Result<Turn> {
    let choices = response
        .get("choices")
        .and_then(Value::as_array)
        .filter(|choices| !choices.is_empty())
        .ok_or_else(|| {
            AgentError::MalformedResponse("`choices` missing, empty, or not an array".into())
        })?;
    let first = &choices[0];

    if let Some(calls) = first.pointer("/message/tool_calls").and_then(Value::as_array) {
        return Ok(Turn::ToolCalls(calls.clone()));
    }

    let finish_reason = first
        .get("finish_reason")
        .and_then(Value::as_str)
        .ok_or(AgentError::MissingFinishReason)?;
    if finish_reason != "stop" {
        return Err(AgentError::NonStopFinish(finish_reason.to_string()));
    }

    let content = first
        .pointer("/message/content")
        .and_then(Value::as_str)
        .ok_or(AgentError::MissingContent)?;
    Ok(Turn::Final(content.to_string()))
}

// The wire contract sends argument values as strings, but real senders also
// emit bare numbers and booleans; stringify those before coercion. Arrays
// and objects stay absent.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}
