//! Client-side tool-calling agent for OpenAI-compatible chat endpoints.
//!
//! The crate provides a minimal dispatch runtime with:
//! - A tool registry ([`ToolRegistry`]) that describes local callables to the
//!   remote model as an OpenAI-style tool manifest.
//! - An argument marshaller ([`ArgBag`], [`coerce`]) that bridges the
//!   loosely-typed JSON wire format and typed parameters.
//! - An [`Agent`] that loops between the endpoint and the registered tools
//!   until the model produces a terminal answer, returning a
//!   `{status, message}` envelope either way.

mod agent;
mod args;
mod config;
mod error;
mod tool;
mod transport;
mod wire;

pub use agent::Agent;
pub use args::{coerce, ArgBag, ArgValue};
pub use config::AgentConfig;
pub use error::{AgentError, Result};
pub use tool::{ParamSpec, Tool, ToolFn, ToolRegistry};
pub use transport::{ChatTransport, HttpTransport, StubTransport, DEFAULT_ENDPOINT};
pub use wire::{ChatMessage, ChatRequest, Envelope, FunctionParameters, FunctionSpec, ToolSpec};
