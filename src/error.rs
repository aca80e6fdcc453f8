use thiserror::Error;

pub type Result<T> = std::result::Result<T, AgentError>;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("response carried no `finish_reason`")]
    MissingFinishReason,

    #[error("model stopped with finish_reason `{0}`")]
    NonStopFinish(String),

    #[error("model reported stop but returned no `content`")]
    MissingContent,

    #[error("tool `{0}` not found")]
    UnknownTool(String),

    #[error("tool `{0}` refused the call")]
    ToolRefused(String),

    #[error("bad call to tool `{name}`: {detail}")]
    BadToolCall { name: String, detail: String },

    #[error("dispatch exceeded {0} rounds without a terminal answer")]
    RoundLimit(usize),

    #[error("configuration error: {0}")]
    Config(String),
}
