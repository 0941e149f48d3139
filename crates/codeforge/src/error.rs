#[derive(thiserror::Error, Debug, serde::Deserialize, serde::Serialize)]
pub enum Error {
    #[error("Failed to send request to Groq: {0}")]
    GatewayTransport(String),

    #[error("Groq API returned an error [{status}]: {body}")]
    GatewayStatus { status: u16, body: String },

    #[error("Groq completion contained no content")]
    EmptyCompletion,

    #[error("Error generating project: {0}")]
    Generation(String),

    #[error("Error writing project files: {0}")]
    Materialization(String),

    #[error("Error zipping project files: {0}")]
    Archiving(String),
}
