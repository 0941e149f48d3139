//! One-shot conversational replies
//!
//! A single stateless exchange with the model. No history is kept between
//! calls, so every message stands on its own.

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::gateway::{CompletionParams, Gateway, GroqConfig};
use crate::prelude::{eprintln, println, *};

/// System prompt for conversational replies
pub const CHAT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Sampling parameters for conversational replies
pub const CHAT_PARAMS: CompletionParams = CompletionParams {
    temperature: 0.5,
    max_completion_tokens: 512,
};

#[derive(Debug, Parser)]
#[command(name = "chat")]
#[command(about = "Send a single chat message and print the reply")]
pub struct App {
    #[clap(flatten)]
    pub options: ChatOptions,
}

#[derive(Debug, Parser, Serialize, Deserialize, Clone)]
pub struct ChatOptions {
    /// Message to send
    pub message: String,

    /// Groq API key (overrides the GROQ_API_KEY environment variable)
    #[clap(long)]
    pub api_key: Option<String>,

    /// Groq API base URL (overrides the GROQ_BASE_URL environment variable)
    #[clap(long)]
    pub base_url: Option<String>,

    /// Model for the reply (overrides the CODEFORGE_MODEL environment variable)
    #[clap(long)]
    pub model: Option<String>,
}

/// Send one message and return the trimmed reply
pub async fn chat_data(gateway: &Gateway, message: &str) -> Result<String, Error> {
    let reply = gateway
        .complete(CHAT_SYSTEM_PROMPT, message, CHAT_PARAMS)
        .await?;
    Ok(reply.trim().to_string())
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let options = app.options;

    if global.verbose {
        eprintln!("Running chat with options: {:?}", options);
    }

    let config =
        GroqConfig::from_env().with_overrides(options.base_url, options.api_key, options.model);
    let gateway = Gateway::new(&config)?;

    let reply = chat_data(&gateway, &options.message).await?;
    println!("{}", reply);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn test_gateway(base_url: &str) -> Gateway {
        let config = GroqConfig {
            base_url: base_url.to_string(),
            api_key: "test-key".to_string(),
            model: "test-model".to_string(),
        };
        Gateway::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_chat_data_trims_reply() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "messages": [
                    {"role": "system", "content": "You are a helpful assistant."},
                    {"role": "user", "content": "hi"}
                ],
                "max_completion_tokens": 512
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!({
                    "choices": [{"message": {"role": "assistant", "content": "  Hello!  \n"}}]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let gateway = test_gateway(&server.url());
        let reply = chat_data(&gateway, "hi").await.unwrap();

        assert_eq!(reply, "Hello!");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_chat_data_gateway_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(503)
            .with_body("overloaded")
            .create_async()
            .await;

        let gateway = test_gateway(&server.url());
        let err = chat_data(&gateway, "hi").await.unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("503"));
        assert!(msg.contains("overloaded"));
    }
}
