pub mod models;
pub mod server;
pub mod websocket;
pub mod config;
pub mod llm;
pub mod cli;
pub mod history;
pub mod widget;

use cli::Args;
use config::assistant::initialize_assistant_config;
use llm::LlmConfig;
use llm::chat::{ new_client as new_chat_client, ChatClient };
use log::info;
use server::Server;
use std::error::Error;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Chat Model: {}", args.chat_model.as_deref().unwrap_or("client default"));
    info!("Chat Base URL: {}", args.chat_base_url.as_deref().unwrap_or("client default"));
    info!("Chat Max Tokens: {}", args.chat_max_tokens);
    info!(
        "Assistant Config: {}",
        args.assistant_config_path.as_deref().unwrap_or("built-in defaults")
    );
    info!("TLS Enabled: {}", args.enable_tls);
    info!("-------------------------");

    let assistant_config = initialize_assistant_config(args.assistant_config_path.as_deref())?;

    let chat_api_key = if !args.chat_api_key.is_empty() {
        Some(args.chat_api_key.clone())
    } else {
        None
    };
    let chat_config = LlmConfig {
        api_key: chat_api_key,
        completion_model: args.chat_model.clone(),
        base_url: args.chat_base_url.clone(),
        max_tokens: args.chat_max_tokens,
    };
    let chat_client = new_chat_client(&chat_config)?;
    info!(
        "Chat client configured: Model={}, BaseURL={:?}",
        chat_client.get_model(),
        chat_client.get_base_url()
    );

    let addr = args.server_addr.clone();
    info!("Starting server on: {}", addr);
    let server = Server::new(addr, assistant_config, chat_client, args.clone());
    server.run().await?;

    Ok(())
}
