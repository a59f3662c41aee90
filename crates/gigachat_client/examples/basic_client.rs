use gigachat_client::{
    GigaChatApi, config::GigaChatConfig, http_client::ReqwestGigaChatClient, retry::RetryPolicy,
    token::TokenCache,
};
use std::sync::Arc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Example: expects GIGACHAT_CLIENT_ID and GIGACHAT_CLIENT_SECRET in env
    let cfg = match GigaChatConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("config error: {}", e);
            return Ok(());
        }
    };
    let client = Arc::new(ReqwestGigaChatClient::new(cfg));
    let tokens = TokenCache::new(client.clone(), RetryPolicy::default());

    let token = tokens.get().await?;
    let text = client
        .complete(&token, "Suggest one healthy breakfast in a single line.")
        .await?;
    println!("{}", text);
    Ok(())
}
