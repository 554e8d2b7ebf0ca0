use reddit_client::{RedditClient, RedditOAuth2Config};
use relaybot_core::BotConfig;
use std::env;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let config_path = env::args().nth(1).unwrap_or_else(|| "bot.yml".to_string());
    println!("=== Reddit Listing Fetch ({}) ===\n", config_path);

    let bot_config = BotConfig::load(&config_path)?;
    let mut client = RedditClient::new(RedditOAuth2Config::from_bot_config(&bot_config))?;

    client.ensure_authenticated().await?;
    println!("Authentication state: {:?}\n", client.get_auth_state());

    for subreddit in &bot_config.subreddits {
        match client.fetch_listing(subreddit).await {
            Ok(items) => {
                println!("r/{}: {} items", subreddit, items.len());
                for item in items.iter().take(5) {
                    println!(
                        "   [{}] {} ({}, score {}, nsfw {}, self {})",
                        item.id, item.title, item.domain, item.score, item.is_adult, item.is_self_post
                    );
                }
            }
            Err(e) => println!("r/{}: failed: {}", subreddit, e),
        }
    }

    match client.needs_captcha().await {
        Ok(needed) => println!("\nCaptcha required for submissions: {}", needed),
        Err(e) => println!("\nCould not check captcha requirement: {}", e),
    }

    Ok(())
}
