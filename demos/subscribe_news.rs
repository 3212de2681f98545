use std::error::Error;

use newswire_sdk::client::FeedClient;
use newswire_sdk::feed::NewsFeed;
use tracing_subscriber::EnvFilter;

const ENDPOINT: &str = "ws://localhost:3000";
const ROOM: &str = "secret_announcements";

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let client = FeedClient::new(ENDPOINT);
        let mut feed = NewsFeed::subscribe(&client, ROOM).await?;
        println!("joined room {}", feed.room());

        // recv logs each delivery verbatim; drain until the server closes.
        while feed.recv().await.is_some() {}

        Ok::<(), Box<dyn Error>>(())
    })
}
