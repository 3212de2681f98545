use std::error::Error;

use newswire_sdk::client::{FeedClient, JoinRequest};
use newswire_sdk::proto::ServerMessage;

fn main() -> Result<(), Box<dyn Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let client = FeedClient::new("ws://localhost:3000");
        let mut connection = client
            .connect(JoinRequest::new("secret_announcements"))
            .await?;

        while let Some(message) = connection.recv().await {
            match message {
                ServerMessage::News(payload) => println!("news {payload}"),
                ServerMessage::NewsBacklog(payload) => println!("news_backlog {payload}"),
            }
        }

        Ok::<(), Box<dyn Error>>(())
    })
}
