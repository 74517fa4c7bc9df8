//! Basic usage example for the command bridge
//!
//! Drives a full session and conference round trip over the no-op
//! engine and prints every reply the bridge delivers.

use std::sync::Arc;

use confbridge::{Bridge, BridgeConfig, ChannelSink, Command, CredentialSource, NullEngine};
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let (sink, mut replies) = ChannelSink::channel();
    let config = BridgeConfig::from_sources(
        &CredentialSource::new("demo-key", "demo-secret"),
        &CredentialSource::empty(),
    );
    let bridge = Bridge::with_config(Arc::new(NullEngine::new()), Arc::new(sink), config);

    println!("🔌 Bridge started ({})", bridge.instance_id());

    let participant = json!({
        "externalId": "alice",
        "name": "Alice",
        "avatarUrl": "https://example.com/alice.png"
    });
    bridge.submit(Command::with_args("connect", vec![participant], "connect-1"))?;

    let options = json!({
        "alias": "demo-room",
        "params": { "ttl": 600, "videoCodec": "H264", "liveRecording": false }
    });
    bridge.submit(Command::with_args("create", vec![options], "create-1"))?;
    bridge.submit(Command::with_args(
        "join",
        vec![json!("demo-room"), json!({ "alias": "demo-room", "user": { "type": "user" } })],
        "join-1",
    ))?;
    bridge.submit(Command::new("startVideo", "video-1"))?;
    bridge.submit(Command::new("isUserLoggedIn", "query-1"))?;
    bridge.submit(Command::new("leave", "leave-1"))?;
    bridge.submit(Command::new("disconnect", "disconnect-1"))?;

    for _ in 0..7 {
        if let Some(reply) = replies.next().await {
            println!(
                "📨 {} -> {:?} {}",
                reply.callback_id,
                reply.status,
                reply
                    .payload
                    .map(|payload| payload.to_string())
                    .unwrap_or_default()
            );
        }
    }

    bridge.shutdown().await;
    println!("✅ Done");
    Ok(())
}
