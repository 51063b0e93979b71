use crate::protocol::{Message, PROTOCOL_VERSION};

/// Bidirectional ordered message channel to the peer.
///
/// `recv` must be cancellation safe: the orchestrator races it against other
/// event sources and drops the future when another source wins.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&mut self, msg: Message) -> anyhow::Result<()>;
    async fn recv(&mut self) -> anyhow::Result<Message>;
}

/// Exchange `Hello` messages and check protocol versions. The initiator
/// speaks first. Success is the "connection established" signal.
pub async fn handshake(transport: &mut dyn Transport, initiator: bool) -> anyhow::Result<()> {
    if initiator {
        transport
            .send(Message::Hello {
                version: PROTOCOL_VERSION,
            })
            .await?;
    }

    match transport.recv().await? {
        Message::Hello { version } if version == PROTOCOL_VERSION => {}
        Message::Hello { version } => {
            log::error!(
                "handshake protocol version mismatch: expected {}, peer sent {}",
                PROTOCOL_VERSION,
                version
            );
            return Err(anyhow::anyhow!(
                "Protocol version mismatch in Hello: expected {}, got {}",
                PROTOCOL_VERSION,
                version
            ));
        }
        other => {
            log::error!("expected Hello, got unexpected message: {:?}", other);
            return Err(anyhow::anyhow!(
                "Expected Hello, got unexpected message (closing session)"
            ));
        }
    }

    if !initiator {
        transport
            .send(Message::Hello {
                version: PROTOCOL_VERSION,
            })
            .await?;
    }
    log::info!("handshake complete (protocol v{})", PROTOCOL_VERSION);
    Ok(())
}

pub mod in_memory;
pub mod tcp;
