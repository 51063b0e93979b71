use snowfort::{handshake, Message, ShotResult, TcpTransport, Transport, PROTOCOL_VERSION};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{sleep, timeout, Duration};

async fn pair() -> anyhow::Result<(TcpTransport, TcpStream)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let client = TcpStream::connect(addr).await?;
    let (server, _) = listener.accept().await?;
    Ok((TcpTransport::new(server), client))
}

fn frame(msg: &Message) -> Vec<u8> {
    let body = bincode::serialize(msg).unwrap();
    let mut out = (body.len() as u32).to_be_bytes().to_vec();
    out.extend_from_slice(&body);
    out
}

#[tokio::test]
async fn test_messages_round_trip_in_order() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await?;
        let mut transport = TcpTransport::new(socket);
        handshake(&mut transport, true).await?;
        let mut seen = Vec::new();
        for _ in 0..3 {
            seen.push(transport.recv().await?);
        }
        Ok::<_, anyhow::Error>(seen)
    });

    let mut client = TcpTransport::connect(addr).await?;
    handshake(&mut client, false).await?;
    let sent = vec![
        Message::Ready,
        Message::Fire { row: 3, col: 4 },
        Message::Result {
            row: 3,
            col: 4,
            result: ShotResult::Sunk,
            sunk_name: Some("Scout Worm".to_string()),
        },
    ];
    for msg in sent.iter().cloned() {
        client.send(msg).await?;
    }

    let seen = server.await??;
    assert_eq!(seen, sent);
    Ok(())
}

#[tokio::test]
async fn test_frame_split_across_writes() -> anyhow::Result<()> {
    let (mut transport, mut raw) = pair().await?;
    let bytes = frame(&Message::Fire { row: 9, col: 0 });

    let writer = tokio::spawn(async move {
        for chunk in bytes.chunks(3) {
            raw.write_all(chunk).await?;
            raw.flush().await?;
            sleep(Duration::from_millis(5)).await;
        }
        Ok::<_, std::io::Error>(raw)
    });

    // Keep abandoning `recv` midway; buffered bytes must survive.
    let msg = loop {
        match timeout(Duration::from_millis(2), transport.recv()).await {
            Ok(msg) => break msg?,
            Err(_) => continue,
        }
    };
    assert_eq!(msg, Message::Fire { row: 9, col: 0 });
    let _raw = writer.await??;
    Ok(())
}

#[tokio::test]
async fn test_zero_length_frame_rejected() -> anyhow::Result<()> {
    let (mut transport, mut raw) = pair().await?;
    raw.write_all(&0u32.to_be_bytes()).await?;
    let err = transport.recv().await.unwrap_err();
    assert!(err.to_string().contains("Invalid message length"));
    Ok(())
}

#[tokio::test]
async fn test_oversized_frame_rejected() -> anyhow::Result<()> {
    let (mut transport, mut raw) = pair().await?;
    raw.write_all(&(10 * 1024 * 1024u32).to_be_bytes()).await?;
    let err = transport.recv().await.unwrap_err();
    assert!(err.to_string().contains("too large"));
    Ok(())
}

#[tokio::test]
async fn test_garbage_body_rejected() -> anyhow::Result<()> {
    let (mut transport, mut raw) = pair().await?;
    raw.write_all(&4u32.to_be_bytes()).await?;
    raw.write_all(&[0xff, 0xff, 0xff, 0xff]).await?;
    let err = transport.recv().await.unwrap_err();
    assert!(err.to_string().contains("Deserialization"));
    Ok(())
}

#[tokio::test]
async fn test_peer_close_surfaces_error() -> anyhow::Result<()> {
    let (mut transport, raw) = pair().await?;
    drop(raw);
    let err = transport.recv().await.unwrap_err();
    assert!(err.to_string().contains("closed"));
    Ok(())
}

#[tokio::test]
async fn test_handshake_version_mismatch() -> anyhow::Result<()> {
    let (mut transport, mut raw) = pair().await?;
    raw.write_all(&frame(&Message::Hello {
        version: PROTOCOL_VERSION + 1,
    }))
    .await?;
    let err = handshake(&mut transport, false).await.unwrap_err();
    assert!(err.to_string().contains("version mismatch"));
    Ok(())
}

#[tokio::test]
async fn test_handshake_rejects_other_messages() -> anyhow::Result<()> {
    let (mut transport, mut raw) = pair().await?;
    raw.write_all(&frame(&Message::Ready)).await?;
    let err = handshake(&mut transport, false).await.unwrap_err();
    assert!(err.to_string().contains("Expected Hello"));
    Ok(())
}
