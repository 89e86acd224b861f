use crate::dto::ActionFrame;
use crate::dto::ClientMessage;
use crate::dto::Protocol;
use crate::dto::ServerMessage;
use crate::dto::codes;
use crate::table::Admission;
use crate::table::PeerId;
use crate::table::Registry;
use crate::table::RoomHandle;
use crate::table::Input;
use actix_ws::CloseCode;
use actix_ws::CloseReason;
use actix_ws::Message;
use actix_ws::MessageStream;
use actix_ws::Session;
use bytes::Bytes;
use bytes::BytesMut;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// first frame must arrive within this window
const HANDSHAKE_DEADLINE: Duration = Duration::from_secs(5);
/// a peer silent for this long is dropped; pings refresh the clock
const READ_DEADLINE: Duration = Duration::from_secs(60);
/// one outbound frame must flush within this window
const WRITE_DEADLINE: Duration = Duration::from_secs(10);

/// Per-connection lifecycle: handshake, then one cooperative pump that
/// bridges the room's outbound queue and the socket's inbound frames.
/// The coordinator is never blocked by this task.
pub async fn serve(registry: Arc<Registry>, mut session: Session, mut stream: MessageStream) {
    let connect = match tokio::time::timeout(HANDSHAKE_DEADLINE, first_frame(&mut stream)).await {
        Err(_) => {
            return refuse(
                session,
                ServerMessage::error(codes::HANDSHAKE_TIMEOUT, "no handshake received"),
            )
            .await;
        }
        Ok(None) => {
            let _ = session.close(None).await;
            return;
        }
        Ok(Some(Err(e))) => {
            return refuse(session, ServerMessage::error(codes::PROTOCOL_ERROR, e.to_string()))
                .await;
        }
        Ok(Some(Ok(frame))) => frame,
    };
    let ClientMessage::Connect {
        name,
        role,
        game,
        auth_token,
    } = connect
    else {
        return refuse(
            session,
            ServerMessage::error(codes::UNEXPECTED_FRAME, "handshake must be a connect record"),
        )
        .await;
    };
    if auth_token.is_some() {
        log::debug!("peer {} presented an auth token", name);
    }
    match registry.admit(game, name.clone(), role).await {
        Err(error) => refuse(session, error).await,
        Ok((handle, admission)) => {
            log::info!("{} connected as {}", name, role);
            pump(handle, admission, session, stream).await;
        }
    }
}

/// skip control frames until the first data frame decodes (or fails to)
async fn first_frame(
    stream: &mut MessageStream,
) -> Option<Result<ClientMessage, crate::dto::ProtocolError>> {
    while let Some(message) = stream.next().await {
        match message {
            Ok(Message::Binary(bytes)) => return Some(Protocol::decode(&bytes)),
            Ok(Message::Text(text)) => return Some(Protocol::decode(text.as_bytes())),
            Ok(Message::Close(_)) | Err(_) => return None,
            _ => continue,
        }
    }
    None
}

/// reader and writer in one select loop, the session's Seated state.
/// Outbound frames reuse one scratch buffer; a closed outbound queue
/// that was not preceded by a terminal frame means the bus evicted us.
async fn pump(handle: RoomHandle, admission: Admission, mut session: Session, mut stream: MessageStream) {
    let Admission { peer, mut outbox } = admission;
    let mut scratch = BytesMut::with_capacity(4096);
    let mut terminal = false;
    let mut idle = Instant::now() + READ_DEADLINE;
    loop {
        tokio::select! {
            biased;
            frame = outbox.recv() => match frame {
                Some(message) => {
                    terminal = is_terminal(&message);
                    let write = session.binary(encode(&mut scratch, &message));
                    match tokio::time::timeout(WRITE_DEADLINE, write).await {
                        Ok(Ok(())) => {}
                        Ok(Err(_)) | Err(_) => break,
                    }
                }
                None => {
                    if !terminal {
                        let eviction = ServerMessage::error(codes::SLOW_CONSUMER, "outbound queue overflow");
                        let _ = session.binary(encode(&mut scratch, &eviction)).await;
                    }
                    let _ = session.close(Some(CloseReason {
                        code: CloseCode::Away,
                        description: None,
                    })).await;
                    let _ = handle.tx.send(Input::Depart(peer));
                    return;
                }
            },
            message = stream.next() => match message {
                Some(Ok(Message::Binary(bytes))) => {
                    idle = Instant::now() + READ_DEADLINE;
                    inbound(&handle, peer, &mut session, &mut scratch, &bytes).await;
                }
                Some(Ok(Message::Text(text))) => {
                    idle = Instant::now() + READ_DEADLINE;
                    inbound(&handle, peer, &mut session, &mut scratch, text.as_bytes()).await;
                }
                Some(Ok(Message::Ping(payload))) => {
                    idle = Instant::now() + READ_DEADLINE;
                    let _ = session.pong(&payload).await;
                }
                Some(Ok(Message::Pong(_))) => {
                    idle = Instant::now() + READ_DEADLINE;
                }
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                _ => {}
            },
            _ = tokio::time::sleep_until(idle) => {
                let _ = session.close(Some(CloseReason {
                    code: CloseCode::Policy,
                    description: Some("read deadline missed".to_string()),
                })).await;
                let _ = handle.tx.send(Input::Depart(peer));
                return;
            }
        }
    }
    let _ = handle.tx.send(Input::Depart(peer));
    let _ = session.close(None).await;
}

/// classify and route one inbound data frame
async fn inbound(
    handle: &RoomHandle,
    peer: PeerId,
    session: &mut Session,
    scratch: &mut BytesMut,
    bytes: &[u8],
) {
    match Protocol::decode(bytes) {
        Ok(ClientMessage::Action { action, amount }) => {
            let _ = handle.tx.send(Input::Frame(peer, ActionFrame::new(action, amount)));
        }
        Ok(ClientMessage::Connect { .. }) => {
            let error = ServerMessage::error(codes::UNEXPECTED_FRAME, "already connected");
            let _ = session.binary(encode(scratch, &error)).await;
        }
        Err(e) => {
            let error = ServerMessage::error(codes::PROTOCOL_ERROR, e.to_string());
            let _ = session.binary(encode(scratch, &error)).await;
        }
    }
}

/// frames whose arrival makes a subsequent queue closure expected
fn is_terminal(message: &ServerMessage) -> bool {
    match message {
        ServerMessage::GameCompleted { .. } => true,
        ServerMessage::Error { code, .. } => {
            code == codes::BUSTED || code == codes::TABLE_CLOSED
        }
        _ => false,
    }
}

/// serialize into the connection's scratch buffer, splitting off one
/// frame; the buffer's allocation is reused across frames
fn encode(scratch: &mut BytesMut, message: &ServerMessage) -> Bytes {
    use bytes::BufMut;
    serde_json::to_writer((&mut *scratch).writer(), message).expect("serialize server frame");
    scratch.split().freeze()
}

/// reject during handshake: one error frame, then close
async fn refuse(mut session: Session, error: ServerMessage) {
    let mut scratch = BytesMut::with_capacity(256);
    let _ = session.binary(encode(&mut scratch, &error)).await;
    let _ = session
        .close(Some(CloseReason {
            code: CloseCode::Policy,
            description: None,
        }))
        .await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scratch_buffer_round_trips_frames() {
        let mut scratch = BytesMut::with_capacity(64);
        let a = encode(&mut scratch, &ServerMessage::error("illegal_action", "x"));
        let b = encode(&mut scratch, &ServerMessage::error("not_your_turn", "y"));
        assert!(serde_json::from_slice::<serde_json::Value>(&a).is_ok());
        assert!(serde_json::from_slice::<serde_json::Value>(&b).is_ok());
        assert_ne!(a, b);
    }

    #[test]
    fn terminal_frames() {
        assert!(is_terminal(&ServerMessage::error(codes::BUSTED, "")));
        assert!(!is_terminal(&ServerMessage::error(codes::ILLEGAL_ACTION, "")));
    }
}
