use crate::config::assistant::AssistantConfig;
use crate::llm::chat::{ AssistantError, ChatClient, CompletionResponse };
use crate::models::websocket::{ ClientMessage, ServerMessage };
use crate::widget::view::UpdateBuffer;
use crate::widget::{ ChatWidget, PendingReply };
use futures::{ Sink, SinkExt, StreamExt };
use log::{ info, warn, error, debug };
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{ AsyncRead, AsyncWrite };
use tokio::sync::mpsc;
use tokio_tungstenite::{ tungstenite::protocol::Message, WebSocketStream };
use uuid::Uuid;

const MAX_MESSAGE_SIZE: usize = 1 * 1024 * 1024;

type ReplyOutcome = (PendingReply, Result<CompletionResponse, AssistantError>);

async fn send_update<W>(tx: &mut W, update: &ServerMessage) -> Result<(), Box<dyn Error + Send + Sync>>
    where W: Sink<Message, Error = tokio_tungstenite::tungstenite::Error> + Unpin
{
    let json = serde_json::to_string(update)?;
    tx.send(Message::Text(json)).await?;
    Ok(())
}

async fn flush<W>(tx: &mut W, view: &mut UpdateBuffer) -> Result<(), Box<dyn Error + Send + Sync>>
    where W: Sink<Message, Error = tokio_tungstenite::tungstenite::Error> + Unpin
{
    for update in view.drain() {
        send_update(tx, &update).await?;
    }
    Ok(())
}

/// Runs the assistant call off the connection task so the session keeps
/// handling events while the reply is pending.
fn spawn_reply(
    pending: PendingReply,
    client: Arc<dyn ChatClient>,
    reply_tx: mpsc::UnboundedSender<ReplyOutcome>
) {
    tokio::spawn(async move {
        let result = client.complete(&pending.prompt).await;
        if reply_tx.send((pending, result)).is_err() {
            debug!("Connection closed before the assistant replied");
        }
    });
}

pub async fn handle_connection<S>(
    peer: SocketAddr,
    websocket: WebSocketStream<S>,
    config: Arc<AssistantConfig>,
    client: Arc<dyn ChatClient>
)
    where S: AsyncRead + AsyncWrite + Unpin
{
    info!("New WebSocket connection: {}", peer);

    let (mut tx, mut rx) = websocket.split();
    let session_id = Uuid::new_v4().to_string();
    info!("Assigned session ID {} to {}", session_id, peer);

    let mut widget = ChatWidget::new(config);
    let mut view = UpdateBuffer::new();
    let (reply_tx, mut reply_rx) = mpsc::unbounded_channel::<ReplyOutcome>();

    widget.setup(&mut view);
    if let Err(e) = flush(&mut tx, &mut view).await {
        error!("Failed to send bindings to {}: {}", peer, e);
        return;
    }

    loop {
        tokio::select! {
            msg = rx.next() => {
                let Some(msg) = msg else {
                    break;
                };
                let message = match msg {
                    Ok(message) => message,
                    Err(e) => {
                        match e {
                            | tokio_tungstenite::tungstenite::Error::ConnectionClosed
                            | tokio_tungstenite::tungstenite::Error::Protocol(_)
                            | tokio_tungstenite::tungstenite::Error::Utf8 => {
                                info!("WebSocket connection closed or protocol error for {}: {}", peer, e);
                            }
                            tokio_tungstenite::tungstenite::Error::Io(ref io_err) if
                                io_err.kind() == std::io::ErrorKind::ConnectionReset
                            => {
                                info!("WebSocket connection reset by peer {}", peer);
                            }
                            _ => {
                                error!("Error receiving message from {}: {}", peer, e);
                            }
                        }
                        break;
                    }
                };

                if message.len() > MAX_MESSAGE_SIZE {
                    warn!(
                        "Message from {} exceeds size limit ({} > {})",
                        peer,
                        message.len(),
                        MAX_MESSAGE_SIZE
                    );
                    let error_msg = ServerMessage::Error {
                        message: "Message too large".to_string(),
                    };
                    if let Err(e) = send_update(&mut tx, &error_msg).await {
                        error!("Failed to send size limit error to {}: {}", peer, e);
                    }
                    break;
                }

                match message {
                    Message::Text(text) => {
                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(ClientMessage::Event { selector, event, key, value }) => {
                                let pending = widget.handle_event(
                                    &selector,
                                    event,
                                    key.as_deref(),
                                    value.as_deref(),
                                    &mut view
                                );
                                if let Some(pending) = pending {
                                    spawn_reply(pending, Arc::clone(&client), reply_tx.clone());
                                }
                            }
                            Ok(ClientMessage::SubmitForm { fields, availability }) => {
                                widget.submit_form(&fields, &availability, &mut view);
                            }
                            Err(e) => {
                                error!("Failed to parse message from {}: {}", peer, e);
                                let error_msg = ServerMessage::Error {
                                    message: format!("Failed to parse message: {}", e),
                                };
                                if let Err(e) = send_update(&mut tx, &error_msg).await {
                                    error!("Error sending parse error to {}: {}", peer, e);
                                    break;
                                }
                            }
                        }
                    }
                    Message::Close(_) => {
                        info!("Received close frame from {}", peer);
                        break;
                    }
                    // tungstenite queues the pong reply itself.
                    Message::Ping(_) | Message::Pong(_) => {}
                    Message::Binary(_) => {
                        warn!("Ignoring binary message from {}", peer);
                    }
                    Message::Frame(_) => {}
                }
            }
            Some((pending, result)) = reply_rx.recv() => {
                widget.finish_reply(&pending, result, &mut view);
            }
        }

        if let Err(e) = flush(&mut tx, &mut view).await {
            error!("Error sending updates to {}: {}", peer, e);
            break;
        }
    }

    info!(
        "WebSocket connection closed for {} (Session ID: {}, {} message(s) in history)",
        peer,
        session_id,
        widget.history().len()
    );
}
