//! Per-connection live feed.
//!
//! Pushes the subscriber's task events as [`FeedMessage`] frames and keeps
//! the connection alive with pings. The feed pings every 5s and drops a
//! client that has been silent for 10s; tests shorten both intervals.

use std::time::{Duration, Instant};

use actix_ws::{CloseCode, CloseReason, Closed, Message, MessageStream, ProtocolError, Session};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time;
use tracing::{debug, warn};

use crate::domain::{TaskEvent, UserId};
use crate::inbound::ws::messages::FeedMessage;

#[cfg(not(test))]
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
#[cfg(test)]
const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(50);

#[cfg(not(test))]
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);
#[cfg(test)]
const CLIENT_TIMEOUT: Duration = Duration::from_millis(100);

pub(super) async fn run_feed(
    subscriber: UserId,
    events: broadcast::Receiver<TaskEvent>,
    session: Session,
    stream: MessageStream,
) {
    debug!(user_id = %subscriber, "live feed opened");
    FeedSession { subscriber, events }.run(session, stream).await;
    debug!(user_id = %subscriber, "live feed closed");
}

enum SessionError {
    ClientClosed(Option<CloseReason>),
    StreamClosed,
    HeartbeatTimeout,
    Protocol(ProtocolError),
    HubClosed,
    Network(Closed),
}

enum CloseAction {
    None,
    Close(Option<CloseReason>),
}

struct FeedSession {
    subscriber: UserId,
    events: broadcast::Receiver<TaskEvent>,
}

impl FeedSession {
    async fn run(mut self, mut session: Session, mut stream: MessageStream) {
        let mut last_heartbeat = Instant::now();
        let mut heartbeat = time::interval(HEARTBEAT_INTERVAL);

        loop {
            let result = tokio::select! {
                _ = heartbeat.tick() => {
                    handle_heartbeat_tick(&mut session, last_heartbeat).await
                }
                message = stream.recv() => {
                    handle_stream_message(&mut session, &mut last_heartbeat, message).await
                }
                event = self.events.recv() => {
                    self.handle_event(&mut session, event).await
                }
            };

            if let Err(error) = result {
                log_shutdown_reason(&self.subscriber, &error);
                close_session_if_needed(session, close_action_for(error)).await;
                return;
            }
        }
    }

    async fn handle_event(
        &self,
        session: &mut Session,
        event: Result<TaskEvent, RecvError>,
    ) -> Result<(), SessionError> {
        let message = match event {
            Ok(event) => match FeedMessage::for_subscriber(event, &self.subscriber) {
                Some(message) => message,
                None => return Ok(()),
            },
            Err(RecvError::Lagged(missed)) => {
                warn!(user_id = %self.subscriber, missed, "live feed lagged; asking client to resync");
                FeedMessage::Resync { missed }
            }
            Err(RecvError::Closed) => return Err(SessionError::HubClosed),
        };
        send_json(session, &message)
            .await
            .map_err(SessionError::Network)
    }
}

async fn handle_heartbeat_tick(
    session: &mut Session,
    last_heartbeat: Instant,
) -> Result<(), SessionError> {
    if last_heartbeat.elapsed() > CLIENT_TIMEOUT {
        return Err(SessionError::HeartbeatTimeout);
    }
    session.ping(b"").await.map_err(SessionError::Network)
}

async fn handle_stream_message(
    session: &mut Session,
    last_heartbeat: &mut Instant,
    message: Option<Result<Message, ProtocolError>>,
) -> Result<(), SessionError> {
    let Some(message) = message else {
        return Err(SessionError::StreamClosed);
    };
    match message.map_err(SessionError::Protocol)? {
        Message::Ping(payload) => {
            *last_heartbeat = Instant::now();
            session.pong(&payload).await.map_err(SessionError::Network)
        }
        // The feed is push-only; anything else the client sends is activity.
        Message::Text(_)
        | Message::Pong(_)
        | Message::Binary(_)
        | Message::Continuation(_)
        | Message::Nop => {
            *last_heartbeat = Instant::now();
            Ok(())
        }
        Message::Close(reason) => Err(SessionError::ClientClosed(reason)),
    }
}

async fn send_json(session: &mut Session, payload: &FeedMessage) -> Result<(), Closed> {
    match serde_json::to_string(payload) {
        Ok(body) => session.text(body).await,
        Err(error) => {
            warn!(error = %error, "failed to serialise live feed frame");
            Ok(())
        }
    }
}

fn log_shutdown_reason(subscriber: &UserId, error: &SessionError) {
    match error {
        SessionError::HeartbeatTimeout => {
            warn!(user_id = %subscriber, "live feed heartbeat timeout; closing connection");
        }
        SessionError::Protocol(error) => {
            warn!(user_id = %subscriber, error = %error, "live feed protocol error");
        }
        SessionError::Network(error) => {
            warn!(user_id = %subscriber, error = %error, "live feed send failed; closing connection");
        }
        SessionError::HubClosed => {
            warn!(user_id = %subscriber, "task event hub closed; ending live feed");
        }
        SessionError::ClientClosed(_) | SessionError::StreamClosed => {}
    }
}

fn close_action_for(error: SessionError) -> CloseAction {
    match error {
        SessionError::HeartbeatTimeout => CloseAction::Close(Some(CloseReason {
            code: CloseCode::Normal,
            description: Some("heartbeat timeout".to_owned()),
        })),
        SessionError::Protocol(_) => CloseAction::Close(Some(CloseReason {
            code: CloseCode::Protocol,
            description: Some("protocol error".to_owned()),
        })),
        SessionError::HubClosed => CloseAction::Close(Some(CloseReason {
            code: CloseCode::Away,
            description: Some("server shutting down".to_owned()),
        })),
        SessionError::ClientClosed(reason) => CloseAction::Close(reason),
        SessionError::StreamClosed | SessionError::Network(_) => CloseAction::None,
    }
}

async fn close_session_if_needed(session: Session, close_action: CloseAction) {
    if let CloseAction::Close(reason) = close_action {
        if let Err(error) = session.close(reason).await {
            warn!(error = %error, "failed to close live feed session");
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
