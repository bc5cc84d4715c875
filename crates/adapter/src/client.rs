//! Connection manager for the upstream gateway.
//!
//! Holds exactly one persistent WebSocket connection and runs the receive
//! loop: decode each text frame, filter out non-event frames, build the
//! typed event, route it. Decode and build failures are logged and skipped;
//! only transport failures end the run.

use {
    futures_util::StreamExt,
    http::header::{AUTHORIZATION, HeaderValue},
    tokio_tungstenite::{
        connect_async,
        tungstenite::{client::IntoClientRequest, protocol::Message},
    },
    tracing::{debug, error, info, warn},
};

use crate::{error::AdapterError, event::build_event, router::EventRouter};

/// Bridges the upstream gateway to the registered event handlers.
pub struct BotAdapter {
    url: String,
    token: String,
    router: EventRouter,
}

impl BotAdapter {
    /// The router is fixed at construction; it is read-only once the
    /// receive loop starts.
    pub fn new(url: impl Into<String>, token: impl Into<String>, router: EventRouter) -> Self {
        Self {
            url: url.into(),
            token: token.into(),
            router,
        }
    }

    /// Connect and process frames until the peer closes the connection.
    ///
    /// Returns `Ok(())` on a clean close. A failed handshake or a mid-stream
    /// transport error is fatal and propagates; restarting is the caller's
    /// (or the process supervisor's) job, not this adapter's.
    pub async fn run(&self) -> Result<(), AdapterError> {
        info!(url = %self.url, "connecting to gateway");

        let mut request = self
            .url
            .as_str()
            .into_client_request()
            .map_err(AdapterError::Connect)?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.token))?;
        request.headers_mut().insert(AUTHORIZATION, bearer);

        let (ws, _response) = connect_async(request)
            .await
            .map_err(AdapterError::Connect)?;
        info!("connected to gateway");

        let (_write, mut read) = ws.split();

        while let Some(frame) = read.next().await {
            match frame.map_err(AdapterError::Transport)? {
                Message::Text(text) => self.process_frame(text.as_str()).await,
                Message::Binary(_) => {
                    warn!("discarding binary frame; not a supported event transport");
                },
                Message::Ping(_) | Message::Pong(_) => {},
                Message::Close(frame) => {
                    info!(frame = ?frame, "gateway closed the connection");
                    break;
                },
                Message::Frame(_) => {},
            }
        }

        Ok(())
    }

    /// Handle one text frame. Never fails: every decode problem is logged
    /// with the raw frame for diagnosing upstream schema drift, then
    /// swallowed so the loop survives.
    async fn process_frame(&self, raw: &str) {
        debug!(raw, "received frame");

        let wire: serde_json::Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => {
                error!(error = %e, raw, "frame is not valid JSON");
                return;
            },
        };

        // Heartbeats, acks and other non-message frames have no
        // message_type; they are expected, not errors.
        if wire.get("message_type").is_none() {
            debug!("ignoring non-event frame");
            return;
        }

        let event = match build_event(&wire) {
            Ok(event) => event,
            Err(e) => {
                error!(error = %e, raw, "failed to build event from frame");
                return;
            },
        };

        self.router.route(&event).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use {
        async_trait::async_trait,
        futures_util::SinkExt,
        tokio::sync::Mutex,
        tokio_tungstenite::tungstenite::handshake::server::{Request, Response},
    };

    use super::*;
    use crate::{event::MessageEvent, router::EventHandler};

    const SCENARIO_PRIVATE: &str = r#"{"message_id":1,"message_type":"private","sender":{"user_id":42,"nickname":"n","card":"c"},"message":[{"type":"text","data":{"text":"hi"}}]}"#;
    const SCENARIO_GROUP: &str = r#"{"message_id":3,"message_type":"group","sender":{"user_id":7,"nickname":"g","card":""},"message":[{"type":"at","data":{"qq":42}},{"type":"text","data":{"text":"pong"}}]}"#;
    const SCENARIO_BAD_SEGMENT: &str = r#"{"message_id":2,"message_type":"group","sender":{"user_id":7,"nickname":"g","card":""},"message":[{"type":"bogus","data":{}}]}"#;

    type Seen = Arc<Mutex<Vec<(String, i64, String)>>>;

    struct Recorder(Seen);

    #[async_trait]
    impl EventHandler for Recorder {
        async fn handle(&self, event: &MessageEvent) {
            let rendered = event
                .segments
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" ");
            self.0.lock().await.push((
                event.message_type.to_string(),
                event.message_id,
                rendered,
            ));
        }
    }

    fn recording_router(seen: &Seen) -> EventRouter {
        let mut router = EventRouter::new();
        router.register("private", Box::new(Recorder(Arc::clone(seen))));
        router.register("group", Box::new(Recorder(Arc::clone(seen))));
        router
    }

    #[tokio::test]
    async fn bad_frames_are_skipped_and_the_loop_survives() {
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let adapter = BotAdapter::new("ws://unused", "", recording_router(&seen));

        adapter.process_frame("{not json").await;
        adapter.process_frame(r#"{"type":"heartbeat"}"#).await;
        adapter.process_frame(SCENARIO_BAD_SEGMENT).await;
        adapter.process_frame(SCENARIO_PRIVATE).await;

        let seen = seen.lock().await;
        assert_eq!(*seen, vec![("private".to_string(), 1, "hi".to_string())]);
    }

    #[tokio::test]
    async fn bridges_frames_from_a_live_socket_in_order() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            ws.send(Message::text(r#"{"type":"heartbeat"}"#))
                .await
                .unwrap();
            ws.send(Message::text(SCENARIO_PRIVATE)).await.unwrap();
            ws.send(Message::text("{not json")).await.unwrap();
            ws.send(Message::text(SCENARIO_BAD_SEGMENT)).await.unwrap();
            ws.send(Message::text(SCENARIO_GROUP)).await.unwrap();
            ws.close(None).await.unwrap();
            // Drain until the client goes away so the close completes.
            while ws.next().await.is_some() {}
        });

        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let adapter = BotAdapter::new(format!("ws://{addr}"), "secret", recording_router(&seen));
        adapter.run().await.unwrap();
        server.await.unwrap();

        let seen = seen.lock().await;
        assert_eq!(
            *seen,
            vec![
                ("private".to_string(), 1, "hi".to_string()),
                ("group".to_string(), 3, "@42 pong".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn sends_bearer_token_during_handshake() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let check = |req: &Request, resp: Response| {
                let auth = req
                    .headers()
                    .get("authorization")
                    .and_then(|v| v.to_str().ok());
                assert_eq!(auth, Some("Bearer sekrit"));
                Ok(resp)
            };
            let mut ws = tokio_tungstenite::accept_hdr_async(stream, check)
                .await
                .unwrap();
            ws.close(None).await.unwrap();
            while ws.next().await.is_some() {}
        });

        let adapter = BotAdapter::new(format!("ws://{addr}"), "sekrit", EventRouter::new());
        adapter.run().await.unwrap();
        server.await.unwrap();
    }

    #[tokio::test]
    async fn failed_handshake_is_fatal() {
        // Bind then drop to find a port nothing is listening on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let adapter = BotAdapter::new(format!("ws://{addr}"), "t", EventRouter::new());
        let err = adapter.run().await.unwrap_err();
        assert!(matches!(err, AdapterError::Connect(_)));
    }
}
