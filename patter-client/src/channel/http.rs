//! Channel implementation against a real chat server.
//!
//! The request side speaks REST via reqwest (`GET /messages`,
//! `POST /send`). The push side is a WebSocket carrying JSON frames with a
//! `{type, payload}` envelope on the `message` topic.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message as WsFrame;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};

use patter_types::{parse_snapshot, Message, PushFrame, SendRequest};

use super::{Channel, ChannelError};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Configuration for [`HttpChannel`].
#[derive(Debug, Clone)]
pub struct HttpChannelConfig {
    /// Base URL of the server, e.g. `http://localhost:5000`.
    pub server_url: String,
    /// Push endpoint override. When unset, derived from `server_url` by
    /// swapping the scheme to WebSocket and appending `/socket`.
    pub push_url: Option<String>,
}

impl HttpChannelConfig {
    /// Create a configuration for the given server base URL.
    pub fn new(server_url: &str) -> Self {
        Self {
            server_url: server_url.trim_end_matches('/').to_string(),
            push_url: None,
        }
    }

    /// Override the push endpoint URL.
    pub fn with_push_url(mut self, url: &str) -> Self {
        self.push_url = Some(url.to_string());
        self
    }

    /// The effective push endpoint URL.
    pub fn push_url(&self) -> String {
        match &self.push_url {
            Some(url) => url.clone(),
            // http -> ws, https -> wss
            None => format!("{}/socket", self.server_url.replacen("http", "ws", 1)),
        }
    }
}

/// Channel backed by HTTP requests and a WebSocket push subscription.
pub struct HttpChannel {
    config: HttpChannelConfig,
    http: reqwest::Client,
    open: AtomicBool,
    reader: Mutex<Option<SplitStream<WsStream>>>,
    writer: Mutex<Option<SplitSink<WsStream, WsFrame>>>,
}

impl HttpChannel {
    /// Create a new channel. No connection is made until [`Channel::open`].
    pub fn new(config: HttpChannelConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
            open: AtomicBool::new(false),
            reader: Mutex::new(None),
            writer: Mutex::new(None),
        }
    }

    /// The channel configuration.
    pub fn config(&self) -> &HttpChannelConfig {
        &self.config
    }
}

#[async_trait]
impl Channel for HttpChannel {
    async fn open(&self) -> Result<(), ChannelError> {
        let url = self.config.push_url();
        debug!("opening push subscription to {}", url);

        let (stream, _response) = connect_async(url.as_str())
            .await
            .map_err(|e| ChannelError::ConnectionFailed(e.to_string()))?;
        let (writer, reader) = stream.split();

        *self.reader.lock().await = Some(reader);
        *self.writer.lock().await = Some(writer);
        self.open.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&self) -> Result<(), ChannelError> {
        self.open.store(false, Ordering::SeqCst);
        if let Some(mut writer) = self.writer.lock().await.take() {
            if let Err(e) = writer.close().await {
                debug!("push socket close: {}", e);
            }
        }
        self.reader.lock().await.take();
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    async fn request_snapshot(&self) -> Result<Vec<Option<Message>>, ChannelError> {
        let url = format!("{}/messages", self.config.server_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ChannelError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChannelError::Rejected {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ChannelError::RequestFailed(e.to_string()))?;
        Ok(parse_snapshot(&body)?)
    }

    async fn submit(&self, request: &SendRequest) -> Result<(), ChannelError> {
        let url = format!("{}/send", self.config.server_url);
        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| ChannelError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ChannelError::Rejected {
                status: status.as_u16(),
            })
        }
    }

    async fn next_event(&self) -> Result<Option<Message>, ChannelError> {
        let mut guard = self.reader.lock().await;
        let reader = guard.as_mut().ok_or(ChannelError::NotConnected)?;

        loop {
            match reader.next().await {
                Some(Ok(WsFrame::Text(raw))) => match PushFrame::parse(&raw) {
                    Ok(PushFrame::Message(event)) => return Ok(event),
                    Err(e) => {
                        // Undecodable frames carry no display value.
                        debug!("discarding undecodable push frame: {}", e);
                    }
                },
                Some(Ok(WsFrame::Close(_))) | None => {
                    self.open.store(false, Ordering::SeqCst);
                    return Err(ChannelError::ConnectionClosed);
                }
                // Ping/pong and binary frames carry no events
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!("push socket error: {}", e);
                    return Err(ChannelError::ReceiveFailed(e.to_string()));
                }
            }
        }
    }
}
