use crate::api::status::PushAPI;
use async_trait::async_trait;
use dg_sync_core::config::BackendConfig;
use dg_sync_core::status::{ChainSyncState, StatusTopic, WalletSyncState};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, trace};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::io::{Error, ErrorKind};
use std::str::FromStr;
use tokio::net::TcpStream;
use tokio::select;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{HeaderName, HeaderValue};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use uuid::Uuid;

const PUSH_BUFFER: usize = 64;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscribeRequest {
    pub command: String,
    pub topic: StatusTopic,
    pub request_id: Uuid,
    pub data: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushMessage {
    pub topic: String,
    pub data: Value,
}

/// A live push subscription to one topic.
///
/// Entities are read with [`PushSubscription::recv`]; `None` means the backend ended the
/// stream. Releasing the subscription, either through [`PushSubscription::unsubscribe`] or
/// by dropping it, signals the owner of the underlying stream to close it.
pub struct PushSubscription<T> {
    pub id: Uuid,
    pub topic: StatusTopic,
    receiver: mpsc::Receiver<T>,
    release: Option<oneshot::Sender<()>>,
}
impl<T> PushSubscription<T> {
    pub fn new(
        topic: StatusTopic,
        receiver: mpsc::Receiver<T>,
        release: oneshot::Sender<()>,
    ) -> Self {
        PushSubscription {
            id: Uuid::new_v4(),
            topic,
            receiver,
            release: Some(release),
        }
    }
    pub async fn recv(&mut self) -> Option<T> {
        self.receiver.recv().await
    }
    pub fn is_released(&self) -> bool {
        self.release.is_none()
    }
    pub fn unsubscribe(mut self) {
        info!("Releasing {} subscription {}", self.topic, self.id);
        self.release_now();
    }
    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            let _ = release.send(());
        }
        self.receiver.close();
    }
}
impl<T> Drop for PushSubscription<T> {
    fn drop(&mut self) {
        self.release_now();
    }
}

pub struct PushClient {
    pub host: String,
    pub port: u16,
    pub use_tls: bool,
    pub additional_headers: Option<HashMap<String, String>>,
}
impl PushClient {
    pub fn new(
        host: &str,
        port: u16,
        use_tls: bool,
        additional_headers: &Option<HashMap<String, String>>,
    ) -> Self {
        PushClient {
            host: host.to_string(),
            port,
            use_tls,
            additional_headers: additional_headers.clone(),
        }
    }

    pub fn from_config(config: &BackendConfig) -> Self {
        Self::new(
            &config.hostname,
            config.ws_port,
            config.use_tls,
            &config.additional_headers,
        )
    }

    async fn connect(&self) -> Result<WsStream, Error> {
        let mut request = format!(
            "{}://{}:{}/ws",
            if self.use_tls { "wss" } else { "ws" },
            self.host,
            self.port
        )
        .into_client_request()
        .map_err(|e| {
            Error::new(
                ErrorKind::InvalidData,
                format!("Failed to Parse Request: {}", e),
            )
        })?;
        if let Some(m) = &self.additional_headers {
            for (k, v) in m {
                request.headers_mut().insert(
                    HeaderName::from_str(k).map_err(|e| {
                        Error::new(
                            ErrorKind::InvalidData,
                            format!("Failed to Parse Header Name {},\r\n {}", k, e),
                        )
                    })?,
                    HeaderValue::from_str(v).map_err(|e| {
                        Error::new(
                            ErrorKind::InvalidData,
                            format!("Failed to Parse Header value {},\r\n {}", v, e),
                        )
                    })?,
                );
            }
        }
        let (stream, resp) = connect_async(request).await.map_err(|e| {
            Error::new(
                ErrorKind::ConnectionRefused,
                format!("Error Connecting Client: {:?}", e),
            )
        })?;
        debug!("Client Connect Resp: {:?}", resp);
        Ok(stream)
    }

    pub async fn subscribe<T>(
        &self,
        topic: StatusTopic,
        data: Value,
    ) -> Result<PushSubscription<T>, Error>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let stream = self.connect().await?;
        let (mut write, read) = stream.split();
        let request = SubscribeRequest {
            command: String::from("subscribe"),
            topic,
            request_id: Uuid::new_v4(),
            data,
        };
        let payload = serde_json::to_string(&request)
            .map_err(|e| Error::new(ErrorKind::InvalidData, format!("{:?}", e)))?;
        write
            .send(Message::Text(payload))
            .await
            .map_err(|e| Error::new(ErrorKind::Other, e))?;
        let (sender, receiver) = mpsc::channel(PUSH_BUFFER);
        let (release_tx, release_rx) = oneshot::channel();
        tokio::spawn(forward_messages(topic, write, read, sender, release_rx));
        info!("Subscribed to {topic} on {}:{}", self.host, self.port);
        Ok(PushSubscription::new(topic, receiver, release_tx))
    }
}

#[async_trait]
impl PushAPI for PushClient {
    async fn subscribe_chain_status(&self) -> Result<PushSubscription<ChainSyncState>, Error> {
        self.subscribe(StatusTopic::Chain, json!({})).await
    }
    async fn subscribe_wallet_sync_status(
        &self,
        wallet_id: &str,
    ) -> Result<PushSubscription<WalletSyncState>, Error> {
        self.subscribe(StatusTopic::WalletSync, json!({ "wallet_id": wallet_id }))
            .await
    }
}

pub fn decode_push<T: DeserializeOwned>(topic: StatusTopic, text: &str) -> Result<Option<T>, Error> {
    let msg: PushMessage = serde_json::from_str(text).map_err(|e| {
        Error::new(
            ErrorKind::InvalidData,
            format!("Invalid Push Message {},\r\n {}", text, e),
        )
    })?;
    if msg.topic != topic.as_str() {
        return Ok(None);
    }
    serde_json::from_value(msg.data)
        .map(Some)
        .map_err(|e| Error::new(ErrorKind::InvalidData, format!("Invalid {topic} data: {e}")))
}

async fn forward_messages<T>(
    topic: StatusTopic,
    mut write: SplitSink<WsStream, Message>,
    mut read: SplitStream<WsStream>,
    sender: mpsc::Sender<T>,
    mut release: oneshot::Receiver<()>,
) where
    T: DeserializeOwned + Send + 'static,
{
    loop {
        select! {
            _ = &mut release => {
                debug!("Closing {topic} push stream");
                let _ = write.send(Message::Close(None)).await;
                let _ = write.close().await;
                return;
            }
            msg = read.next() => {
                let text = match msg {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Binary(bin_data))) => match String::from_utf8(bin_data) {
                        Ok(text) => text,
                        Err(e) => {
                            error!("Invalid Message on {topic}: {:?}", e);
                            continue;
                        }
                    },
                    Some(Ok(Message::Close(reason))) => {
                        info!("Received Close on {topic}: {:?}", reason);
                        return;
                    }
                    Some(Ok(other)) => {
                        trace!("Ignoring frame on {topic}: {:?}", other);
                        continue;
                    }
                    Some(Err(e)) => {
                        info!("Client Stream Error on {topic}: {:?}", e);
                        return;
                    }
                    None => {
                        info!("End of {topic} read Stream");
                        return;
                    }
                };
                match decode_push::<T>(topic, &text) {
                    Ok(Some(entity)) => {
                        if sender.send(entity).await.is_err() {
                            debug!("{topic} subscriber dropped, closing stream");
                            let _ = write.close().await;
                            return;
                        }
                    }
                    Ok(None) => trace!("Skipping message for another topic on {topic}"),
                    Err(e) => error!("{e}"),
                }
            }
        }
    }
}
