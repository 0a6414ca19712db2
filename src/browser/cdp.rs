use crate::error::{Result, SignupError};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::{
    connect_async, tungstenite::Message as WsMessage, MaybeTlsStream, WebSocketStream,
};

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, WsMessage>;
type PendingResponses = Arc<Mutex<HashMap<u32, oneshot::Sender<Value>>>>;

/// Raw WebSocket connection to a single CDP page target.
pub struct CdpClient {
    ws_tx: Mutex<WsSink>,
    /// Waiters keyed by command id, completed by the reader task
    responses: PendingResponses,
    msg_id: AtomicU32,
    command_timeout: Duration,
    reader: JoinHandle<()>,
}

impl CdpClient {
    /// Connect to a target's `webSocketDebuggerUrl`.
    pub async fn connect(ws_url: &str, command_timeout: Duration) -> Result<Self> {
        let (ws_stream, _) = connect_async(ws_url).await?;
        let (tx, mut rx) = ws_stream.split();

        let responses: PendingResponses = Arc::new(Mutex::new(HashMap::new()));
        let routed = Arc::clone(&responses);

        let reader = tokio::spawn(async move {
            while let Some(msg) = rx.next().await {
                match msg {
                    Ok(WsMessage::Text(text)) => {
                        let Ok(json) = serde_json::from_str::<Value>(&text) else {
                            continue;
                        };
                        // Events carry no id and are not routed
                        if let Some(id) = json.get("id").and_then(|i| i.as_u64()) {
                            if let Some(sender) = routed.lock().await.remove(&(id as u32)) {
                                let _ = sender.send(json);
                            }
                        }
                    }
                    Ok(WsMessage::Close(_)) => {
                        tracing::debug!("CDP WebSocket closed");
                        break;
                    }
                    Err(e) => {
                        tracing::debug!("CDP WebSocket error: {:?}", e);
                        break;
                    }
                    _ => {}
                }
            }
            // Wake every outstanding waiter with a closed channel
            routed.lock().await.clear();
        });

        tracing::debug!("CDP client connected to {}", ws_url);

        Ok(Self {
            ws_tx: Mutex::new(tx),
            responses,
            msg_id: AtomicU32::new(1),
            command_timeout,
            reader,
        })
    }

    /// Send a CDP command and return its `result` object.
    pub async fn send_command(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.msg_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = oneshot::channel();
        self.responses.lock().await.insert(id, tx);

        let command = json!({
            "id": id,
            "method": method,
            "params": params
        });

        let sent = self
            .ws_tx
            .lock()
            .await
            .send(WsMessage::Text(command.to_string()))
            .await;
        if let Err(e) = sent {
            self.responses.lock().await.remove(&id);
            return Err(e.into());
        }

        let response = match tokio::time::timeout(self.command_timeout, rx).await {
            Ok(Ok(response)) => response,
            Ok(Err(_)) => {
                return Err(SignupError::Cdp(format!(
                    "Connection closed before {} returned",
                    method
                )))
            }
            Err(_) => {
                self.responses.lock().await.remove(&id);
                return Err(SignupError::Timeout(format!("CDP command {}", method)));
            }
        };

        if let Some(error) = response.get("error") {
            let message = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown error");
            return Err(SignupError::Cdp(format!("{} failed: {}", method, message)));
        }

        Ok(response.get("result").cloned().unwrap_or(Value::Null))
    }

    /// Evaluate a JavaScript expression and return its value by value.
    pub async fn evaluate(&self, expression: &str) -> Result<Value> {
        let result = self
            .send_command(
                "Runtime.evaluate",
                json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true
                }),
            )
            .await?;

        if let Some(details) = result.get("exceptionDetails") {
            let message = details
                .pointer("/exception/description")
                .or_else(|| details.get("text"))
                .and_then(|v| v.as_str())
                .unwrap_or("uncaught exception");
            return Err(SignupError::Script(message.to_string()));
        }

        Ok(result
            .pointer("/result/value")
            .cloned()
            .unwrap_or(Value::Null))
    }

    pub async fn close(&self) {
        let _ = self.ws_tx.lock().await.close().await;
        self.reader.abort();
    }
}

impl Drop for CdpClient {
    fn drop(&mut self) {
        self.reader.abort();
    }
}
