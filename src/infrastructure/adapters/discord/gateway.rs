//! Discord gateway session: connect, identify, heartbeat, dispatch events

use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use super::types::{
    opcode, GatewayPayload, Hello, Identify, IdentifyProperties, Interaction, OutgoingPayload,
    Ready,
};
use crate::application::errors::BotError;
use crate::infrastructure::config::DiscordConfig;

/// Events the application cares about
#[derive(Debug)]
pub enum GatewayEvent {
    Ready(Box<Ready>),
    Interaction(Box<Interaction>),
}

/// Why a single connection ended
#[derive(Debug)]
enum Disconnect {
    /// Reconnect with a fresh identify
    Reconnect(String),
    /// Nobody is listening for events any more
    Shutdown,
}

/// A long-lived gateway session that reconnects until told to stop
pub struct GatewaySession {
    url: String,
    token: String,
    intents: u64,
    reconnect_delay: Duration,
    client_name: String,
}

impl GatewaySession {
    pub fn new(config: &DiscordConfig, token: impl Into<String>, client_name: impl Into<String>) -> Self {
        Self {
            url: config.gateway_url.clone(),
            token: token.into(),
            intents: config.intents,
            reconnect_delay: Duration::from_secs(config.reconnect_delay_secs),
            client_name: client_name.into(),
        }
    }

    /// Run until the event receiver is dropped (Ok) or Discord refuses the
    /// session for good (Err).
    pub async fn run(self, events: mpsc::Sender<GatewayEvent>) -> Result<(), BotError> {
        loop {
            tracing::info!("Connecting to Discord gateway…");

            match self.connect_once(&events).await {
                Ok(Disconnect::Shutdown) => return Ok(()),
                Ok(Disconnect::Reconnect(reason)) => {
                    tracing::warn!("Gateway connection lost: {}", reason);
                }
                Err(e @ BotError::Auth(_)) => return Err(e),
                Err(e) => {
                    tracing::error!("Gateway error: {}", e);
                }
            }

            if events.is_closed() {
                return Ok(());
            }
            tracing::info!("Reconnecting in {} seconds…", self.reconnect_delay.as_secs());
            tokio::time::sleep(self.reconnect_delay).await;
        }
    }

    async fn connect_once(&self, events: &mpsc::Sender<GatewayEvent>) -> Result<Disconnect, BotError> {
        let (ws, _resp) = connect_async(self.url.as_str())
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;
        let (mut write, mut read) = ws.split();

        let hello = loop {
            match read.next().await {
                Some(Ok(Message::Text(text))) => {
                    let payload = parse_payload(&text)?;
                    if payload.op == opcode::HELLO {
                        break serde_json::from_value::<Hello>(payload.d)
                            .map_err(|e| BotError::Parse(e.to_string()))?;
                    }
                }
                Some(Ok(Message::Close(frame))) => return closed(frame),
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(BotError::Network(e.to_string())),
                None => return Ok(Disconnect::Reconnect("closed before hello".to_string())),
            }
        };

        let period = Duration::from_millis(hello.heartbeat_interval);
        tracing::debug!("Gateway hello, heartbeat every {:?}", period);

        let identify = OutgoingPayload {
            op: opcode::IDENTIFY,
            d: Identify {
                token: &self.token,
                intents: self.intents,
                properties: IdentifyProperties::new(&self.client_name),
            },
        };
        write
            .send(Message::Text(to_text(&identify)?.into()))
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        let mut heartbeat = interval_at(Instant::now() + period, period);
        let mut sequence: Option<u64> = None;
        let mut acked = true;

        loop {
            tokio::select! {
                _ = heartbeat.tick() => {
                    if !acked {
                        return Ok(Disconnect::Reconnect("heartbeat not acknowledged".to_string()));
                    }
                    let beat = OutgoingPayload { op: opcode::HEARTBEAT, d: sequence };
                    write
                        .send(Message::Text(to_text(&beat)?.into()))
                        .await
                        .map_err(|e| BotError::Network(e.to_string()))?;
                    acked = false;
                }
                frame = read.next() => {
                    let text = match frame {
                        Some(Ok(Message::Text(text))) => text,
                        Some(Ok(Message::Close(frame))) => return closed(frame),
                        Some(Ok(_)) => continue,
                        Some(Err(e)) => return Err(BotError::Network(e.to_string())),
                        None => return Ok(Disconnect::Reconnect("stream ended".to_string())),
                    };

                    let payload = parse_payload(&text)?;
                    if let Some(s) = payload.s {
                        sequence = Some(s);
                    }

                    match payload.op {
                        opcode::DISPATCH => {
                            let Some(event) = dispatch(payload) else { continue };
                            if events.send(event).await.is_err() {
                                return Ok(Disconnect::Shutdown);
                            }
                        }
                        opcode::HEARTBEAT => {
                            let beat = OutgoingPayload { op: opcode::HEARTBEAT, d: sequence };
                            write
                                .send(Message::Text(to_text(&beat)?.into()))
                                .await
                                .map_err(|e| BotError::Network(e.to_string()))?;
                        }
                        opcode::HEARTBEAT_ACK => acked = true,
                        opcode::RECONNECT => {
                            return Ok(Disconnect::Reconnect("server requested reconnect".to_string()));
                        }
                        opcode::INVALID_SESSION => {
                            return Ok(Disconnect::Reconnect("session invalidated".to_string()));
                        }
                        other => tracing::debug!("Ignoring gateway opcode {}", other),
                    }
                }
            }
        }
    }
}

fn parse_payload(text: &str) -> Result<GatewayPayload, BotError> {
    serde_json::from_str(text).map_err(|e| BotError::Parse(e.to_string()))
}

fn to_text<T: Serialize>(payload: &T) -> Result<String, BotError> {
    serde_json::to_string(payload).map_err(|e| BotError::Parse(e.to_string()))
}

/// Map a dispatch frame to an application event, if it is one we handle
fn dispatch(payload: GatewayPayload) -> Option<GatewayEvent> {
    let event = payload.t.as_deref()?;
    let parsed = match event {
        "READY" => serde_json::from_value(payload.d).map(|r| GatewayEvent::Ready(Box::new(r))),
        "INTERACTION_CREATE" => {
            serde_json::from_value(payload.d).map(|i| GatewayEvent::Interaction(Box::new(i)))
        }
        _ => return None,
    };

    match parsed {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::warn!("Malformed {} event: {}", event, e);
            None
        }
    }
}

/// Close codes after which reconnecting cannot help
fn is_fatal_close(code: u16) -> bool {
    matches!(code, 4004 | 4010 | 4011 | 4012 | 4013 | 4014)
}

fn closed(frame: Option<CloseFrame>) -> Result<Disconnect, BotError> {
    let Some(frame) = frame else {
        return Ok(Disconnect::Reconnect("closed without a close frame".to_string()));
    };
    let code = u16::from(frame.code);
    if is_fatal_close(code) {
        return Err(BotError::Auth(format!(
            "gateway closed the session ({}): {}",
            code, frame.reason.as_str()
        )));
    }
    if frame.code == CloseCode::Normal {
        return Ok(Disconnect::Reconnect("closed normally".to_string()));
    }
    Ok(Disconnect::Reconnect(format!("closed ({}): {}", code, frame.reason.as_str())))
}
