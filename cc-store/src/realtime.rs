//! Realtime record subscriptions over server-sent events
//!
//! Connecting to `/api/realtime` yields a `PB_CONNECT` event carrying a
//! client id. Topics are then registered for that client with a POST, and
//! matching record changes arrive as events named after the topic.

use async_stream::try_stream;
use cc_common::models::{ClothingItem, CLOTHING_ITEMS_COLLECTION};
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::client::PocketBase;
use crate::error::{StoreError, StoreResult};
use crate::items::ClothingItems;

const REALTIME_PATH: &str = "/api/realtime";
const CONNECT_EVENT: &str = "PB_CONNECT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordAction {
    Create,
    Update,
    Delete,
}

/// A change to one record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordEvent<T> {
    pub action: RecordAction,
    pub record: T,
}

/// Stream of record changes; ends when the connection closes
pub type RecordStream<T> = BoxStream<'static, StoreResult<RecordEvent<T>>>;

/// One dispatched server-sent event
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct SseEvent {
    pub event: String,
    pub data: String,
    pub id: Option<String>,
}

/// Incremental `text/event-stream` parser
#[derive(Debug, Default)]
pub(crate) struct SseParser {
    buffer: Vec<u8>,
    current: SseEvent,
    has_data: bool,
}

impl SseParser {
    /// Feed a chunk; returns events completed by it
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(chunk);
        let mut events = Vec::new();

        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            let line = String::from_utf8_lossy(&line);
            if let Some(event) = self.process_line(&line) {
                events.push(event);
            }
        }

        events
    }

    fn process_line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            if !self.has_data && self.current.event.is_empty() {
                return None;
            }
            self.has_data = false;
            return Some(std::mem::take(&mut self.current));
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.current.event = value.to_string(),
            "data" => {
                if self.has_data {
                    self.current.data.push('\n');
                }
                self.current.data.push_str(value);
                self.has_data = true;
            }
            "id" => self.current.id = Some(value.to_string()),
            _ => {}
        }
        None
    }
}

#[derive(Debug, Deserialize)]
struct ConnectData {
    #[serde(rename = "clientId")]
    client_id: String,
}

impl PocketBase {
    /// Subscribe to record changes on `topic` (e.g. `clothing_items/*`)
    pub async fn subscribe<T>(&self, topic: &str) -> StoreResult<RecordStream<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let response = self
            .execute(
                self.request(Method::GET, REALTIME_PATH)
                    .header(reqwest::header::ACCEPT, "text/event-stream"),
            )
            .await?;

        let mut bytes = Box::pin(response.bytes_stream());
        let mut parser = SseParser::default();
        let mut pending: Vec<SseEvent> = Vec::new();

        let client_id = loop {
            let chunk = match bytes.next().await {
                Some(chunk) => chunk?,
                None => return Err(StoreError::Realtime("Connection closed before handshake".into())),
            };
            pending.extend(parser.push(&chunk));

            if let Some(pos) = pending.iter().position(|e| e.event == CONNECT_EVENT) {
                let connect = pending.remove(pos);
                pending.drain(..pos).for_each(drop);
                let data: ConnectData = serde_json::from_str(&connect.data)
                    .map_err(|e| StoreError::Realtime(format!("Bad connect event: {}", e)))?;
                break data.client_id;
            }
        };
        debug!(client_id = %client_id, "Realtime connected");

        let request = self
            .request(Method::POST, REALTIME_PATH)
            .json(&json!({ "clientId": client_id, "subscriptions": [topic] }));
        self.send_empty(request).await?;
        info!(topic = %topic, "Subscribed to realtime updates");

        let topic = topic.to_string();
        let stream = try_stream! {
            for event in pending {
                if let Some(record) = decode_event::<T>(&topic, &event)? {
                    yield record;
                }
            }

            while let Some(chunk) = bytes.next().await {
                let chunk = chunk?;
                for event in parser.push(&chunk) {
                    if let Some(record) = decode_event::<T>(&topic, &event)? {
                        yield record;
                    }
                }
            }
            debug!(topic = %topic, "Realtime connection closed");
        };

        Ok(stream.boxed())
    }
}

fn decode_event<T: DeserializeOwned>(topic: &str, event: &SseEvent) -> StoreResult<Option<RecordEvent<T>>> {
    if event.event != topic {
        return Ok(None);
    }
    serde_json::from_str(&event.data)
        .map(Some)
        .map_err(|e| StoreError::Parse(format!("Realtime event: {}", e)))
}

impl<'a> ClothingItems<'a> {
    /// Changes to the signed-in user's items
    ///
    /// Events for records owned by someone else are skipped.
    pub async fn subscribe(&self) -> StoreResult<RecordStream<ClothingItem>> {
        let owner = self.client().require_user_id()?;
        let topic = format!("{}/*", CLOTHING_ITEMS_COLLECTION);
        let events = self.client().subscribe::<ClothingItem>(&topic).await?;

        let owned = events.filter(move |event| {
            let keep = match event {
                Ok(event) if event.record.user != owner => {
                    warn!(item_id = %event.record.id, "Ignoring realtime event for another owner");
                    false
                }
                _ => true,
            };
            futures::future::ready(keep)
        });
        Ok(owned.boxed())
    }
}
