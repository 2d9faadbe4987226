// SPDX-FileCopyrightText: 2026 Quorum Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pending-queue drain on session ready.
//!
//! Items park in the durable queue while a session is offline and drain in
//! insertion order once the transport reports ready. A malformed or failed
//! item is marked `failed` and the drain continues; one bad payload must
//! never wedge the queue behind it.

use base64::Engine as _;
use quorum_core::types::OutboundMedia;
use quorum_core::{QuorumError, SessionKey, Transport};
use quorum_storage::Database;
use quorum_storage::models::{PollRecord, QueueItem};
use quorum_storage::queries::{polls, queue};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::ident;

/// Payload for a queued text item. Non-JSON payloads are sent verbatim.
#[derive(Debug, Deserialize)]
struct TextPayload {
    text: String,
}

/// Payload for a queued poll item.
#[derive(Debug, Deserialize)]
struct PollPayload {
    question: String,
    options: Vec<String>,
    /// Optional lead-in text sent before the poll itself.
    #[serde(default)]
    intro: Option<String>,
    /// Business key carried through to the poll record.
    #[serde(default)]
    correlation_id: Option<String>,
}

/// Payload for a queued media item. Exactly one of `url` or `data` is set.
#[derive(Debug, Deserialize)]
struct MediaPayload {
    #[serde(default)]
    url: Option<String>,
    /// Base64 content, with or without a `data:` URI prefix.
    #[serde(default)]
    data: Option<String>,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    mime_type: Option<String>,
    #[serde(default)]
    caption: Option<String>,
}

/// Drain every pending item for one session, oldest first.
///
/// Returns the number of items delivered. Storage failures abort the drain;
/// per-item decode or send failures mark that item failed and continue.
pub async fn drain(
    db: &Database,
    transport: &dyn Transport,
    key: &SessionKey,
) -> Result<usize, QuorumError> {
    let items = queue::pending_items(db, key).await?;
    if items.is_empty() {
        return Ok(0);
    }
    info!(session = %key, count = items.len(), "draining pending queue");

    let mut delivered = 0;
    for item in items {
        // A ready-drain and a caller-side drain can race on the same rows;
        // the conditional claim ensures each item is delivered once.
        if !queue::claim_item(db, item.id).await? {
            debug!(session = %key, id = item.id, "item claimed by a concurrent drain");
            continue;
        }
        match send_item(db, transport, key, &item).await {
            Ok(()) => {
                queue::mark_sent(db, item.id).await?;
                delivered += 1;
            }
            Err(e) => {
                warn!(session = %key, id = item.id, error = %e, "queued item failed, skipping");
                queue::mark_failed(db, item.id).await?;
            }
        }
    }
    Ok(delivered)
}

async fn send_item(
    db: &Database,
    transport: &dyn Transport,
    key: &SessionKey,
    item: &QueueItem,
) -> Result<(), QuorumError> {
    match item.kind.as_str() {
        "poll" => send_poll(db, transport, key, item).await,
        "media" => send_media(transport, item).await,
        // Unknown kinds degrade to text rather than being dropped.
        other => {
            if other != "text" {
                debug!(session = %key, id = item.id, kind = other, "unknown kind, sending as text");
            }
            send_text(transport, item).await
        }
    }
}

async fn send_text(transport: &dyn Transport, item: &QueueItem) -> Result<(), QuorumError> {
    // Accept both `{"text": "..."}` and a bare string payload.
    let body = match serde_json::from_str::<TextPayload>(&item.payload) {
        Ok(p) => p.text,
        Err(_) => item.payload.clone(),
    };
    transport.send_text(&item.recipient, &body).await
}

async fn send_poll(
    db: &Database,
    transport: &dyn Transport,
    key: &SessionKey,
    item: &QueueItem,
) -> Result<(), QuorumError> {
    let payload: PollPayload = serde_json::from_str(&item.payload)
        .map_err(|e| QuorumError::Internal(format!("malformed poll payload: {e}")))?;
    if payload.question.is_empty() {
        return Err(QuorumError::Internal("poll has no question".into()));
    }
    if payload.options.is_empty() {
        return Err(QuorumError::Internal("poll has no options".into()));
    }

    if let Some(intro) = payload.intro.as_deref() {
        if !intro.is_empty() {
            transport.send_text(&item.recipient, intro).await?;
        }
    }

    let message_id = transport
        .send_poll(&item.recipient, &payload.question, &payload.options)
        .await?;

    let options = serde_json::to_string(&payload.options)
        .map_err(|e| QuorumError::Internal(format!("failed to encode options: {e}")))?;
    let record = PollRecord {
        message_id_short: ident::short_id(&message_id)
            .unwrap_or(&message_id)
            .to_string(),
        message_id,
        session_key: key.as_str().to_string(),
        recipient: Some(item.recipient.clone()),
        options,
        correlation_id: payload.correlation_id,
        answered: false,
        answer_labels: None,
        answer_raw: None,
        order_number: None,
        answered_at: None,
    };
    polls::insert_poll(db, &record).await
}

async fn send_media(transport: &dyn Transport, item: &QueueItem) -> Result<(), QuorumError> {
    let payload: MediaPayload = serde_json::from_str(&item.payload)
        .map_err(|e| QuorumError::Internal(format!("malformed media payload: {e}")))?;

    let media = if let Some(url) = payload.url.filter(|u| !u.is_empty()) {
        OutboundMedia::Url(url)
    } else if let Some(data) = payload.data.filter(|d| !d.is_empty()) {
        // Strip a `data:<mime>;base64,` prefix when present.
        let encoded = data.rsplit(',').next().unwrap_or(&data);
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| QuorumError::Internal(format!("invalid base64 media data: {e}")))?;
        OutboundMedia::Bytes {
            data: bytes,
            filename: payload
                .filename
                .filter(|f| !f.is_empty())
                .unwrap_or_else(|| "attachment".to_string()),
            mime_type: payload
                .mime_type
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "application/octet-stream".to_string()),
        }
    } else {
        return Err(QuorumError::Internal(
            "media payload has neither url nor data".into(),
        ));
    };

    transport
        .send_media(&item.recipient, media, payload.caption.as_deref())
        .await
}
