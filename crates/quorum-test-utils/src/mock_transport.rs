// SPDX-FileCopyrightText: 2026 Quorum Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock transport for deterministic testing.
//!
//! `MockTransport` captures outbound sends for assertion; the paired
//! factory hands tests the event sender so they can script the transport's
//! lifecycle (QR, ready, votes, disconnects) without any external service.

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use quorum_core::types::OutboundMedia;
use quorum_core::{
    QuorumError, SessionKey, Transport, TransportEvent, TransportFactory,
};
use tokio::sync::{Semaphore, mpsc};

/// One captured outbound send.
#[derive(Debug, Clone)]
pub enum SentItem {
    Text {
        recipient: String,
        body: String,
    },
    Poll {
        recipient: String,
        question: String,
        options: Vec<String>,
        message_id: String,
    },
    Media {
        recipient: String,
        media: OutboundMedia,
        caption: Option<String>,
    },
}

/// A scriptable transport handle.
pub struct MockTransport {
    session_key: SessionKey,
    sent: Mutex<Vec<SentItem>>,
    fail_sends: AtomicBool,
    destroyed: AtomicBool,
    poll_counter: AtomicU64,
    gate: Mutex<Option<Arc<Semaphore>>>,
}

impl MockTransport {
    fn new(session_key: SessionKey) -> Self {
        Self {
            session_key,
            sent: Mutex::new(Vec::new()),
            fail_sends: AtomicBool::new(false),
            destroyed: AtomicBool::new(false),
            poll_counter: AtomicU64::new(0),
            gate: Mutex::new(None),
        }
    }

    /// Everything sent through this handle so far.
    pub fn sent(&self) -> Vec<SentItem> {
        self.sent.lock().expect("sent lock poisoned").clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().expect("sent lock poisoned").len()
    }

    /// Make every subsequent send fail with a transport error.
    pub fn set_fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    /// Hold every subsequent send until permits are added to the returned
    /// semaphore. Lets tests freeze a sender mid-delivery.
    pub fn hold_sends(&self) -> Arc<Semaphore> {
        let sem = Arc::new(Semaphore::new(0));
        *self.gate.lock().expect("gate lock poisoned") = Some(Arc::clone(&sem));
        sem
    }

    async fn pass_gate(&self) {
        let sem = self.gate.lock().expect("gate lock poisoned").clone();
        if let Some(sem) = sem {
            if let Ok(permit) = sem.acquire().await {
                permit.forget();
            }
        }
    }

    fn check_fail(&self) -> Result<(), QuorumError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(QuorumError::Transport {
                message: format!("mock send failure for {}", self.session_key),
                source: None,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn initialize(&self) -> Result<(), QuorumError> {
        Ok(())
    }

    async fn send_text(&self, recipient: &str, body: &str) -> Result<(), QuorumError> {
        self.check_fail()?;
        self.pass_gate().await;
        self.sent.lock().expect("sent lock poisoned").push(SentItem::Text {
            recipient: recipient.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }

    async fn send_poll(
        &self,
        recipient: &str,
        question: &str,
        options: &[String],
    ) -> Result<String, QuorumError> {
        self.check_fail()?;
        self.pass_gate().await;
        let n = self.poll_counter.fetch_add(1, Ordering::SeqCst);
        // Composite id in the transport's long form; short segment is unique.
        let message_id = format!(
            "true_{}_MOCK{}{}",
            recipient,
            n,
            uuid::Uuid::new_v4().simple()
        );
        self.sent.lock().expect("sent lock poisoned").push(SentItem::Poll {
            recipient: recipient.to_string(),
            question: question.to_string(),
            options: options.to_vec(),
            message_id: message_id.clone(),
        });
        Ok(message_id)
    }

    async fn send_media(
        &self,
        recipient: &str,
        media: OutboundMedia,
        caption: Option<&str>,
    ) -> Result<(), QuorumError> {
        self.check_fail()?;
        self.pass_gate().await;
        self.sent.lock().expect("sent lock poisoned").push(SentItem::Media {
            recipient: recipient.to_string(),
            media,
            caption: caption.map(str::to_string),
        });
        Ok(())
    }

    async fn destroy(&self) -> Result<(), QuorumError> {
        self.destroyed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// One created session: the handle plus the test's end of its event stream.
#[derive(Clone)]
pub struct MockSession {
    pub transport: Arc<MockTransport>,
    pub events: mpsc::Sender<TransportEvent>,
}

/// Factory that records every handle it creates.
///
/// Tests retrieve the handle for a key with [`MockTransportFactory::session`]
/// and inject lifecycle events through its sender.
#[derive(Default)]
pub struct MockTransportFactory {
    created: Mutex<Vec<(SessionKey, MockSession)>>,
}

impl MockTransportFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent session created for `key`, if any.
    pub fn session(&self, key: &SessionKey) -> Option<MockSession> {
        self.created
            .lock()
            .expect("created lock poisoned")
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, s)| s.clone())
    }

    /// How many handles have ever been created for `key`.
    pub fn created_count(&self, key: &SessionKey) -> usize {
        self.created
            .lock()
            .expect("created lock poisoned")
            .iter()
            .filter(|(k, _)| k == key)
            .count()
    }
}

impl TransportFactory for MockTransportFactory {
    fn create(
        &self,
        session_key: &SessionKey,
        _data_dir: &Path,
    ) -> Result<(Arc<dyn Transport>, mpsc::Receiver<TransportEvent>), QuorumError> {
        let (tx, rx) = mpsc::channel(64);
        let transport = Arc::new(MockTransport::new(session_key.clone()));
        self.created
            .lock()
            .expect("created lock poisoned")
            .push((
                session_key.clone(),
                MockSession {
                    transport: Arc::clone(&transport),
                    events: tx,
                },
            ));
        Ok((transport, rx))
    }
}
