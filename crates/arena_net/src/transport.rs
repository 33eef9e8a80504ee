//! Transports carry [`InactivityChanged`] messages between the peers of a
//! session.
//!
//! The game loop is synchronous, so [`Transport`] is too: `broadcast` queues a
//! message and `try_recv` never blocks. [`MemoryBus`] connects peers living in
//! one process; [`NatsTransport`] bridges to NATS through background tasks.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::codec;
use crate::connection::NatsConnection;
use crate::error::NetError;
use crate::messages::{INACTIVITY_CHANGED_MSG_TYPE, InactivityChanged, headers};
use crate::subjects;

/// A best-effort, unordered broadcast medium shared by the peers of a session.
///
/// Every broadcast reaches every joined peer, the sender included.
pub trait Transport {
    /// Identifier of the local peer.
    fn peer_id(&self) -> &str;

    /// Queue a message for every peer.
    ///
    /// # Errors
    ///
    /// Returns [`NetError`] if the message cannot be encoded or the medium is
    /// gone.
    fn broadcast(&mut self, message: &InactivityChanged) -> Result<(), NetError>;

    /// Take the next delivered message, if any.
    fn try_recv(&mut self) -> Option<InactivityChanged>;
}

// ── In-process bus ──────────────────────────────────────────────────────────

/// One queue of encoded payloads per joined peer.
#[derive(Debug, Default, Clone)]
pub struct MemoryBus {
    queues: Rc<RefCell<Vec<VecDeque<Vec<u8>>>>>,
}

impl MemoryBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the bus as a new peer.
    #[must_use]
    pub fn join(&self, peer_id: impl Into<String>) -> MemoryTransport {
        let mut queues = self.queues.borrow_mut();
        queues.push(VecDeque::new());
        MemoryTransport {
            bus: self.clone(),
            slot: queues.len() - 1,
            peer_id: peer_id.into(),
        }
    }

    /// Number of joined peers.
    #[must_use]
    pub fn peers(&self) -> usize {
        self.queues.borrow().len()
    }

    /// Messages waiting in a peer's queue.
    #[must_use]
    pub fn pending(&self, transport: &MemoryTransport) -> usize {
        self.queues
            .borrow()
            .get(transport.slot)
            .map_or(0, VecDeque::len)
    }
}

/// A peer's handle on a [`MemoryBus`].
#[derive(Debug)]
pub struct MemoryTransport {
    bus: MemoryBus,
    slot: usize,
    peer_id: String,
}

impl Transport for MemoryTransport {
    fn peer_id(&self) -> &str {
        &self.peer_id
    }

    fn broadcast(&mut self, message: &InactivityChanged) -> Result<(), NetError> {
        let payload = codec::encode(message)?;
        for queue in self.bus.queues.borrow_mut().iter_mut() {
            queue.push_back(payload.clone());
        }
        Ok(())
    }

    fn try_recv(&mut self) -> Option<InactivityChanged> {
        loop {
            let payload = self.bus.queues.borrow_mut().get_mut(self.slot)?.pop_front()?;
            match codec::decode(&payload) {
                Ok(message) => return Some(message),
                Err(e) => warn!(peer = self.peer_id, error = %e, "dropping undecodable payload"),
            }
        }
    }
}

// ── NATS ────────────────────────────────────────────────────────────────────

/// Bridges a session's inactivity subject to the synchronous [`Transport`]
/// interface.
///
/// Two tasks run on the current tokio runtime: a publisher draining the
/// outbound queue and a subscriber decoding into the inbound queue. Both are
/// aborted when the transport is dropped.
#[derive(Debug)]
pub struct NatsTransport {
    peer_id: String,
    outbound: mpsc::UnboundedSender<Vec<u8>>,
    inbound: mpsc::UnboundedReceiver<InactivityChanged>,
    /// Set once the subscriber task is gone and that has been logged.
    inbound_closed: bool,
    publisher: JoinHandle<()>,
    subscriber: JoinHandle<()>,
}

impl NatsTransport {
    /// Subscribe to the session subject and start the background tasks.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::Subscribe`] if the subscription fails.
    pub async fn start(
        conn: NatsConnection,
        session: &str,
        peer_id: impl Into<String>,
    ) -> Result<Self, NetError> {
        let peer_id = peer_id.into();
        let subject = subjects::inactivity(session);
        let mut subscription = conn.subscribe(&subject).await?;
        info!(subject, peer = peer_id, "subscribed to inactivity edges");

        let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<Vec<u8>>();
        let (inbound_tx, inbound) = mpsc::unbounded_channel();

        let publisher = {
            let subject = subject.clone();
            let peer_id = peer_id.clone();
            tokio::spawn(async move {
                while let Some(payload) = outbound_rx.recv().await {
                    let mut map = async_nats::HeaderMap::new();
                    map.insert(headers::MSG_TYPE, INACTIVITY_CHANGED_MSG_TYPE);
                    map.insert(headers::PEER_ID, peer_id.as_str());
                    if let Err(e) = conn.publish_raw(&subject, map, payload).await {
                        warn!(subject, error = %e, "publish failed");
                    }
                }
                debug!(subject, "publisher stopped");
            })
        };

        let subscriber = tokio::spawn(async move {
            while let Some(msg) = subscription.next().await {
                match accept(&msg) {
                    Ok(Some(message)) => {
                        if inbound_tx.send(message).is_err() {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => warn!(subject = %msg.subject, error = %e, "dropping message"),
                }
            }
            debug!("subscriber stopped");
        });

        Ok(Self {
            peer_id,
            outbound,
            inbound,
            inbound_closed: false,
            publisher,
            subscriber,
        })
    }
}

/// Decode a NATS message if it carries an inactivity edge. Other message types
/// on the subject are skipped.
fn accept(msg: &async_nats::Message) -> Result<Option<InactivityChanged>, NetError> {
    let msg_type = msg
        .headers
        .as_ref()
        .and_then(|h| h.get(headers::MSG_TYPE))
        .ok_or(NetError::MissingHeader(headers::MSG_TYPE))?;
    if msg_type.as_str() != INACTIVITY_CHANGED_MSG_TYPE {
        debug!(msg_type = msg_type.as_str(), "skipping message");
        return Ok(None);
    }
    codec::decode(msg.payload.as_ref()).map(Some)
}

impl Transport for NatsTransport {
    fn peer_id(&self) -> &str {
        &self.peer_id
    }

    fn broadcast(&mut self, message: &InactivityChanged) -> Result<(), NetError> {
        let payload = codec::encode(message)?;
        self.outbound.send(payload).map_err(|_| NetError::Closed)
    }

    fn try_recv(&mut self) -> Option<InactivityChanged> {
        match self.inbound.try_recv() {
            Ok(message) => Some(message),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                if !self.inbound_closed {
                    warn!(
                        peer = self.peer_id,
                        "subscriber stopped, remote edges will no longer arrive"
                    );
                    self.inbound_closed = true;
                }
                None
            }
        }
    }
}

impl Drop for NatsTransport {
    fn drop(&mut self) {
        self.publisher.abort();
        self.subscriber.abort();
    }
}

#[cfg(test)]
mod tests {
    use arena_core::EntityId;

    use super::*;

    fn edge(entity: u64, inactive: bool, sequence: u64) -> InactivityChanged {
        InactivityChanged {
            entity: EntityId(entity),
            inactive,
            display_name: format!("fighter-{entity}"),
            sequence,
            origin: "peer-a".to_string(),
        }
    }

    #[test]
    fn test_broadcast_reaches_every_peer_including_sender() {
        let bus = MemoryBus::new();
        let mut a = bus.join("peer-a");
        let mut b = bus.join("peer-b");
        assert_eq!(bus.peers(), 2);

        a.broadcast(&edge(1, true, 1)).unwrap();

        assert_eq!(a.try_recv(), Some(edge(1, true, 1)));
        assert_eq!(b.try_recv(), Some(edge(1, true, 1)));
        assert_eq!(a.try_recv(), None);
        assert_eq!(b.try_recv(), None);
    }

    #[test]
    fn test_queue_preserves_send_order_per_peer() {
        let bus = MemoryBus::new();
        let mut a = bus.join("peer-a");
        let mut b = bus.join("peer-b");

        a.broadcast(&edge(1, true, 1)).unwrap();
        a.broadcast(&edge(1, false, 2)).unwrap();
        assert_eq!(bus.pending(&b), 2);

        assert_eq!(b.try_recv().map(|m| m.sequence), Some(1));
        assert_eq!(b.try_recv().map(|m| m.sequence), Some(2));
    }

    #[test]
    fn test_late_joiner_misses_earlier_traffic() {
        let bus = MemoryBus::new();
        let mut a = bus.join("peer-a");
        a.broadcast(&edge(1, true, 1)).unwrap();

        let mut late = bus.join("peer-late");
        assert_eq!(late.try_recv(), None);
        assert_eq!(late.peer_id(), "peer-late");
    }

    fn nats_message(
        headers: Option<async_nats::HeaderMap>,
        payload: Vec<u8>,
    ) -> async_nats::Message {
        async_nats::Message {
            subject: subjects::inactivity("lobby").into(),
            reply: None,
            length: payload.len(),
            payload: payload.into(),
            headers,
            status: None,
            description: None,
        }
    }

    fn typed(msg_type: &str) -> Option<async_nats::HeaderMap> {
        let mut map = async_nats::HeaderMap::new();
        map.insert(headers::MSG_TYPE, msg_type);
        map.insert(headers::PEER_ID, "peer-a");
        Some(map)
    }

    #[test]
    fn test_accept_decodes_inactivity_edge() {
        let payload = codec::encode(&edge(3, true, 9)).unwrap();
        let msg = nats_message(typed(INACTIVITY_CHANGED_MSG_TYPE), payload);
        assert_eq!(accept(&msg).unwrap(), Some(edge(3, true, 9)));
    }

    #[test]
    fn test_accept_skips_foreign_message_type() {
        let msg = nats_message(typed("ScoreChanged"), vec![0xC1]);
        assert_eq!(accept(&msg).unwrap(), None);
    }

    #[test]
    fn test_accept_requires_type_header() {
        let payload = codec::encode(&edge(3, true, 9)).unwrap();
        let msg = nats_message(None, payload.clone());
        assert!(matches!(
            accept(&msg),
            Err(NetError::MissingHeader(headers::MSG_TYPE))
        ));

        let mut untyped = async_nats::HeaderMap::new();
        untyped.insert(headers::PEER_ID, "peer-a");
        let msg = nats_message(Some(untyped), payload);
        assert!(matches!(accept(&msg), Err(NetError::MissingHeader(_))));
    }

    #[test]
    fn test_accept_rejects_corrupt_payload() {
        let msg = nats_message(typed(INACTIVITY_CHANGED_MSG_TYPE), vec![0xC1]);
        assert!(matches!(accept(&msg), Err(NetError::Decode(_))));
    }

    #[tokio::test]
    async fn test_nats_try_recv_after_subscriber_stops() {
        let (outbound, _outbound_rx) = mpsc::unbounded_channel();
        let (inbound_tx, inbound) = mpsc::unbounded_channel();
        let mut transport = NatsTransport {
            peer_id: "peer-a".to_string(),
            outbound,
            inbound,
            inbound_closed: false,
            publisher: tokio::spawn(async {}),
            subscriber: tokio::spawn(async {}),
        };

        inbound_tx.send(edge(1, true, 1)).unwrap();
        assert_eq!(transport.try_recv(), Some(edge(1, true, 1)));
        assert_eq!(transport.try_recv(), None);
        assert!(!transport.inbound_closed);

        drop(inbound_tx);
        assert_eq!(transport.try_recv(), None);
        assert!(transport.inbound_closed);
        assert_eq!(transport.try_recv(), None);
        assert!(transport.inbound_closed);
    }

    #[test]
    fn test_undecodable_payload_is_skipped() {
        let bus = MemoryBus::new();
        let mut a = bus.join("peer-a");
        bus.queues.borrow_mut()[0].push_back(vec![0xC1]);
        a.broadcast(&edge(2, false, 4)).unwrap();

        assert_eq!(a.try_recv(), Some(edge(2, false, 4)));
    }
}
