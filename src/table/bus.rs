use crate::Position;
use crate::dto::Protocol;
use crate::dto::Role;
use crate::dto::ServerMessage;
use crate::gameplay::Event;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

pub type PeerId = uuid::Uuid;

/// outbound frames buffered per subscriber before eviction
const OUTBOX: usize = 256;

#[derive(Debug)]
struct Subscriber {
    id: PeerId,
    name: String,
    role: Role,
    seat: Option<Position>,
    tx: mpsc::Sender<ServerMessage>,
}

/// Per-table fanout to subscribers with bounded backpressure.
///
/// Publish never blocks the coordinator: a subscriber whose channel is
/// at capacity is evicted on the spot, which downstream closes its
/// session. Per-subscriber ordering is FIFO. Encoding happens here so
/// each viewer gets its own perspective of private cards.
pub struct Bus {
    protocol: Protocol,
    subscribers: Vec<Subscriber>,
}

impl Bus {
    pub fn new(protocol: Protocol) -> Self {
        Self {
            protocol,
            subscribers: Vec::new(),
        }
    }
    pub fn protocol(&self) -> &Protocol {
        &self.protocol
    }
    /// register a peer and hand back its outbound channel
    pub fn subscribe(
        &mut self,
        name: String,
        role: Role,
        seat: Option<Position>,
    ) -> (PeerId, mpsc::Receiver<ServerMessage>) {
        let id = PeerId::now_v7();
        let (tx, rx) = mpsc::channel(OUTBOX);
        self.subscribers.push(Subscriber {
            id,
            name,
            role,
            seat,
            tx,
        });
        (id, rx)
    }
    pub fn drop_peer(&mut self, peer: PeerId) {
        self.subscribers.retain(|s| s.id != peer);
    }
    pub fn seat_of(&self, peer: PeerId) -> Option<Position> {
        self.subscribers
            .iter()
            .find(|s| s.id == peer)
            .and_then(|s| s.seat)
    }
    pub fn role_of(&self, peer: PeerId) -> Option<Role> {
        self.subscribers.iter().find(|s| s.id == peer).map(|s| s.role)
    }
    /// fan one event out to every live subscriber, per-viewer encoded
    pub fn publish(&mut self, event: &Event) {
        log::debug!("[bus {}] {}", self.protocol.game(), event);
        let protocol = &self.protocol;
        self.subscribers.retain(|sub| {
            let message = protocol.encode(event, sub.seat);
            match sub.tx.try_send(message) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    log::warn!("evicting slow consumer {} ({})", sub.name, sub.id);
                    false
                }
                Err(TrySendError::Closed(_)) => false,
            }
        });
    }
    pub fn publish_all(&mut self, events: &[Event]) {
        for event in events {
            self.publish(event);
        }
    }
    /// deliver an event to exactly one peer, from its own perspective
    pub fn request(&mut self, peer: PeerId, event: &Event) {
        let seat = self.seat_of(peer);
        self.send(peer, |protocol| protocol.encode(event, seat));
    }
    /// deliver a raw frame to exactly one peer, typically an error
    pub fn unicast(&mut self, peer: PeerId, message: ServerMessage) {
        self.send(peer, |_| message.clone());
    }
    fn send<F>(&mut self, peer: PeerId, frame: F)
    where
        F: Fn(&Protocol) -> ServerMessage,
    {
        let Some(i) = self.subscribers.iter().position(|s| s.id == peer) else {
            return;
        };
        let message = frame(&self.protocol);
        match self.subscribers[i].tx.try_send(message) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                let sub = self.subscribers.remove(i);
                log::warn!("evicting slow consumer {} ({})", sub.name, sub.id);
            }
            Err(TrySendError::Closed(_)) => {
                self.subscribers.remove(i);
            }
        }
    }
}
