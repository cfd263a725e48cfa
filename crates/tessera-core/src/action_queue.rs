//! Action Queue: thread-safe collection point for worker-produced proposals
//! (spec §4.7). The original is a thin wrapper over `queue.Queue`; here that
//! becomes an MPSC channel (`crossbeam-channel`, already used elsewhere in
//! the teacher's stack) so each worker thread gets its own sender clone and
//! the loop thread drains everything in one pass after dispatch.

use crate::action::ActionProposal;
use crossbeam_channel::{unbounded, Receiver, Sender};

pub struct ActionQueue {
    sender: Sender<ActionProposal>,
    receiver: Receiver<ActionProposal>,
}

impl ActionQueue {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    pub fn sender(&self) -> Sender<ActionProposal> {
        self.sender.clone()
    }

    pub fn push(&self, proposal: ActionProposal) {
        // Disconnection is impossible while `self` holds a receiver.
        let _ = self.sender.send(proposal);
    }

    /// Drains everything currently queued without blocking for more.
    pub fn drain(&self) -> Vec<ActionProposal> {
        self.receiver.try_iter().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

impl Default for ActionQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionTarget;
    use crate::enums::ActionType;
    use crate::ids::EntityId;

    fn sample(actor: u64) -> ActionProposal {
        ActionProposal::new(EntityId::new(actor), ActionType::Rest, ActionTarget::None, "test")
    }

    #[test]
    fn drain_returns_everything_pushed() {
        let queue = ActionQueue::new();
        queue.push(sample(1));
        queue.push(sample(2));
        let drained = queue.drain();
        assert_eq!(drained.len(), 2);
        assert!(queue.is_empty());
    }

    #[test]
    fn drain_on_empty_queue_returns_empty_vec() {
        let queue = ActionQueue::new();
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn cloned_sender_can_push_from_another_thread() {
        let queue = ActionQueue::new();
        let sender = queue.sender();
        let handle = std::thread::spawn(move || {
            let _ = sender.send(sample(7));
        });
        handle.join().unwrap();
        let drained = queue.drain();
        assert_eq!(drained.len(), 1);
    }
}
