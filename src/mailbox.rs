use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use dashmap::DashMap;
use futures_util::{stream, Stream};
use log::debug;
use tokio::sync::Notify;

use crate::{
    game::player::{Player, Role},
    message::GameMessage,
};

struct Queue {
    messages: VecDeque<GameMessage>,
    closed: bool,
}

/// A player's outbound messages, in the order they were sent.
///
/// Any number of producers may push concurrently. `recv` waits until there is something to
/// deliver and only returns `None` once the mailbox is closed and drained.
pub struct Mailbox {
    queue: Mutex<Queue>,
    notify: Notify,
}

impl Default for Mailbox {
    fn default() -> Self {
        Mailbox::new()
    }
}

impl Mailbox {
    pub fn new() -> Mailbox {
        Mailbox {
            queue: Mutex::new(Queue {
                messages: VecDeque::new(),
                closed: false,
            }),
            notify: Notify::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Queue> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns false if the mailbox is closed and the message was dropped
    pub fn push(&self, message: GameMessage) -> bool {
        {
            let mut queue = self.lock();
            if queue.closed {
                return false;
            }
            queue.messages.push_back(message);
        }
        self.notify.notify_one();
        true
    }

    pub fn try_recv(&self) -> Option<GameMessage> {
        self.lock().messages.pop_front()
    }

    pub async fn recv(&self) -> Option<GameMessage> {
        loop {
            // Registered before checking the queue so a push in between still wakes us
            let notified = self.notify.notified();
            {
                let mut queue = self.lock();
                if let Some(message) = queue.messages.pop_front() {
                    return Some(message);
                }
                if queue.closed {
                    return None;
                }
            }
            notified.await;
        }
    }

    /// Stops accepting messages. Whatever is already queued is still delivered.
    pub fn close(&self) {
        self.lock().closed = true;
        self.notify.notify_waiters();
    }

    /// Stops accepting messages and throws away anything undelivered
    pub fn tear_down(&self) {
        {
            let mut queue = self.lock();
            queue.closed = true;
            queue.messages.clear();
        }
        self.notify.notify_waiters();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }
}

/// The consuming end of one player's mailbox. Dropping it tears the mailbox down, so a player
/// should hold one stream at a time.
pub struct MessageStream {
    mailbox: Arc<Mailbox>,
}

impl MessageStream {
    pub fn new(mailbox: Arc<Mailbox>) -> MessageStream {
        MessageStream { mailbox }
    }

    pub async fn recv(&mut self) -> Option<GameMessage> {
        self.mailbox.recv().await
    }

    pub fn try_recv(&mut self) -> Option<GameMessage> {
        self.mailbox.try_recv()
    }

    pub fn into_stream(self) -> impl Stream<Item = GameMessage> + Send + 'static {
        stream::unfold(self, |mut messages| async move {
            let message = messages.recv().await?;
            Some((message, messages))
        })
    }
}

impl Drop for MessageStream {
    fn drop(&mut self) {
        self.mailbox.tear_down();
    }
}

/// Owns every player's mailbox and fans messages out to them
#[derive(Default)]
pub struct Broadcaster {
    mailboxes: DashMap<String, Arc<Mailbox>>,
}

impl Broadcaster {
    pub fn new() -> Broadcaster {
        Broadcaster {
            mailboxes: DashMap::new(),
        }
    }

    /// Returns the player's mailbox, creating it on first use and replacing one that was
    /// torn down
    pub fn open(&self, username: &str) -> Arc<Mailbox> {
        let mut entry = self
            .mailboxes
            .entry(username.to_string())
            .or_insert_with(|| Arc::new(Mailbox::new()));
        if entry.is_closed() {
            *entry = Arc::new(Mailbox::new());
        }
        entry.clone()
    }

    /// Discards the player's pending messages and refuses new ones until the mailbox is
    /// opened again
    pub fn close(&self, username: &str) {
        if let Some(mailbox) = self.mailboxes.get(username) {
            mailbox.tear_down();
        }
    }

    /// Only delivers to open mailboxes, never creates one
    pub fn send_to(&self, username: &str, message: GameMessage) {
        let delivered = self
            .mailboxes
            .get(username)
            .is_some_and(|mailbox| mailbox.push(message));
        if !delivered {
            debug!("Dropped message for {username}: no open mailbox");
        }
    }

    /// Sends to every player whose role matches `role_filter`, or to everyone when it is `None`.
    /// Eliminated players are included.
    pub fn send<'a>(
        &self,
        players: impl IntoIterator<Item = &'a Player>,
        message: &GameMessage,
        role_filter: Option<Role>,
    ) {
        for player in players {
            if role_filter.is_none() || player.role == role_filter {
                self.send_to(&player.username, message.clone());
            }
        }
    }

    pub fn close_all(&self) {
        for entry in self.mailboxes.iter() {
            entry.value().close();
        }
    }
}

#[cfg(test)]
impl Broadcaster {
    fn mailbox(&self, username: &str) -> Option<Arc<Mailbox>> {
        self.mailboxes.get(username).map(|m| m.value().clone())
    }
}
