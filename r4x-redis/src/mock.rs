//! In-memory connector for tests.
//!
//! [`MockConnector`] records every connection attempt and every issued
//! command, and answers commands from a queue of scripted replies.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use r4x_core::{CommandArgv, Error, RedisReply};
use tokio::sync::Notify;

use crate::{CommandExecutor, Connector, Endpoint};

#[derive(Debug, Default)]
struct MockState {
    connect_count: AtomicUsize,
    refuse_connections: AtomicBool,
    hold_replies: AtomicBool,
    release: Notify,
    commands: Mutex<Vec<CommandArgv>>,
    replies: Mutex<VecDeque<Result<RedisReply, String>>>,
}

/// Connector whose connections answer from a reply queue.
///
/// When the queue is empty, commands are answered with `+OK`.
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    state: Arc<MockState>,
}

/// Connection handed out by [`MockConnector`].
#[derive(Debug, Clone)]
pub struct MockConnection {
    state: Arc<MockState>,
}

impl MockConnector {
    /// Creates a connector that accepts connections.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following connection attempt fail (or succeed again).
    pub fn refuse_connections(&self, refuse: bool) {
        self.state.refuse_connections.store(refuse, Ordering::SeqCst);
    }

    /// Keeps issued commands waiting for their reply until released.
    pub fn hold_replies(&self, hold: bool) {
        self.state.hold_replies.store(hold, Ordering::SeqCst);
        if !hold {
            self.state.release.notify_waiters();
        }
    }

    /// Queues the reply for the next command.
    pub fn push_reply(&self, reply: RedisReply) {
        self.lock_replies().push_back(Ok(reply));
    }

    /// Queues a transport failure for the next command.
    pub fn push_failure(&self, message: impl Into<String>) {
        self.lock_replies().push_back(Err(message.into()));
    }

    /// Number of connection attempts so far.
    pub fn connect_count(&self) -> usize {
        self.state.connect_count.load(Ordering::SeqCst)
    }

    /// Every command issued so far, in order.
    pub fn commands(&self) -> Vec<CommandArgv> {
        self.state
            .commands
            .lock()
            .map(|commands| commands.clone())
            .unwrap_or_default()
    }

    fn lock_replies(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<RedisReply, String>>> {
        self.state
            .replies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Connector for MockConnector {
    type Connection = MockConnection;

    async fn connect(&self, endpoint: &Endpoint) -> Result<Self::Connection, Error> {
        self.state.connect_count.fetch_add(1, Ordering::SeqCst);
        if self.state.refuse_connections.load(Ordering::SeqCst) {
            return Err(Error::ConnectionUnavailable {
                endpoint: endpoint.to_string(),
                source: "connection refused".into(),
            });
        }
        Ok(MockConnection {
            state: Arc::clone(&self.state),
        })
    }
}

#[async_trait]
impl CommandExecutor for MockConnection {
    async fn execute(&self, argv: CommandArgv) -> Result<RedisReply, Error> {
        if let Ok(mut commands) = self.state.commands.lock() {
            commands.push(argv);
        }
        loop {
            let released = self.state.release.notified();
            if !self.state.hold_replies.load(Ordering::SeqCst) {
                break;
            }
            released.await;
        }
        let next = self
            .state
            .replies
            .lock()
            .ok()
            .and_then(|mut replies| replies.pop_front());
        match next {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(Error::transport(message)),
            None => Ok(RedisReply::status("OK")),
        }
    }
}
