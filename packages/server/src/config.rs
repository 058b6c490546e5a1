//! Connection timing and sizing.

use std::time::Duration;

/// Outbound liveness probe period.
pub const DEFAULT_PING_PERIOD: Duration = Duration::from_secs(54);
/// Time allowed between liveness probes from the peer before the read side gives up.
pub const DEFAULT_PONG_WAIT: Duration = Duration::from_secs(60);
/// Time allowed to write a single frame.
pub const DEFAULT_WRITE_WAIT: Duration = Duration::from_secs(10);
/// Largest inbound frame accepted, in bytes.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 512;
/// Messages buffered per connection before the hub evicts it.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;
/// Pending events buffered in front of each hub's coordination loop.
pub const DEFAULT_HUB_INTAKE_CAPACITY: usize = 1024;

/// Per-connection limits shared by admission and both pumps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub ping_period: Duration,
    pub pong_wait: Duration,
    pub write_wait: Duration,
    pub max_message_size: usize,
    pub queue_capacity: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            ping_period: DEFAULT_PING_PERIOD,
            pong_wait: DEFAULT_PONG_WAIT,
            write_wait: DEFAULT_WRITE_WAIT,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl ConnectionConfig {
    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity.max(1);
        self
    }
}
