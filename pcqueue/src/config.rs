//! Configuration for queues and managed channels.

/// Capacity value meaning "no bound".
pub const UNBOUNDED: usize = 0;

/// Default prefix for worker thread names.
pub const DEFAULT_THREAD_NAME: &str = "pcqueue";

/// Configuration for a [`BoundedQueue`](crate::BoundedQueue).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueConfig {
    /// Maximum number of buffered items; [`UNBOUNDED`] disables the bound.
    pub capacity: usize,
}

impl QueueConfig {
    /// Creates an unbounded queue configuration.
    pub fn new() -> Self {
        Self {
            capacity: UNBOUNDED,
        }
    }

    /// Sets the capacity bound; [`UNBOUNDED`] removes it.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for a [`ManagedChannel`](crate::ManagedChannel).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Configuration of the inner queue.
    pub queue: QueueConfig,

    /// Prefix for spawned thread names, e.g. `pcqueue-producer-3`.
    pub thread_name: String,

    /// Stack size for spawned threads; `None` uses the platform default.
    pub stack_size: Option<usize>,
}

impl ChannelConfig {
    /// Creates a configuration with an unbounded queue and default thread names.
    pub fn new() -> Self {
        Self {
            queue: QueueConfig::new(),
            thread_name: DEFAULT_THREAD_NAME.to_string(),
            stack_size: None,
        }
    }

    /// Sets the capacity bound of the inner queue.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.queue = self.queue.with_capacity(capacity);
        self
    }

    /// Sets the prefix used for spawned thread names.
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Sets the stack size of spawned threads.
    pub fn with_stack_size(mut self, size: usize) -> Self {
        self.stack_size = Some(size);
        self
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self::new()
    }
}
