//! Fixed-capacity ring of records that is pushed to a target handler once a record at or
//! above the push level arrives (or when [`MemoryHandler::push`] is called).

use super::{Handler, HandlerCore};
use crate::config::HandlerContext;
use crate::fmt::SimpleFormatter;
use crate::internal;
use crate::level::Level;
use crate::record::LogRecord;
use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::sync::Arc;

const DEFAULT_SIZE: usize = 1000;

pub struct MemoryHandler {
    core: HandlerCore,
    target: Arc<dyn Handler>,
    push_level: RwLock<Level>,
    capacity: usize,
    buffer: Mutex<VecDeque<LogRecord>>,
}

impl MemoryHandler {
    /// # Errors
    /// [`crate::Error::InvalidArgument`] when `size` is zero.
    pub fn new(
        target: Arc<dyn Handler>,
        size: usize,
        push_level: Level,
    ) -> Result<Self, crate::Error> {
        if size == 0 {
            return Err(crate::Error::InvalidArgument(
                "MemoryHandler size must be positive".to_string(),
            ));
        }
        Ok(Self::assemble(
            HandlerCore::new(Level::ALL, Arc::new(SimpleFormatter::new())),
            target,
            size,
            push_level,
        ))
    }

    /// Reads `<name>.size` (non-positive or malformed falls back to 1000), `<name>.push`
    /// (default `SEVERE`) and the mandatory `<name>.target`.
    ///
    /// # Errors
    /// [`crate::Error::Configuration`] when the target is missing or cannot be built.
    pub fn from_config(ctx: &HandlerContext<'_>) -> Result<Self, crate::Error> {
        let target_name = ctx.property("target").ok_or_else(|| {
            crate::Error::Configuration(format!("{}.target is not set", ctx.name()))
        })?;
        let target = ctx.create_handler(target_name).map_err(|e| {
            crate::Error::Configuration(format!(
                "{}.target '{target_name}' cannot be created: {e}",
                ctx.name()
            ))
        })?;

        let size = match ctx.property("size").map(str::parse::<i64>) {
            Some(Ok(n)) if n > 0 => usize::try_from(n).unwrap_or(DEFAULT_SIZE),
            Some(_) => {
                internal::warn(
                    "CONFIG",
                    &format!("{}.size is not a positive integer, using {DEFAULT_SIZE}", ctx.name()),
                );
                DEFAULT_SIZE
            }
            None => DEFAULT_SIZE,
        };
        let push_level = ctx.level("push", Level::SEVERE);

        let core = HandlerCore::from_config(ctx, Level::ALL, || {
            Arc::new(SimpleFormatter::from_properties(ctx.properties()))
        });
        Ok(Self::assemble(core, target, size, push_level))
    }

    fn assemble(
        core: HandlerCore,
        target: Arc<dyn Handler>,
        capacity: usize,
        push_level: Level,
    ) -> Self {
        Self {
            core,
            target,
            push_level: RwLock::new(push_level),
            capacity,
            buffer: Mutex::new(VecDeque::with_capacity(capacity.min(DEFAULT_SIZE))),
        }
    }

    /// Records at or above this level push the buffer to the target.
    #[must_use]
    pub fn push_level(&self) -> Level {
        *self.push_level.read()
    }

    /// Changes the push threshold without pushing.
    pub fn set_push_level(&self, level: Level) {
        *self.push_level.write() = level;
    }

    /// Maximum number of buffered records; the oldest is dropped beyond it.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Handler that receives pushed records.
    #[must_use]
    pub fn target(&self) -> &Arc<dyn Handler> {
        &self.target
    }

    /// Number of records currently buffered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.lock().len()
    }

    /// `true` when nothing is waiting for a push.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.lock().is_empty()
    }

    /// Sends every buffered record to the target, oldest first, and empties the buffer.
    pub fn push(&self) {
        let drained: Vec<LogRecord> = self.buffer.lock().drain(..).collect();
        for record in &drained {
            self.target.publish(record);
        }
    }
}

impl Handler for MemoryHandler {
    fn core(&self) -> &HandlerCore {
        &self.core
    }

    fn publish(&self, record: &LogRecord) {
        if !self.is_loggable(record) {
            return;
        }

        {
            let mut buffer = self.buffer.lock();
            if buffer.len() == self.capacity {
                buffer.pop_front();
            }
            buffer.push_back(record.clone());
        }

        if record.level() >= self.push_level() {
            self.push();
        }
    }

    /// Flushes the target; the buffer is left alone.
    fn flush(&self) {
        self.target.flush();
    }

    /// Closes the target and stops accepting records; the buffer is left alone.
    fn close(&self) {
        self.target.close();
        self.core.set_level(Level::OFF);
    }
}
