//! Sinks for the human-readable action lines the applier emits.

use colored::Colorize;
use std::cell::RefCell;

/// Prefix marking lines produced in preview mode.
pub const PREVIEW_PREFIX: &str = "[preview]";

/// Fire-and-forget destination for action lines.
pub trait ActionLog {
    fn log(&self, message: &str);
}

impl<T: ActionLog + ?Sized> ActionLog for &T {
    fn log(&self, message: &str) {
        (**self).log(message)
    }
}

/// Prints to stdout, highlighting the preview prefix.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleLog;

impl ActionLog for ConsoleLog {
    fn log(&self, message: &str) {
        match message.strip_prefix(PREVIEW_PREFIX) {
            Some(rest) => println!("{}{}", PREVIEW_PREFIX.cyan(), rest),
            None => println!("{message}"),
        }
    }
}

/// Collects messages in memory.
#[derive(Debug, Default)]
pub struct MemoryLog {
    messages: RefCell<Vec<String>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }
}

impl ActionLog for MemoryLog {
    fn log(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLog;

impl ActionLog for NullLog {
    fn log(&self, _message: &str) {}
}
