//! Output events from a running process

/// A line of output (or the start marker) from a process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEvent {
    /// The type of event
    pub event_type: ProcessEventType,
    /// The output line, without its trailing newline
    pub data: Option<String>,
}

impl ProcessEvent {
    /// Create an event without data
    pub fn new(event_type: ProcessEventType) -> Self {
        Self {
            event_type,
            data: None,
        }
    }

    /// Create an event carrying an output line
    pub fn new_with_data(event_type: ProcessEventType, data: String) -> Self {
        Self {
            event_type,
            data: Some(data),
        }
    }
}

/// Types of process events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEventType {
    /// Process has started
    Started {
        /// OS process id
        pid: u32,
    },
    /// Line from stdout
    Stdout,
    /// Line from stderr
    Stderr,
}
