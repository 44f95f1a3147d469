use std::fmt::Display;

use super::pin::Pin;

/// Logic level reported for a pin transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

/// A single transition observed on an input pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeEvent {
    pub pin: Pin,
    pub level: Level,
}

impl EdgeEvent {
    pub fn rising(pin: Pin) -> Self {
        Self {
            pin,
            level: Level::High,
        }
    }

    pub fn falling(pin: Pin) -> Self {
        Self {
            pin,
            level: Level::Low,
        }
    }

    /// The wave went up.
    pub fn is_rising(&self) -> bool {
        self.level == Level::High
    }
}

impl Display for EdgeEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<Edge | pin:{}, level:{:?}>", self.pin, self.level)
    }
}
