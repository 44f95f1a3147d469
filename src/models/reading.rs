use std::{fmt::Display, time::Duration};

/// Edges counted on a sensor's pin over one sampling window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reading {
    pub count: u32,
    /// Nominal width of the counting window.
    pub window: Duration,
}

impl Reading {
    pub fn new(count: u32, window: Duration) -> Self {
        Self { count, window }
    }

    /// Signal frequency in Hz. A zero-width window yields 0.
    pub fn frequency_hz(&self) -> f64 {
        let seconds = self.window.as_secs_f64();
        if seconds > 0f64 {
            self.count as f64 / seconds
        } else {
            0f64
        }
    }

    pub fn is_zero(&self) -> bool {
        self.count == 0
    }
}

impl Display for Reading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "(Reading: count={}, window={}ms)",
            self.count,
            self.window.as_millis()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_over_one_second() {
        let reading = Reading::new(745, Duration::from_millis(1000));
        assert_eq!(reading.frequency_hz(), 745f64);
    }

    #[test]
    fn test_frequency_over_short_window() {
        let reading = Reading::new(50, Duration::from_millis(250));
        assert_eq!(reading.frequency_hz(), 200f64);
    }

    #[test]
    fn test_zero_window() {
        let reading = Reading::new(12, Duration::ZERO);
        assert_eq!(reading.frequency_hz(), 0f64);
    }
}
