//! Elapsed-time display for the record button.

/// Format seconds as `HH:MM:SS`; hours are not wrapped
pub fn format_hms(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Counts whole seconds; the platform drives `tick` once per second
#[derive(Debug, Clone, Default)]
pub struct RecordingTimer {
    elapsed: u64,
}

impl RecordingTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed
    }

    /// Advance one second and return the new display text
    pub fn tick(&mut self) -> String {
        self.elapsed += 1;
        self.display()
    }

    pub fn display(&self) -> String {
        format_hms(self.elapsed)
    }

    pub fn reset(&mut self) -> String {
        self.elapsed = 0;
        self.display()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_hms() {
        assert_eq!(format_hms(0), "00:00:00");
        assert_eq!(format_hms(59), "00:00:59");
        assert_eq!(format_hms(61), "00:01:01");
        assert_eq!(format_hms(3_661), "01:01:01");
        assert_eq!(format_hms(100 * 3600), "100:00:00");
    }

    #[test]
    fn test_tick_and_reset() {
        let mut timer = RecordingTimer::new();
        assert_eq!(timer.display(), "00:00:00");
        for _ in 0..59 {
            timer.tick();
        }
        assert_eq!(timer.tick(), "00:01:00");
        assert_eq!(timer.elapsed_secs(), 60);
        assert_eq!(timer.reset(), "00:00:00");
    }
}
