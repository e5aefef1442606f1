use std::time::{Duration, Instant};

/// Fixed-interval frame pacer.
///
/// Sleeps out the remainder of each frame slot, compensating for the time
/// the loop spent reading and rendering. A blocking read on a quiet pipe can
/// stall the loop for many slots; the pacer resynchronizes instead of
/// fast-forwarding through the missed frames.
pub struct FramePacer {
    target_fps: u32,
    frame_duration: Duration,
    next_frame_time: Instant,
    frames_rendered: u64,
}

impl FramePacer {
    /// Create a pacer targeting `fps` frames per second (clamped to >= 1).
    pub fn new(fps: u32) -> Self {
        let target_fps = fps.max(1);
        let frame_duration = Duration::from_secs_f64(1.0 / target_fps as f64);
        Self {
            target_fps,
            frame_duration,
            next_frame_time: Instant::now() + frame_duration,
            frames_rendered: 0,
        }
    }

    /// Wait until it's time for the next frame.
    ///
    /// Returns immediately when the loop is already past the slot. More than
    /// three slots behind means the input was quiet, not that the renderer
    /// is slow; re-anchor the schedule to now rather than skipping ahead.
    pub fn wait_for_next_frame(&mut self) {
        let now = Instant::now();

        if now > self.next_frame_time + self.frame_duration * 3 {
            self.next_frame_time = now + self.frame_duration;
            self.frames_rendered += 1;
            return;
        }

        if now < self.next_frame_time {
            std::thread::sleep(self.next_frame_time - now);
        }

        self.next_frame_time += self.frame_duration;
        self.frames_rendered += 1;
    }

    pub fn stats(&self) -> PacerStats {
        PacerStats {
            frames_rendered: self.frames_rendered,
            target_fps: self.target_fps,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PacerStats {
    pub frames_rendered: u64,
    pub target_fps: u32,
}

impl PacerStats {
    pub fn effective_fps(&self, elapsed: Duration) -> f64 {
        if elapsed.as_secs_f64() > 0.0 {
            self.frames_rendered as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_rendered_frames() {
        let mut pacer = FramePacer::new(1000);
        pacer.wait_for_next_frame();
        pacer.wait_for_next_frame();
        assert_eq!(pacer.stats().frames_rendered, 2);
    }

    #[test]
    fn test_zero_fps_is_clamped() {
        let pacer = FramePacer::new(0);
        assert_eq!(pacer.stats().target_fps, 1);
    }

    #[test]
    fn test_resyncs_after_stall_instead_of_bursting() {
        let mut pacer = FramePacer::new(200);
        std::thread::sleep(Duration::from_millis(50));

        // well past the 5ms slot: the next wait must not sleep the backlog out
        let before = Instant::now();
        pacer.wait_for_next_frame();
        assert!(before.elapsed() < Duration::from_millis(5));

        // and the schedule is re-anchored, so the following wait sleeps again
        let before = Instant::now();
        pacer.wait_for_next_frame();
        assert!(before.elapsed() >= Duration::from_millis(3));
    }

    #[test]
    fn test_effective_fps() {
        let stats = PacerStats {
            frames_rendered: 40,
            target_fps: 20,
        };
        let fps = stats.effective_fps(Duration::from_secs(2));
        assert!((fps - 20.0).abs() < f64::EPSILON);
        assert_eq!(stats.effective_fps(Duration::ZERO), 0.0);
    }
}
