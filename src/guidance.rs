//! Spoken guidance: one prioritized corrective instruction per cycle.

use crate::config::GuidanceConfig;
use crate::validation::ValidationCheck;
use log::info;
use std::time::{Duration, Instant};

/// Speech/voice output sink, consumed at its interface boundary.
pub trait GuidanceSink {
    /// Speak one instruction
    fn speak(&mut self, message: &str);

    /// Stop any in-flight speech
    fn cancel(&mut self) {}
}

/// Sink that logs instead of speaking; used headless and in tests
#[derive(Debug, Default)]
pub struct LogSink;

impl GuidanceSink for LogSink {
    fn speak(&mut self, message: &str) {
        info!("guidance: {message}");
    }
}

/// Picks the most important failed check every cycle and speaks at most one
/// corrective phrase, debounced so the same instruction is not repeated
/// within the cooldown window.
pub struct GuidanceController {
    sink: Box<dyn GuidanceSink>,
    enabled: bool,
    cooldown: Duration,
    last_message: String,
    last_spoken: Option<Instant>,
}

impl GuidanceController {
    #[must_use]
    pub fn new(sink: Box<dyn GuidanceSink>, config: &GuidanceConfig) -> Self {
        Self {
            sink,
            enabled: config.enabled,
            cooldown: Duration::from_millis(config.debounce_ms),
            last_message: String::new(),
            last_spoken: None,
        }
    }

    /// Speak a phrase unless the identical phrase is still inside its cooldown
    pub fn speak(&mut self, message: &str) {
        if !self.enabled {
            return;
        }
        let now = Instant::now();
        if message == self.last_message {
            if let Some(last) = self.last_spoken {
                if now.duration_since(last) < self.cooldown {
                    return;
                }
            }
        }
        self.sink.speak(message);
        self.last_message = message.to_string();
        self.last_spoken = Some(now);
    }

    /// Speak the highest-priority corrective instruction for a checklist.
    ///
    /// Priority: distance, then position, then tilt, rotation, lighting, eyes.
    /// A fully passing checklist speaks nothing.
    pub fn speak_guidance(&mut self, checks: &[ValidationCheck]) {
        if !self.enabled {
            return;
        }

        let failed = |id: &str| checks.iter().find(|c| c.id == id && !c.passed);

        if let Some(distance) = failed("distance") {
            if distance.message.contains("closer") {
                self.speak("Please move closer to the camera");
            } else if distance.message.contains("back") {
                self.speak("Please move back from the camera");
            }
            return;
        }
        if failed("face-detected").is_some() || failed("face-in-guide").is_some() {
            self.speak("Please center your face in the oval guide");
            return;
        }
        if failed("head-straight").is_some() {
            self.speak("Please keep your head straight, avoid tilting");
            return;
        }
        if failed("no-rotation").is_some() {
            self.speak("Please look straight at the camera");
            return;
        }
        if let Some(lighting) = failed("lighting") {
            self.speak(&lighting.message);
            return;
        }
        if failed("eyes-open").is_some() {
            self.speak("Please keep your eyes open");
        }
    }

    /// Stop speech and forget the debounce history
    pub fn cancel(&mut self) {
        self.sink.cancel();
        self.last_message.clear();
        self.last_spoken = None;
    }
}
