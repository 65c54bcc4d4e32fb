use anyhow::Result;
use api::{ClassificationResult, FrameOutput, FrameSink, Vowel};
use log::{debug, info};

/// Logs vowel changes and quality rejections.
pub struct LogSink {
    last_vowel: Vowel,
}

impl LogSink {
    pub fn new() -> Self {
        Self {
            last_vowel: Vowel::Absent,
        }
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSink for LogSink {
    fn on_frame(&mut self, output: &FrameOutput) -> Result<()> {
        if !output.quality.passed {
            if let Some(reason) = &output.quality.reason {
                debug!("Frame rejected: {}", reason);
            }
        }
        Ok(())
    }

    fn on_vowel(&mut self, result: &ClassificationResult) -> Result<()> {
        if result.vowel != self.last_vowel {
            info!(
                "Vowel: {} (confidence {:.0}%)",
                result.vowel.label(),
                result.confidence * 100.0
            );
            self.last_vowel = result.vowel;
        }
        Ok(())
    }
}
