use anyhow::Result;
use api::{FrameOutput, FrameSink};
use log::error;

/// Fans each processed frame out to the registered sinks.
///
/// Called once per frame after the tracker has finished, so sinks can
/// never re-enter the pipeline mid-mutation. A failing sink is logged
/// and skipped; the others still receive the frame.
pub struct Dispatcher {
    sinks: Vec<Box<dyn FrameSink>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn add_sink(&mut self, sink: Box<dyn FrameSink>) {
        self.sinks.push(sink);
    }

    pub fn initialize(&mut self) -> Result<()> {
        for sink in &mut self.sinks {
            sink.initialize()?;
        }
        Ok(())
    }

    pub fn send(&mut self, output: &FrameOutput) {
        for sink in &mut self.sinks {
            if let Err(e) = sink.on_frame(output) {
                error!("Sink failed to accept frame: {}", e);
                continue;
            }
            if let Some(classification) = &output.classification {
                if let Err(e) = sink.on_vowel(classification) {
                    error!("Sink failed to accept classification: {}", e);
                }
            }
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}
