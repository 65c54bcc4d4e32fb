use anyhow::Result;
use api::LandmarkSource;
use common::{Baseline, TrackerConfig, VowelTracker};
use log::{error, info, warn};
use vowel_d::dispatcher::Dispatcher;
use vowel_d::sinks::LogSink;
use vowel_d::synthetic::SyntheticSource;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const BASELINE_PATH: &str = "baseline_default.json";

fn load_config(path: &Path) -> Result<TrackerConfig> {
    if path.exists() {
        info!("Loading config from {:?}", path);
        let file = fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let config = serde_json::from_reader(reader)?;
        Ok(config)
    } else {
        info!("Config not found. Creating default at {:?}", path);
        let config = TrackerConfig::default();
        let file = fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &config)?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    info!("Starting...");

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        info!("Received Ctrl-C, shutting down...");
        r.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl-C handler");

    let config_path = Path::new("config.json");
    let config = load_config(config_path).unwrap_or_else(|e| {
        error!("Failed to load config: {}. Using defaults.", e);
        TrackerConfig::default()
    });

    let mut tracker = VowelTracker::new(config.clone());

    match Baseline::load(Path::new(BASELINE_PATH)) {
        Ok(Some(baseline)) => tracker.set_baseline(baseline),
        Ok(None) => info!("No saved baseline; starting uncalibrated."),
        Err(e) => error!("Failed to load baseline: {}", e),
    }

    let mut dispatcher = Dispatcher::new();
    dispatcher.add_sink(Box::new(LogSink::new()));
    dispatcher.initialize()?;

    let mut source = SyntheticSource::new();
    source.initialize()?;

    tracker.start();

    // The synthetic source holds a closed mouth at startup; use that
    // window to calibrate when no saved baseline exists.
    let needs_calibration = tracker.baseline().is_none();

    let session_start = Instant::now();
    let target_frame_duration = config.max_fps.map(|fps| Duration::from_secs_f32(1.0 / fps));

    let mut frame_count: u64 = 0;
    let mut log_interval: u64 = 1000;
    let mut last_log = Instant::now();
    let mut last_frame_time = Instant::now();
    let mut was_calibrating = false;
    let mut calibration_requested = needs_calibration;

    info!("Entering main loop...");

    while running.load(Ordering::SeqCst) {
        let now_ms = session_start.elapsed().as_secs_f64() * 1000.0;

        let detection = match source.poll() {
            Ok(d) => d,
            Err(e) => {
                warn!("Source poll failed: {}", e);
                None
            }
        };

        if calibration_requested && now_ms > 500.0 {
            match tracker.start_calibration(now_ms) {
                Ok(()) => info!("Calibration session started"),
                Err(e) => warn!("Could not start calibration: {}", e),
            }
            calibration_requested = false;
        }

        let output = match &detection {
            Some(frame) => tracker.process_frame(now_ms, Some(&frame.landmarks), frame.confidence),
            None => tracker.process_frame(now_ms, None, 0.0),
        };

        let is_calibrating = tracker.is_calibrating();
        if was_calibrating && !is_calibrating {
            if let Some(baseline) = tracker.baseline() {
                info!("Calibration finished; saving to {}", BASELINE_PATH);
                if let Err(e) = baseline.save(Path::new(BASELINE_PATH)) {
                    error!("Failed to save baseline: {}", e);
                }
            }
        }
        was_calibrating = is_calibrating;

        dispatcher.send(&output);

        #[cfg(feature = "xtralog")]
        if let Some(classification) = &output.classification {
            log::trace!(
                "frame at {:.0}ms: {} ({:.2})",
                now_ms,
                classification.vowel.label(),
                classification.confidence
            );
        }

        frame_count += 1;
        if frame_count % log_interval == 0 {
            let elapsed = last_log.elapsed().as_secs_f32();
            let fps = log_interval as f32 / elapsed;
            info!(
                "Tracking active: processed {} frames (approx {:.1} FPS)",
                frame_count, fps
            );
            last_log = Instant::now();

            if frame_count >= 100_000 {
                log_interval = 100_000;
            } else if frame_count >= 10_000 {
                log_interval = 10_000;
            }
        }

        if let Some(target_duration) = target_frame_duration {
            let elapsed = last_frame_time.elapsed();
            if elapsed < target_duration {
                thread::sleep(target_duration - elapsed);
            }
        }
        last_frame_time = Instant::now();
    }

    info!("Shutting down...");
    tracker.stop();
    source.unload();
    Ok(())
}
