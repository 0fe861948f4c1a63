mod settings;

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use crossbeam_channel::{select, Receiver};

use maskwatch_core::annotation::domain::annotation_renderer::AnnotationRenderer;
use maskwatch_core::annotation::domain::classification::Classification;
use maskwatch_core::annotation::domain::session_counters::SessionCounters;
use maskwatch_core::annotation::infrastructure::frame_canvas::FrameCanvas;
use maskwatch_core::annotation::infrastructure::image_file_writer::ImageFileWriter;
use maskwatch_core::capture::infrastructure::ffmpeg_camera_source::{
    FfmpegCameraSource, DEFAULT_DEVICE,
};
use maskwatch_core::capture::infrastructure::image_file_source::ImageFileSource;
use maskwatch_core::inference::infrastructure::http_inference_client::HttpInferenceClient;
use maskwatch_core::inference::infrastructure::jpeg_frame_encoder::JpegFrameEncoder;
use maskwatch_core::monitoring::domain::alert_policy::{self, AlertDecision};
use maskwatch_core::monitoring::domain::backend_monitor::BackendMonitor;
use maskwatch_core::monitoring::domain::mute_timer::SharedMute;
use maskwatch_core::monitoring::domain::risk_level::RiskLevel;
use maskwatch_core::monitoring::infrastructure::http_backend_monitor::HttpBackendMonitor;
use maskwatch_core::monitoring::infrastructure::status_poller::{self, MonitorMessage};
use maskwatch_core::pipeline::activity_log::{ActivityEntry, LoggingActivityLog, Severity};
use maskwatch_core::pipeline::dashboard_state::DashboardState;
use maskwatch_core::pipeline::infrastructure::live_detection_worker::{self, LiveMessage};
use maskwatch_core::pipeline::live_detection_loop::{Cadence, LiveDetectionLoop, SessionEnd};
use maskwatch_core::pipeline::static_detection_use_case::StaticDetectionUseCase;
use maskwatch_core::shared::backend_endpoints::BackendEndpoints;
use maskwatch_core::shared::constants::IMAGE_EXTENSIONS;
use maskwatch_core::shared::resolution::Resolution;

use settings::Settings;

/// Mask detection client for a remote inference service.
#[derive(Parser)]
#[command(name = "maskwatch", version)]
struct Cli {
    /// Backend base URL (overrides settings).
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// HTTP request timeout in seconds (overrides settings).
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Detect masks in one image.
    Detect {
        /// Image file to upload.
        input: PathBuf,

        /// Write the annotated image here.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Size to render the annotated image at, e.g. 1280x720.
        #[arg(long)]
        display: Option<Resolution>,
    },

    /// Run continuous detection on a camera until stopped.
    Live {
        /// Capture device (ffmpeg device name).
        #[arg(long, default_value = DEFAULT_DEVICE)]
        device: String,

        /// Capture size to request from the camera, e.g. 1280x720.
        #[arg(long)]
        capture: Option<Resolution>,

        /// Size to render annotated frames at (defaults to capture size).
        #[arg(long)]
        display: Option<Resolution>,

        /// Size frames are downsampled to before upload (overrides settings).
        #[arg(long)]
        inference: Option<Resolution>,

        /// Milliseconds between cycle starts, 0 = back to back (overrides settings).
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Keep the latest annotated frame in this file.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Save this session's detection history as CSV on exit.
        #[arg(long)]
        history_csv: Option<PathBuf>,

        /// Do not poll /status and /summary.
        #[arg(long)]
        no_monitor: bool,
    },

    /// Show backend status, detection summary and mute state.
    Status {
        /// Also list the most recent logged detections.
        #[arg(long)]
        log: bool,
    },

    /// Mute backend alerts.
    Mute,

    /// Download the backend's detection log as CSV.
    Export {
        #[arg(long, default_value = "detection_log.csv")]
        output: PathBuf,
    },

    /// Print the effective settings.
    Config {
        /// Store them, flags included, as the new defaults.
        #[arg(long)]
        save: bool,
    },
}

/// Effective configuration: settings file overlaid with flags.
struct Config {
    endpoints: BackendEndpoints,
    timeout: Duration,
    settings: Settings,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = Settings::load();
    validate(&cli, &settings)?;
    let config = resolve_config(&cli, settings)?;

    match cli.command {
        Command::Detect {
            input,
            output,
            display,
        } => run_detect(&config, &input, output, display),
        Command::Live {
            device,
            capture,
            display,
            inference,
            interval_ms,
            output,
            history_csv,
            no_monitor,
        } => {
            let inference = inference.unwrap_or(Resolution::new(
                config.settings.inference_width,
                config.settings.inference_height,
            ));
            let cadence =
                Cadence::from_millis(interval_ms.unwrap_or(config.settings.live_interval_ms));
            let source = FfmpegCameraSource::new(&device, capture, display);
            run_live(
                &config,
                source,
                inference,
                cadence,
                output,
                history_csv,
                !no_monitor,
            )
        }
        Command::Status { log } => run_status(&config, log),
        Command::Mute => run_mute(&config),
        Command::Export { output } => run_export(&config, &output),
        Command::Config { save } => run_config(&config, save),
    }
}

fn resolve_config(cli: &Cli, settings: Settings) -> Result<Config, Box<dyn std::error::Error>> {
    let api_url = cli.api_url.as_deref().unwrap_or(&settings.api_url);
    let endpoints = BackendEndpoints::new(api_url)?;
    let timeout = Duration::from_secs(cli.timeout_secs.unwrap_or(settings.request_timeout_secs));
    Ok(Config {
        endpoints,
        timeout,
        settings,
    })
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn validate(cli: &Cli, settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    if cli.timeout_secs.unwrap_or(settings.request_timeout_secs) == 0 {
        return Err("Request timeout must be at least 1 second".into());
    }
    if settings.inference_width == 0 || settings.inference_height == 0 {
        return Err(format!(
            "Inference size must be non-zero, got {}x{} in settings",
            settings.inference_width, settings.inference_height
        )
        .into());
    }
    for (name, quality) in [
        ("live_jpeg_quality", settings.live_jpeg_quality),
        ("static_jpeg_quality", settings.static_jpeg_quality),
    ] {
        if !(1..=100).contains(&quality) {
            return Err(format!("{name} must be between 1 and 100, got {quality}").into());
        }
    }
    if settings.poll_interval_secs == 0 {
        return Err("poll_interval_secs must be at least 1".into());
    }

    match &cli.command {
        Command::Detect { input, output, .. } => {
            if !input.exists() {
                return Err(format!("Input file not found: {}", input.display()).into());
            }
            if !is_image(input) {
                return Err(format!(
                    "Unsupported image type: {} (expected one of {})",
                    input.display(),
                    IMAGE_EXTENSIONS.join(", ")
                )
                .into());
            }
            if let Some(output) = output {
                if !is_image(output) {
                    return Err(format!(
                        "Output must be an image file, got {}",
                        output.display()
                    )
                    .into());
                }
            }
        }
        Command::Live { device, output, .. } => {
            if device.trim().is_empty() {
                return Err("--device must not be empty".into());
            }
            if let Some(output) = output {
                if !is_image(output) {
                    return Err(format!(
                        "Output must be an image file, got {}",
                        output.display()
                    )
                    .into());
                }
            }
        }
        Command::Status { .. }
        | Command::Mute
        | Command::Export { .. }
        | Command::Config { .. } => {}
    }
    Ok(())
}

fn annotated_canvas(output: Option<PathBuf>) -> FrameCanvas {
    match output {
        Some(path) => FrameCanvas::new().with_output(path, Box::new(ImageFileWriter::new())),
        None => FrameCanvas::new(),
    }
}

fn counters_line(counters: &SessionCounters) -> String {
    let mut parts: Vec<String> = Classification::ALL
        .iter()
        .map(|c| format!("{c}: {}", counters.count(*c)))
        .collect();
    parts.push(format!("Total: {}", counters.total));
    parts.join("  ")
}

fn print_counters(counters: &SessionCounters) {
    println!("{}", counters_line(counters));
}

fn run_detect(
    config: &Config,
    input: &Path,
    output: Option<PathBuf>,
    display: Option<Resolution>,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = HttpInferenceClient::new(&config.endpoints, config.timeout)?;
    let output_note = output.clone();
    let mut use_case = StaticDetectionUseCase::new(
        Box::new(ImageFileSource::new(input, display)),
        Box::new(JpegFrameEncoder::new(None, config.settings.static_jpeg_quality)),
        Box::new(client),
        AnnotationRenderer::default(),
        Box::new(annotated_canvas(output)),
    );

    let mut state = DashboardState::new();
    let mut log = LoggingActivityLog::default();
    let batch = use_case.execute(&mut state, &mut log)?;

    if batch.is_empty() {
        println!("No faces detected.");
    }
    for rendered in &batch.boxes {
        let r = rendered.rect;
        println!(
            "{:<10} {}  [{:.0}, {:.0}, {:.0}, {:.0}]",
            rendered.classification.to_string(),
            rendered.detection.caption(),
            r.x1,
            r.y1,
            r.x2,
            r.y2
        );
    }
    print_counters(&state.counters);
    if let Some(path) = output_note {
        println!("Annotated image written to {}", path.display());
    }
    Ok(())
}

enum Key {
    Quit,
    Mute,
    Unmute,
}

/// Reads `q` / `m` / `u` commands from stdin on a helper thread.
fn spawn_key_reader() -> Receiver<Key> {
    let (tx, rx) = crossbeam_channel::unbounded();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            let key = match line.trim() {
                "q" | "quit" => Key::Quit,
                "m" | "mute" => Key::Mute,
                "u" | "unmute" => Key::Unmute,
                _ => continue,
            };
            if tx.send(key).is_err() {
                break;
            }
        }
    });
    rx
}

/// `m:ss`, rounded up so a running mute never shows 0:00.
fn format_countdown(remaining: Duration) -> String {
    let secs = remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
    format!("{}:{:02}", secs / 60, secs % 60)
}

fn mute_alerts(monitor: &dyn BackendMonitor, mute: &SharedMute, duration: Duration) {
    match monitor.mute() {
        Ok(ack) => println!("{}", ack.message),
        Err(e) => log::warn!("Backend mute failed, muting locally only: {e}"),
    }
    mute.mute(duration);
    println!(
        "Muted ({}): alerts and capture paused",
        format_countdown(mute.remaining())
    );
}

/// One line for the terminal feed. `bell` rings the terminal first.
struct FeedLine {
    entry: ActivityEntry,
    bell: bool,
}

impl FeedLine {
    fn info(message: String) -> Self {
        Self {
            entry: ActivityEntry::new(Severity::Info, message),
            bell: false,
        }
    }

    fn print(&self) {
        if self.entry.severity != Severity::Info {
            log::warn!("{}", self.entry.message);
        }
        if self.bell {
            print!("\x07");
        }
        println!("{}", self.entry);
        let _ = io::stdout().flush();
    }
}

/// Turns poller messages into feed lines. The risk tier is shown when it
/// changes; high risk repeats on every poll until muted.
#[derive(Default)]
struct BackendFeed {
    last_level: Option<RiskLevel>,
}

impl BackendFeed {
    fn update(&mut self, message: MonitorMessage, mute: &SharedMute) -> Option<FeedLine> {
        match message {
            MonitorMessage::Status(status) => Some(FeedLine::info(format!("Backend: {status}"))),
            MonitorMessage::Summary(summary) => {
                let level = summary.risk_level();
                let changed = self.last_level.replace(level) != Some(level);
                match alert_policy::evaluate(&summary, &mute.snapshot(), Instant::now()) {
                    AlertDecision::Raise { risk_score } => Some(FeedLine {
                        entry: ActivityEntry::new(
                            Severity::Warning,
                            format!("HIGH RISK ({risk_score:.0}) - type m + Enter to mute"),
                        ),
                        bell: true,
                    }),
                    AlertDecision::Suppressed => changed.then(|| {
                        FeedLine::info(format!(
                            "{level} ({:.0}), muted ({})",
                            summary.risk_score,
                            format_countdown(mute.remaining())
                        ))
                    }),
                    AlertDecision::Quiet(level) => changed.then(|| {
                        FeedLine::info(format!("{level} ({:.0})", summary.risk_score))
                    }),
                }
            }
            MonitorMessage::Unavailable(reason) => Some(FeedLine {
                entry: ActivityEntry::new(
                    Severity::Warning,
                    format!("Backend unavailable: {reason}"),
                ),
                bell: false,
            }),
            MonitorMessage::Stopped => None,
        }
    }
}

fn run_live(
    config: &Config,
    source: FfmpegCameraSource,
    inference: Resolution,
    cadence: Cadence,
    output: Option<PathBuf>,
    history_csv: Option<PathBuf>,
    monitor_enabled: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = HttpInferenceClient::new(&config.endpoints, config.timeout)?;
    let backend = HttpBackendMonitor::new(config.endpoints.clone(), config.timeout)?;
    let mute = SharedMute::new();
    let live_loop = LiveDetectionLoop::new(
        Box::new(source),
        Box::new(JpegFrameEncoder::new(
            Some(inference),
            config.settings.live_jpeg_quality,
        )),
        Box::new(client),
        AnnotationRenderer::default(),
        Box::new(annotated_canvas(output)),
        cadence,
    )
    .with_mute(mute.clone());

    let (live_rx, live_cancel) = live_detection_worker::spawn(live_loop, DashboardState::new());
    let poller = if monitor_enabled {
        let poll_monitor = HttpBackendMonitor::new(config.endpoints.clone(), config.timeout)?;
        Some(status_poller::spawn(
            Box::new(poll_monitor),
            Duration::from_secs(config.settings.poll_interval_secs),
        ))
    } else {
        None
    };
    let monitor_rx = poller
        .as_ref()
        .map(|(rx, _)| rx.clone())
        .unwrap_or_else(crossbeam_channel::never);

    let (interrupt_tx, interrupt_rx) = crossbeam_channel::bounded::<()>(1);
    ctrlc::set_handler(move || {
        let _ = interrupt_tx.try_send(());
    })?;
    let mut key_rx = spawn_key_reader();
    let mut stdin_closed = false;

    let mute_duration = Duration::from_secs(config.settings.mute_minutes * 60);
    let mut feed = BackendFeed::default();
    println!("Type q + Enter (or press Ctrl-C) to stop, m to mute alerts, u to unmute.");

    let outcome = loop {
        select! {
            recv(live_rx) -> message => match message {
                Ok(LiveMessage::Activity(entry)) => println!("{entry}"),
                Ok(LiveMessage::Cycle(snapshot)) => log::debug!(
                    "Cycle {}: total {} ({} failed)",
                    snapshot.cycles,
                    snapshot.counters.total,
                    snapshot.failed_cycles
                ),
                Ok(LiveMessage::Ended { end, state }) => break Ok((end, state)),
                Ok(LiveMessage::Error(e)) => break Err(e),
                Err(_) => break Err("live worker exited unexpectedly".to_string()),
            },
            recv(monitor_rx) -> message => {
                if let Some(line) = message.ok().and_then(|m| feed.update(m, &mute)) {
                    line.print();
                }
            },
            recv(interrupt_rx) -> _ => live_cancel.store(true, Ordering::Relaxed),
            recv(key_rx) -> key => match key {
                Ok(Key::Quit) => live_cancel.store(true, Ordering::Relaxed),
                Ok(Key::Mute) => mute_alerts(&backend, &mute, mute_duration),
                Ok(Key::Unmute) => {
                    mute.unmute();
                    println!("Alerts and capture re-enabled");
                }
                Err(_) => stdin_closed = true,
            },
        }
        if stdin_closed {
            // Keep running until Ctrl-C.
            key_rx = crossbeam_channel::never();
            stdin_closed = false;
        }
    };

    if let Some((_, poll_cancel)) = &poller {
        poll_cancel.store(true, Ordering::Relaxed);
    }

    let (end, state) = outcome?;
    if let SessionEnd::DeviceLost(reason) = &end {
        println!("Camera lost: {reason}");
    }
    println!(
        "Session ended after {} cycles ({} failed).",
        state.cycles, state.failed_cycles
    );
    print_counters(&state.counters);

    if let Some(path) = history_csv {
        if state.history.is_empty() {
            println!("No detections to save.");
        } else {
            state.history.write_csv(&path)?;
            println!(
                "Saved {} records to {}",
                state.history.len(),
                path.display()
            );
        }
    }
    Ok(())
}

fn run_status(config: &Config, show_log: bool) -> Result<(), Box<dyn std::error::Error>> {
    let monitor = HttpBackendMonitor::new(config.endpoints.clone(), config.timeout)?;

    let status = monitor.status()?;
    println!("Backend {}: {status}", config.endpoints.base());

    let summary = monitor.summary()?;
    println!(
        "Summary: with mask {}, no mask {}, incorrect {} | risk {:.0} ({})",
        summary.with_mask,
        summary.no_mask,
        summary.incorrect,
        summary.risk_score,
        summary.risk_level()
    );

    match monitor.mute_status() {
        Ok(mute) if mute.active => println!(
            "Alerts muted until {}",
            mute.until.as_deref().unwrap_or("unknown")
        ),
        Ok(_) => println!("Alerts active"),
        Err(e) => log::warn!("Mute status unavailable: {e}"),
    }

    if show_log {
        let log = monitor.detection_log()?;
        println!("{} detections logged; most recent:", log.count);
        for entry in &log.logs {
            println!(
                "  {}  {:<24} {:.0}%",
                entry.timestamp,
                entry.label,
                entry.confidence * 100.0
            );
        }
    }
    Ok(())
}

fn run_mute(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let monitor = HttpBackendMonitor::new(config.endpoints.clone(), config.timeout)?;
    let ack = monitor.mute()?;
    match ack.until {
        Some(until) => println!("{} (until {until})", ack.message),
        None => println!("{}", ack.message),
    }
    Ok(())
}

fn run_export(config: &Config, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let monitor = HttpBackendMonitor::new(config.endpoints.clone(), config.timeout)?;
    match monitor.export_csv()? {
        Some(csv) => {
            if let Some(parent) = output.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(output, &csv)?;
            println!("Saved {} bytes to {}", csv.len(), output.display());
        }
        None => println!("Nothing to export yet."),
    }
    Ok(())
}

/// Stored settings with the command-line overrides applied.
fn effective_settings(config: &Config) -> Settings {
    Settings {
        api_url: config.endpoints.base().to_string(),
        request_timeout_secs: config.timeout.as_secs(),
        ..config.settings.clone()
    }
}

fn run_config(config: &Config, save: bool) -> Result<(), Box<dyn std::error::Error>> {
    let settings = effective_settings(config);
    println!("{}", serde_json::to_string_pretty(&settings)?);
    if save {
        let path = Settings::config_path().ok_or("No config directory on this platform")?;
        settings.save_to(&path)?;
        println!("Saved to {}", path.display());
    }
    Ok(())
}
