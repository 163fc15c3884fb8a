//! moodmesh - headless driver for the audio-reactive creature pipeline
//!
//! Feeds a WAV file or the microphone through a session, writes the
//! recorded timeline, and waits for authored plans and targets.

mod cli;

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{debug, info, warn};

use cli::Args;
use moodmesh::audio::{FileSource, SpectrumAnalyzer};
use moodmesh::authoring::{AuthoringKind, FileAuthor, PlanAuthor, TargetAuthor};
use moodmesh::logging;
use moodmesh::params::Config;
use moodmesh::session::{Session, SessionAuthors, TickInput};
use moodmesh::timeline::{AudioTimeline, PlaybackClock, SourceKind};

/// Default length of a microphone session (seconds)
#[cfg(feature = "mic")]
const DEFAULT_MIC_SECONDS: f64 = 30.0;

/// How long to wait for authors after the session stops
const AUTHORING_TIMEOUT: Duration = Duration::from_secs(30);

fn main() -> Result<()> {
    let args = Args::parse();
    let config = args.load_config()?;
    logging::init(&config.log);

    let dt = args.tick_seconds()?;
    let authors = authors_from(&args);

    if let Some(path) = &args.file {
        run_file(&args, config, authors, path, dt)
    } else if args.mic {
        run_mic(&args, config, authors, dt)
    } else {
        bail!("Nothing to do: pass --file <WAV> or --mic");
    }
}

fn authors_from(args: &Args) -> SessionAuthors {
    SessionAuthors {
        plan: args
            .plan
            .as_ref()
            .map(|p| Arc::new(FileAuthor::new(p)) as Arc<dyn PlanAuthor>),
        target: args
            .target
            .as_ref()
            .map(|p| Arc::new(FileAuthor::new(p)) as Arc<dyn TargetAuthor>),
    }
}

fn run_file(args: &Args, config: Config, authors: SessionAuthors, path: &Path, dt: f64) -> Result<()> {
    let (mut source, mut analyzer, mut session) = start_file_session(path, config, authors)
        .with_context(|| format!("Failed to start session for {}", path.display()))?;
    let limit = args.seconds.unwrap_or(f64::INFINITY);

    info!(
        "Playing {} ({:.1}s @ {}Hz)",
        path.display(),
        source.duration_s(),
        source.sample_rate_hz()
    );

    play_file(&mut session, &mut source, &mut analyzer, dt, limit);
    let timeline = session.stop();
    write_timeline(args, &timeline)?;
    finish_authoring(&mut session);

    if args.replay {
        if session.plan().is_none() {
            warn!("No plan accepted, skipping replay");
        } else {
            session.replay();
            source.seek(0.0);
            play_file(&mut session, &mut source, &mut analyzer, dt, limit);
            session.stop();
            finish_authoring(&mut session);
        }
    }

    report(&session);
    Ok(())
}

fn start_file_session(
    path: &Path,
    config: Config,
    authors: SessionAuthors,
) -> moodmesh::Result<(FileSource, SpectrumAnalyzer, Session)> {
    let source = FileSource::open(path)?;
    let analyzer = SpectrumAnalyzer::new(&config.features);
    let session = Session::start(config, SourceKind::File, Some(source.duration_s()), authors)?;
    Ok((source, analyzer, session))
}

/// Virtual-clock playback, as fast as the pipeline runs
fn play_file(
    session: &mut Session,
    source: &mut FileSource,
    analyzer: &mut SpectrumAnalyzer,
    dt: f64,
    limit: f64,
) {
    let started = Instant::now();
    let mut ticks = 0u64;
    let mut next_report = 1.0;

    while !source.is_finished() && source.position_s() < limit {
        let analysis = analyzer.analyze(source.window(analyzer.fft_size()), source.sample_rate_hz());
        let frame = session.tick(TickInput {
            analysis: &analysis,
            clock: PlaybackClock::Media {
                position_s: source.position_s(),
            },
            dt_s: dt,
            pointer: None,
        });
        if source.position_s() >= next_report {
            debug!(
                "{:.1}s rms={:.2} bass'={:.2} color={}",
                source.position_s(),
                frame.features.volume_rms,
                frame.blended.bass,
                frame.surface_color
            );
            next_report += 1.0;
        }
        ticks += 1;
        source.advance(dt);
    }

    info!(
        "Played {:.1}s in {} ticks ({:.2}s wall)",
        source.position_s(),
        ticks,
        started.elapsed().as_secs_f64()
    );
}

#[cfg(feature = "mic")]
fn run_mic(args: &Args, config: Config, authors: SessionAuthors, dt: f64) -> Result<()> {
    let fft_size = config.features.fft_size;
    let (capture, mut analyzer, mut session) =
        start_mic_session(config, authors).context("Failed to start microphone session")?;
    let seconds = args.seconds.unwrap_or(DEFAULT_MIC_SECONDS);

    info!("Listening for {:.0}s", seconds);
    let start = Instant::now();
    let mut last = start;
    loop {
        let now = Instant::now();
        let now_s = now.duration_since(start).as_secs_f64();
        if now_s >= seconds {
            break;
        }
        let samples = capture.snapshot(fft_size);
        let analysis = analyzer.analyze(&samples, capture.sample_rate_hz());
        session.tick(TickInput {
            analysis: &analysis,
            clock: PlaybackClock::Live {
                now_s,
                session_start_s: 0.0,
            },
            dt_s: now.duration_since(last).as_secs_f64(),
            pointer: None,
        });
        last = now;
        std::thread::sleep(Duration::from_secs_f64(dt));
    }

    let timeline = session.stop();
    write_timeline(args, &timeline)?;
    finish_authoring(&mut session);
    report(&session);
    Ok(())
}

#[cfg(feature = "mic")]
fn start_mic_session(
    config: Config,
    authors: SessionAuthors,
) -> moodmesh::Result<(moodmesh::audio::MicCapture, SpectrumAnalyzer, Session)> {
    let capture = moodmesh::audio::MicCapture::open(config.features.fft_size * 4)?;
    let analyzer = SpectrumAnalyzer::new(&config.features);
    let session = Session::start(config, SourceKind::Mic, None, authors)?;
    Ok((capture, analyzer, session))
}

#[cfg(not(feature = "mic"))]
fn run_mic(_args: &Args, _config: Config, _authors: SessionAuthors, _dt: f64) -> Result<()> {
    let err = moodmesh::Error::from(moodmesh::error::CaptureError::MicDisabled);
    Err(err).context("Cannot start microphone session")
}

fn write_timeline(args: &Args, timeline: &AudioTimeline) -> Result<()> {
    let Some(path) = &args.timeline_out else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("Failed to create timeline file {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), timeline)
        .with_context(|| format!("Failed to write timeline {}", path.display()))?;
    info!("Timeline written to {} ({} frames)", path.display(), timeline.frames.len());
    Ok(())
}

fn finish_authoring(session: &mut Session) {
    let applied = session.await_authoring(AUTHORING_TIMEOUT);
    debug!("Applied {} authoring responses", applied);
    for kind in [AuthoringKind::Plan, AuthoringKind::Target] {
        if let Some(message) = session.authoring_error(kind) {
            warn!("{:?} authoring failed: {}", kind, message);
        }
    }
}

fn report(session: &Session) {
    let world = session.world();
    match session.plan() {
        Some(plan) => println!(
            "Plan '{}': {} sections",
            plan.overall_mood,
            plan.sections.len()
        ),
        None => println!("No plan"),
    }
    println!(
        "World: mood {:?}, render {:?}, surface {}, revision {}",
        world.mood, world.render_mode, world.surface_color, world.revision
    );
}
