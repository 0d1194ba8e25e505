//! Headless native runner

use std::io::BufRead;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};

use crate::app::{App, InputEvent};
use crate::audio::LogAudio;
use crate::renderer::{MemorySurface, PresentError};
use crate::sim::GamePhase;

/// Everything the session loop reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopEvent {
    /// Driver cadence; elapsed time is measured by the loop itself
    Wake,
    Input(InputEvent),
    Quit,
}

#[derive(Debug, Clone)]
pub struct HeadlessOptions {
    /// Stop after this long; `None` runs until stdin closes
    pub run_for: Option<Duration>,
    pub wake_interval: Duration,
    pub channel_capacity: usize,
    /// Read impulses from stdin (any line flaps, `q` quits)
    pub stdin_input: bool,
}

impl Default for HeadlessOptions {
    fn default() -> Self {
        Self {
            run_for: Some(Duration::from_secs(10)),
            wake_interval: Duration::from_millis(16),
            channel_capacity: 4,
            stdin_input: false,
        }
    }
}

/// What happened during a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub wakeups: u64,
    /// Wakeups dropped because the channel was full
    pub wakeups_dropped: u64,
    pub frames_presented: u64,
    pub best: Option<u32>,
    pub final_phase: Option<GamePhase>,
    pub final_score: u32,
}

/// Spawn the driver (and input) threads and run the session loop to completion
pub fn run(app: App, options: HeadlessOptions) -> RunSummary {
    let (tx, rx) = bounded(options.channel_capacity.max(1));
    log::info!("Headless run (channel capacity {})", options.channel_capacity);

    let driver = spawn_driver(tx.clone(), options.wake_interval, options.run_for);
    if options.stdin_input {
        spawn_stdin_reader(tx.clone(), options.run_for.is_none());
    }
    drop(tx);

    let audio = LogAudio::new(app.config().audio.clone());
    let mut surface = MemorySurface::new();
    let mut summary = session_loop(app, rx, &audio, &mut surface);

    match driver.join() {
        Ok(dropped) => summary.wakeups_dropped = dropped,
        Err(e) => log::error!("Driver thread panicked: {:?}", e),
    }
    log::info!("Headless run finished: {:?}", summary);
    summary
}

/// Fixed-cadence wakeups; a full channel drops the wakeup
fn spawn_driver(
    tx: Sender<LoopEvent>,
    interval: Duration,
    run_for: Option<Duration>,
) -> thread::JoinHandle<u64> {
    thread::spawn(move || {
        let start = Instant::now();
        let mut dropped = 0;
        loop {
            thread::sleep(interval);
            if run_for.is_some_and(|limit| start.elapsed() >= limit) {
                let _ = tx.send(LoopEvent::Quit);
                break;
            }
            match tx.try_send(LoopEvent::Wake) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => dropped += 1,
                Err(TrySendError::Disconnected(_)) => break,
            }
        }
        log::debug!("Driver thread exiting ({} wakeups dropped)", dropped);
        dropped
    })
}

/// Blocking stdin reader; detached since a pending read cannot be interrupted
fn spawn_stdin_reader(tx: Sender<LoopEvent>, quit_on_eof: bool) {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let events: &[LoopEvent] = if line.trim().eq_ignore_ascii_case("q") {
                &[LoopEvent::Quit]
            } else {
                &[
                    LoopEvent::Input(InputEvent::ImpulsePressed),
                    LoopEvent::Input(InputEvent::ImpulseReleased),
                ]
            };
            for event in events {
                if tx.send(*event).is_err() {
                    return;
                }
            }
        }
        if quit_on_eof {
            let _ = tx.send(LoopEvent::Quit);
        }
    });
}

/// Consume events in order until `Quit` or every sender is gone
pub fn session_loop(
    mut app: App,
    rx: Receiver<LoopEvent>,
    audio: &LogAudio,
    surface: &mut MemorySurface,
) -> RunSummary {
    let mut summary = RunSummary::default();
    let mut last = Instant::now();

    for event in rx.iter() {
        match event {
            LoopEvent::Wake => {
                summary.wakeups += 1;
                let now = Instant::now();
                let elapsed = now.duration_since(last).as_secs_f32();
                last = now;
                if app.on_timer(elapsed, audio) {
                    paint(&mut app, surface);
                }
            }
            LoopEvent::Input(input) => app.handle_input(input, audio),
            LoopEvent::Quit => {
                log::info!("Quit requested");
                break;
            }
        }
    }

    summary.frames_presented = surface.presented();
    summary.best = app.high_scores().top_score();
    summary.final_phase = app.session().map(|s| s.phase());
    summary.final_score = app.session().map_or(0, |s| s.score());
    summary
}

fn paint(app: &mut App, surface: &mut MemorySurface) {
    match app.paint(surface) {
        Ok(()) => {}
        Err(PresentError::OutOfMemory) => log::error!("Out of memory!"),
        Err(e) => log::warn!("Present error: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    fn started_app(seed: u64) -> App {
        let mut app = App::new(GameConfig::default()).unwrap();
        app.start(seed).unwrap();
        app
    }

    #[test]
    fn test_session_loop_applies_events_in_order() {
        let (tx, rx) = bounded(8);
        tx.send(LoopEvent::Input(InputEvent::ImpulsePressed)).unwrap();
        tx.send(LoopEvent::Input(InputEvent::ImpulseReleased)).unwrap();
        tx.send(LoopEvent::Wake).unwrap();
        tx.send(LoopEvent::Quit).unwrap();
        // Never reached
        tx.send(LoopEvent::Wake).unwrap();

        let mut surface = MemorySurface::new();
        let summary = session_loop(started_app(1), rx, &LogAudio::default(), &mut surface);

        assert_eq!(summary.final_phase, Some(GamePhase::Playing));
        assert_eq!(summary.wakeups, 1);
        assert_eq!(summary.frames_presented, 1);
    }

    #[test]
    fn test_session_loop_ends_when_senders_drop() {
        let (tx, rx) = bounded::<LoopEvent>(2);
        drop(tx);
        let mut surface = MemorySurface::new();
        let summary = session_loop(started_app(1), rx, &LogAudio::default(), &mut surface);
        assert_eq!(summary.final_phase, Some(GamePhase::Ready));
        assert_eq!(summary.frames_presented, 0);
    }

    #[test]
    fn test_headless_run_with_autopilot() {
        let mut app = started_app(9);
        app.set_autopilot(true);
        let options = HeadlessOptions {
            run_for: Some(Duration::from_millis(300)),
            wake_interval: Duration::from_millis(5),
            ..Default::default()
        };
        let summary = run(app, options);
        assert!(summary.wakeups > 0);
        assert!(summary.frames_presented > 0);
        assert_ne!(summary.final_phase, Some(GamePhase::Ready));
    }
}
