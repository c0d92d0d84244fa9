//! Interactive timer screen.
//!
//! Wires stdin gestures to a [`TimerHandle`] and redraws whenever the
//! engine reports a visible change. The session owns no timing logic.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::engine::{self, DriverError, MonotonicClock, TimerEngine, TimerEvent, TimerHandle};
use crate::render::Frame;
use crate::selector::DurationSelector;
use crate::types::TimerState;

use super::display::Display;
use super::input::{plan, Gesture, Intent};

/// Options for one session.
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    /// Display refresh cadence
    pub tick_interval: std::time::Duration,
    /// Countdown to start right away; the screen opens on the picker if `None`
    pub first_duration: Option<u32>,
    /// Leave after the first completion
    pub once: bool,
}

/// Runs the timer screen on stdin until the user quits, Ctrl-C, or (with
/// `once`) the first countdown completes.
///
/// # Errors
///
/// Returns an error if the driver stops unexpectedly.
pub async fn run(
    selector: DurationSelector,
    display: Display,
    options: SessionOptions,
) -> Result<DurationSelector> {
    run_with_input(
        selector,
        display,
        options,
        BufReader::new(tokio::io::stdin()),
    )
    .await
}

/// Runs the timer screen reading gestures from `input`.
///
/// Returns the selector as the user left it.
///
/// # Errors
///
/// Returns an error if the driver stops unexpectedly.
pub async fn run_with_input<R>(
    mut selector: DurationSelector,
    display: Display,
    options: SessionOptions,
    input: R,
) -> Result<DurationSelector>
where
    R: AsyncBufRead + Unpin,
{
    let (event_tx, mut events) = mpsc::unbounded_channel();
    let timer = TimerEngine::new(MonotonicClock::new(), event_tx);
    let (handle, join) = engine::spawn(timer, options.tick_interval);

    // Gestures are planned against the state after every intent sent so
    // far, never against a snapshot the driver has not caught up with.
    let mut state = handle.snapshot();
    if let Some(seconds) = options.first_duration {
        handle
            .start(f64::from(seconds))
            .context("failed to start countdown")?;
        state = handle.sync().await?;
    }
    redraw(&display, &state, &selector);

    let mut lines = input.lines();
    let mut input_open = true;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            biased;

            event = events.recv() => {
                let Some(event) = event else { break };
                tracing::trace!(?event, "timer event");
                state = handle.snapshot();
                if event == TimerEvent::Completed {
                    display.show_completed();
                    if options.once || !input_open {
                        break;
                    }
                }
                redraw(&display, &state, &selector);
            }
            line = lines.next_line(), if input_open => {
                match line {
                    Ok(Some(line)) => {
                        let Some(gesture) = Gesture::parse(&line) else {
                            Display::show_controls_help();
                            continue;
                        };
                        match plan(gesture, state.phase, &mut selector) {
                            Some(Intent::Quit) => break,
                            Some(Intent::Redraw) => redraw(&display, &state, &selector),
                            Some(intent) => {
                                send(intent, &handle)?;
                                state = handle.sync().await?;
                            }
                            None => tracing::debug!(?gesture, phase = %state.phase, "gesture ignored"),
                        }
                    }
                    Ok(None) => {
                        tracing::debug!("input closed");
                        input_open = false;
                        if !state.phase.is_in_progress() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to read input");
                        input_open = false;
                    }
                }
            }
            _ = &mut ctrl_c => {
                tracing::debug!("interrupted");
                break;
            }
        }
    }

    display.finish();
    if handle.shutdown().is_err() {
        tracing::debug!("driver already stopped");
    }
    join.await.context("timer driver task failed")?;
    Ok(selector)
}

fn send(intent: Intent, handle: &TimerHandle) -> Result<(), DriverError> {
    match intent {
        Intent::Start(seconds) => handle.start(f64::from(seconds)),
        Intent::TogglePause => handle.toggle_pause(),
        Intent::Reset(seconds) => handle.reset(f64::from(seconds)),
        Intent::Redraw | Intent::Quit => Ok(()),
    }
}

fn redraw(display: &Display, state: &TimerState, selector: &DurationSelector) {
    let frame = Frame::new(state, selector.current_duration());
    display.draw(&frame, selector);
}
