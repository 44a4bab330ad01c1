use tokio::sync::mpsc;
use tokio::time::{interval, sleep_until, Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};

use super::controller::Controller;
use super::event::{Command, SideEffect};
use super::playback::PlaybackMode;
use super::time::{Millis, TICK_MS};
use crate::outputs::audio::AudioBackend;
use crate::outputs::renderer::{self, Renderer};

/// Cloneable handle used by input adapters to reach a running reactor.
#[derive(Debug, Clone)]
pub struct ReactorHandle {
    tx: mpsc::Sender<Command>,
    shutdown: CancellationToken,
}

impl ReactorHandle {
    pub async fn send(&self, command: Command) -> Result<(), mpsc::error::SendError<Command>> {
        self.tx.send(command).await
    }

    /// For input threads living outside the runtime.
    pub fn blocking_send(&self, command: Command) -> Result<(), mpsc::error::SendError<Command>> {
        self.tx.blocking_send(command)
    }

    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }
}

/// Async driver for one [`Controller`].
///
/// The controller stays pure; the reactor owns the clock, the command channel, the
/// renderer and the audio backend. Commands and timer deadlines are handled in one
/// `select!` loop, so a step never interleaves with another.
pub struct Reactor<R: Renderer, A: AudioBackend> {
    controller: Controller,
    renderer: R,
    audio: A,
    receiver: mpsc::Receiver<Command>,
    shutdown: CancellationToken,
    epoch: Instant,
    torn_down: bool,
}

impl<R: Renderer, A: AudioBackend> Reactor<R, A> {
    pub fn new(controller: Controller, renderer: R, audio: A, capacity: usize) -> (Self, ReactorHandle) {
        let (tx, receiver) = mpsc::channel(capacity);
        let shutdown = CancellationToken::new();
        let handle = ReactorHandle {
            tx,
            shutdown: shutdown.clone(),
        };
        let reactor = Self {
            controller,
            renderer,
            audio,
            receiver,
            shutdown,
            epoch: Instant::now(),
            torn_down: false,
        };
        (reactor, handle)
    }

    pub fn now(&self) -> Millis {
        Millis::new(self.epoch.elapsed().as_millis() as u64)
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn mount(&mut self) {
        let now = self.now();
        let effects = self.controller.mount(now);
        self.execute(effects);
    }

    pub fn dispatch(&mut self, command: Command) {
        let now = self.now();
        debug!(?command, at = now.as_u64(), "command");
        let effects = self.controller.apply(command, now);
        self.execute(effects);
    }

    /// Runs effects in order. Audio refusals are reported back to the controller and
    /// never interrupt the remaining effects.
    pub fn execute(&mut self, effects: Vec<SideEffect>) {
        for effect in effects {
            match effect {
                SideEffect::Render(event) => {
                    renderer::dispatch(&mut self.renderer, self.controller.script(), &event);
                }
                SideEffect::Audio(command) => {
                    if let Err(e) = self.audio.execute(&command) {
                        warn!("Audio start failed: {}", e);
                        let follow_up = self.controller.audio_rejected(&command);
                        self.log_only(follow_up);
                    }
                }
                SideEffect::Log(msg) => debug!("[LOG] {}", msg),
            }
        }
    }

    /// Async driver loop. Returns after shutdown or once every handle is dropped,
    /// with the timer cancelled and audio released.
    pub async fn run(&mut self) {
        let span = info_span!("presentation", id = %self.controller.id());
        self.run_loop().instrument(span).await
    }

    async fn run_loop(&mut self) {
        info!(
            "Presentation started: {} segments, {}ms total, tick {}ms",
            self.controller.script().len(),
            self.controller.script().total_duration_ms(),
            TICK_MS
        );

        let mut cadence = interval(Duration::from_millis(TICK_MS));
        cadence.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let shutdown = self.shutdown.clone();

        loop {
            let timer = self.controller.pending_timer();
            let wake_at = self
                .controller
                .deadline()
                .map(|due| self.epoch + Duration::from_millis(due.as_u64()))
                .unwrap_or_else(|| Instant::now() + Duration::from_secs(3600));
            let playing = self.controller.mode() == PlaybackMode::Playing;

            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                command = self.receiver.recv() => match command {
                    Some(command) => self.dispatch(command),
                    None => break,
                },
                _ = sleep_until(wake_at), if timer.is_some() => {
                    if let Some(id) = timer {
                        let now = self.now();
                        let effects = self.controller.on_timer(id, now);
                        self.execute(effects);
                    }
                }
                _ = cadence.tick(), if playing => {
                    let now = self.now();
                    let effects = self.controller.tick(now);
                    self.execute(effects);
                }
            }
        }

        self.shutdown();
        info!("Presentation stopped");
    }

    /// Cancels the pending timer and releases audio. Idempotent.
    pub fn shutdown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        let now = self.now();
        let effects = self.controller.teardown(now);
        self.execute(effects);
    }

    fn log_only(&mut self, effects: Vec<SideEffect>) {
        for effect in effects {
            if let SideEffect::Log(msg) = effect {
                debug!("[LOG] {}", msg);
            }
        }
    }
}

impl<R: Renderer, A: AudioBackend> Drop for Reactor<R, A> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
