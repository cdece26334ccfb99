//! Ceremony driver — one tokio task owning the live session
//!
//! The task multiplexes three sources in a single `select!`:
//! - operator commands (mpsc, each with a oneshot reply)
//! - the preview timer, armed only while drawing
//! - the ambient effect timer, re-armed at each state change
//!
//! Stop is handled on the same task that owns the preview timer, so the
//! frame it commits is always the last `PreviewTick` that went out.

use std::future;

use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

use ld_core::{AwardId, CeremonyState, LdError, LdResult, ParticipantId};
use ld_draw::TimingConfig;

use crate::commands::{CeremonyCommand, CommandOutcome};
use crate::event::{CeremonyEvent, Stage};
use crate::session::{Ceremony, CeremonySnapshot, RoundOutcome, RoundStart};

const EVENT_CAPACITY: usize = 256;
const COMMAND_CAPACITY: usize = 64;

/// Driver errors
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("Ceremony rejected the command: {0}")]
    Ceremony(#[from] LdError),

    #[error("Ceremony task is no longer running")]
    Closed,

    #[error("Ceremony task failed: {0}")]
    Join(String),

    #[error("Unexpected reply to {command}: {outcome}")]
    UnexpectedReply { command: &'static str, outcome: String },
}

struct Request {
    command: CeremonyCommand,
    reply: oneshot::Sender<LdResult<CommandOutcome>>,
}

/// Cloneable sender side of a running ceremony
#[derive(Clone)]
pub struct CeremonyHandle {
    command_tx: mpsc::Sender<Request>,
}

impl CeremonyHandle {
    /// Send a command and wait for the ceremony's answer
    pub async fn send(&self, command: CeremonyCommand) -> Result<CommandOutcome, DriverError> {
        let (reply, answer) = oneshot::channel();
        self.command_tx
            .send(Request { command, reply })
            .await
            .map_err(|_| DriverError::Closed)?;
        let outcome = answer.await.map_err(|_| DriverError::Closed)??;
        Ok(outcome)
    }

    pub async fn enter(&self) -> Result<(), DriverError> {
        self.send(CeremonyCommand::Enter).await.map(|_| ())
    }

    pub async fn exit(&self) -> Result<(), DriverError> {
        self.send(CeremonyCommand::Exit).await.map(|_| ())
    }

    pub async fn start_round(&self) -> Result<RoundStart, DriverError> {
        match self.send(CeremonyCommand::StartRound).await? {
            CommandOutcome::Round(start) => Ok(start),
            other => Err(unexpected("start_round", &other)),
        }
    }

    /// Stop on whatever frame is currently shown
    pub async fn stop_round(&self) -> Result<RoundOutcome, DriverError> {
        self.stop(None).await
    }

    /// Stop and commit an explicit frame
    pub async fn stop_round_with(&self, snapshot: Vec<ParticipantId>) -> Result<RoundOutcome, DriverError> {
        self.stop(Some(snapshot)).await
    }

    async fn stop(&self, snapshot: Option<Vec<ParticipantId>>) -> Result<RoundOutcome, DriverError> {
        match self.send(CeremonyCommand::StopRound { snapshot }).await? {
            CommandOutcome::Stopped(outcome) => Ok(outcome),
            other => Err(unexpected("stop_round", &other)),
        }
    }

    pub async fn confirm_result(&self) -> Result<(), DriverError> {
        self.send(CeremonyCommand::ConfirmResult).await.map(|_| ())
    }

    pub async fn next_award(&self) -> Result<usize, DriverError> {
        self.award_index(CeremonyCommand::NextAward).await
    }

    pub async fn prev_award(&self) -> Result<usize, DriverError> {
        self.award_index(CeremonyCommand::PrevAward).await
    }

    async fn award_index(&self, command: CeremonyCommand) -> Result<usize, DriverError> {
        let name = command.name();
        match self.send(command).await? {
            CommandOutcome::AwardIndex(index) => Ok(index),
            other => Err(unexpected(name, &other)),
        }
    }

    pub async fn remove_winner(&self, participant_id: ParticipantId) -> Result<Option<AwardId>, DriverError> {
        match self.send(CeremonyCommand::RemoveWinner { participant_id }).await? {
            CommandOutcome::Removed(owner) => Ok(owner),
            other => Err(unexpected("remove_winner", &other)),
        }
    }

    pub async fn clear_award(&self, award_id: AwardId) -> Result<usize, DriverError> {
        self.released(CeremonyCommand::ClearAward { award_id }).await
    }

    pub async fn clear_all(&self) -> Result<usize, DriverError> {
        self.released(CeremonyCommand::ClearAll).await
    }

    async fn released(&self, command: CeremonyCommand) -> Result<usize, DriverError> {
        let name = command.name();
        match self.send(command).await? {
            CommandOutcome::Released(count) => Ok(count),
            other => Err(unexpected(name, &other)),
        }
    }

    pub async fn snapshot(&self) -> Result<CeremonySnapshot, DriverError> {
        match self.send(CeremonyCommand::Snapshot).await? {
            CommandOutcome::Snapshot(snapshot) => Ok(*snapshot),
            other => Err(unexpected("snapshot", &other)),
        }
    }
}

fn unexpected(command: &'static str, outcome: &CommandOutcome) -> DriverError {
    DriverError::UnexpectedReply {
        command,
        outcome: format!("{:?}", outcome),
    }
}

/// Running ceremony task
pub struct CeremonyDriver {
    handle: CeremonyHandle,
    event_tx: broadcast::Sender<CeremonyEvent>,
    shutdown_tx: broadcast::Sender<()>,
    task: JoinHandle<Ceremony>,
}

impl CeremonyDriver {
    /// Move the ceremony onto a new task; must be called inside a runtime
    pub fn spawn(ceremony: Ceremony, timing: TimingConfig) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CAPACITY);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let sink = EventSink {
            tx: event_tx.clone(),
            sequence: 0,
        };
        let task = tokio::spawn(run(ceremony, timing, command_rx, shutdown_rx, sink));
        log::info!("[Driver] ceremony task started");

        Self {
            handle: CeremonyHandle { command_tx },
            event_tx,
            shutdown_tx,
            task,
        }
    }

    pub fn handle(&self) -> CeremonyHandle {
        self.handle.clone()
    }

    /// Subscribe to ceremony events
    pub fn subscribe(&self) -> broadcast::Receiver<CeremonyEvent> {
        self.event_tx.subscribe()
    }

    pub async fn send(&self, command: CeremonyCommand) -> Result<CommandOutcome, DriverError> {
        self.handle.send(command).await
    }

    /// Stop the task and take the ceremony back
    pub async fn shutdown(self) -> Result<Ceremony, DriverError> {
        let _ = self.shutdown_tx.send(());
        let ceremony = self.task.await.map_err(|e| DriverError::Join(e.to_string()))?;
        log::info!("[Driver] ceremony task stopped");
        Ok(ceremony)
    }
}

struct EventSink {
    tx: broadcast::Sender<CeremonyEvent>,
    sequence: u64,
}

impl EventSink {
    fn emit(&mut self, stage: Stage) {
        self.sequence += 1;
        // No subscribers is fine
        let _ = self.tx.send(CeremonyEvent::new(self.sequence, stage));
    }
}

async fn run(
    mut ceremony: Ceremony,
    timing: TimingConfig,
    mut command_rx: mpsc::Receiver<Request>,
    mut shutdown_rx: broadcast::Receiver<()>,
    mut sink: EventSink,
) -> Ceremony {
    let mut preview = delayed_interval(timing.preview_interval());
    let mut ambient = ambient_timer(&timing, ceremony.state());

    loop {
        let drawing = ceremony.state() == CeremonyState::Drawing;

        tokio::select! {
            biased;

            _ = shutdown_rx.recv() => break,

            request = command_rx.recv() => {
                let Some(Request { command, reply }) = request else {
                    log::debug!("[Driver] all handles dropped");
                    break;
                };
                let before = ceremony.state();
                let name = command.name();

                let answer = match command.apply(&mut ceremony) {
                    Ok(applied) => {
                        for stage in applied.stages {
                            sink.emit(stage);
                        }
                        Ok(applied.outcome)
                    }
                    Err(e) => {
                        log::warn!("[Driver] {} rejected: {}", name, e);
                        Err(e)
                    }
                };
                let _ = reply.send(answer);

                let after = ceremony.state();
                if after != before {
                    log::debug!("[Driver] {} -> {}", before, after);
                    ambient = ambient_timer(&timing, after);
                    if after == CeremonyState::Drawing {
                        preview.reset();
                    }
                }
            }

            _ = preview.tick(), if drawing => {
                if let Some(frame) = ceremony.preview_tick() {
                    let stage = Stage::PreviewTick {
                        tick: frame.tick,
                        participants: frame.participants.clone(),
                    };
                    sink.emit(stage);
                }
            }

            _ = tick_optional(&mut ambient) => {
                sink.emit(Stage::Ambient { state: ceremony.state() });
            }
        }
    }

    ceremony
}

/// Interval whose first tick is one period away
fn delayed_interval(period: std::time::Duration) -> Interval {
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

fn ambient_timer(timing: &TimingConfig, state: CeremonyState) -> Option<Interval> {
    timing.ambient_interval(state).map(delayed_interval)
}

async fn tick_optional(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => future::pending().await,
    }
}
