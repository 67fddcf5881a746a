//! Post-create state reducer.
//!
//! Each poll delivers the full ordered list of setup steps the server knows
//! about. The reducer remembers which steps it already closed and which one
//! it is currently narrating, and emits at most one start and one terminal
//! line per step.
//!
//! Per snapshot, in order:
//!
//! 1. finished names are skipped
//! 2. a name other than the one being narrated is announced; if it is
//!    running it becomes the narrated step and the scan stops, otherwise
//!    its terminal status closes the line and the scan continues
//! 3. the narrated step gets a progress mark while running (scan stops), or
//!    its terminal status once it ends
//!
//! Completion needs two consecutive snapshots with nothing running. A
//! running snapshot in between resets that count.

use std::collections::HashSet;

use ghcs_api::{PostCreateState, PostCreateStatus};

use crate::sink::ProgressSink;

/// Output produced by one snapshot, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NarrationEvent {
    /// A step was seen running for the first time: `name...`
    Started { name: String },
    /// The narrated step is still running: `.`
    StillRunning { name: String },
    /// A step reached a terminal status. `announced_now` is true when its
    /// name had not been printed yet, so the whole line is written at once.
    Finished {
        name: String,
        status: PostCreateStatus,
        announced_now: bool,
    },
}

impl NarrationEvent {
    /// Write this event to the sink.
    pub fn render(&self, sink: &dyn ProgressSink) {
        match self {
            Self::Started { name } => {
                sink.print(name);
                sink.print("...");
            }
            Self::StillRunning { .. } => sink.print("."),
            Self::Finished {
                name,
                status,
                announced_now: true,
            } => {
                sink.print(name);
                sink.println(&format!("...{status}"));
            }
            Self::Finished { status, .. } => sink.println(status.as_str()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    /// Second quiet snapshot in a row: setup is done.
    Complete,
}

/// Result of reducing one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tick {
    pub events: Vec<NarrationEvent>,
    pub in_progress: bool,
    pub outcome: TickOutcome,
}

#[derive(Debug, Default)]
pub struct PostCreateReducer {
    finished: HashSet<String>,
    last: Option<String>,
    break_next: bool,
}

impl PostCreateReducer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reduce one snapshot.
    pub fn apply(&mut self, snapshot: &[PostCreateState]) -> Tick {
        let mut events = Vec::new();
        let mut in_progress = false;

        for state in snapshot {
            if self.finished.contains(&state.name) {
                continue;
            }

            let is_narrated = self.last.as_deref() == Some(state.name.as_str());

            if state.status == PostCreateStatus::Running {
                in_progress = true;
                if is_narrated {
                    events.push(NarrationEvent::StillRunning {
                        name: state.name.clone(),
                    });
                } else {
                    self.last = Some(state.name.clone());
                    events.push(NarrationEvent::Started {
                        name: state.name.clone(),
                    });
                }
                break;
            }

            self.finished.insert(state.name.clone());
            events.push(NarrationEvent::Finished {
                name: state.name.clone(),
                status: state.status,
                announced_now: !is_narrated,
            });
            if is_narrated {
                self.last = None;
            }
        }

        let outcome = if in_progress {
            self.break_next = false;
            TickOutcome::Continue
        } else if self.break_next {
            TickOutcome::Complete
        } else {
            self.break_next = true;
            TickOutcome::Continue
        };

        Tick {
            events,
            in_progress,
            outcome,
        }
    }

    /// Reduce a snapshot and render its events.
    pub fn apply_and_render(
        &mut self,
        snapshot: &[PostCreateState],
        sink: &dyn ProgressSink,
    ) -> TickOutcome {
        let tick = self.apply(snapshot);
        for event in &tick.events {
            event.render(sink);
        }
        tick.outcome
    }

    #[must_use]
    pub fn is_finished(&self, name: &str) -> bool {
        self.finished.contains(name)
    }

    /// The step whose line is still open, if any.
    #[must_use]
    pub fn narrated(&self) -> Option<&str> {
        self.last.as_deref()
    }
}
