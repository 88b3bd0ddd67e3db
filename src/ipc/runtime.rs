//! Drives the session: applies transitions, runs their effects as tokio tasks
//! and feeds completions back in. Everything runs on one task; store calls are
//! the only suspension points.

use super::error::{notice_event, session_event};
use crate::config::Config;
use crate::services::Services;
use crate::session::machine;
use crate::session::{Effect, Event, FetchKind, SessionState, TransitionError};
use std::collections::HashMap;
use std::future::Future;
use tokio::task::{AbortHandle, JoinSet};
use tracing::{debug, info, warn};
use uuid::Uuid;

pub struct AppState {
    pub session_id: Uuid,
    pub config: Config,
    session: SessionState,
    services: Services,
    tasks: JoinSet<Event>,
    fetches: HashMap<FetchKind, AbortHandle>,
    outbox: Vec<serde_json::Value>,
}

impl AppState {
    /// Spawns the initial center fetch, so this must run inside a tokio runtime.
    pub fn new(config: Config, services: Services) -> Self {
        let start = machine::start();
        let mut state = Self {
            session_id: Uuid::new_v4(),
            config,
            session: start.state,
            services,
            tasks: JoinSet::new(),
            fetches: HashMap::new(),
            outbox: Vec::new(),
        };
        info!(session = %state.session_id, "session started");
        state.run(start.effects);
        state
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn dispatch(&mut self, event: Event) -> Result<(), TransitionError> {
        let transition = machine::step(&self.session, event)?;
        self.session = transition.state;
        self.run(transition.effects);
        Ok(())
    }

    pub fn has_pending_work(&self) -> bool {
        !self.tasks.is_empty()
    }

    /// Waits for the next store call or timer to finish and applies it.
    /// Returns `None` once nothing is outstanding.
    pub async fn next_completion(&mut self) -> Option<()> {
        loop {
            match self.tasks.join_next().await? {
                Ok(event) => {
                    if self.is_stale(&event) {
                        debug!(?event, "discarding superseded result");
                        continue;
                    }
                    if let Err(e) = self.dispatch(event) {
                        warn!(error = %e, "completion rejected by session");
                    }
                    self.outbox.push(session_event(&self.session));
                    return Some(());
                }
                Err(e) if e.is_cancelled() => continue,
                Err(e) => warn!(error = %e, "store task failed"),
            }
        }
    }

    /// Runs until every outstanding task, timers included, has completed.
    pub async fn settle(&mut self) {
        while self.next_completion().await.is_some() {}
    }

    /// Unsolicited lines for the UI, oldest first.
    pub fn take_events(&mut self) -> Vec<serde_json::Value> {
        std::mem::take(&mut self.outbox)
    }

    fn is_stale(&self, event: &Event) -> bool {
        let (kind, ticket) = match event {
            Event::CentersLoaded { ticket, .. } => (FetchKind::Centers, *ticket),
            Event::StudentsLoaded { ticket, .. } => (FetchKind::Students, *ticket),
            Event::ProfileLoaded { ticket, .. } => (FetchKind::Profile, *ticket),
            Event::EntriesLoaded { ticket, .. } => (FetchKind::Entries, *ticket),
            _ => return false,
        };
        self.session.pending.get(kind) != Some(ticket)
    }

    fn spawn_fetch<F>(&mut self, kind: FetchKind, fetch: F)
    where
        F: Future<Output = Event> + Send + 'static,
    {
        let handle = self.tasks.spawn(fetch);
        if let Some(previous) = self.fetches.insert(kind, handle) {
            previous.abort();
        }
    }

    fn run(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            debug!(?effect, "running effect");
            match effect {
                Effect::LoadCenters { ticket } => {
                    let catalog = self.services.catalog.clone();
                    self.spawn_fetch(FetchKind::Centers, async move {
                        let result = catalog.list_centers().await;
                        Event::CentersLoaded { ticket, result }
                    });
                }
                Effect::LoadStudents { ticket, center } => {
                    let catalog = self.services.catalog.clone();
                    self.spawn_fetch(FetchKind::Students, async move {
                        let result = catalog.list_students(&center).await;
                        Event::StudentsLoaded { ticket, result }
                    });
                }
                Effect::LoadProfile {
                    ticket,
                    center,
                    student,
                } => {
                    let catalog = self.services.catalog.clone();
                    self.spawn_fetch(FetchKind::Profile, async move {
                        let result = catalog.get_profile(&center, &student).await;
                        Event::ProfileLoaded { ticket, result }
                    });
                }
                Effect::LoadEntries { ticket, center } => {
                    let query = self.services.query.clone();
                    self.spawn_fetch(FetchKind::Entries, async move {
                        let entries = query.list_entries(&center).await;
                        Event::EntriesLoaded { ticket, entries }
                    });
                }
                Effect::Cancel(kind) => {
                    if let Some(handle) = self.fetches.remove(&kind) {
                        handle.abort();
                    }
                }
                Effect::Submit {
                    center,
                    student,
                    fields,
                } => {
                    let submitter = self.services.submitter.clone();
                    self.tasks.spawn(async move {
                        let result = submitter.submit(&center, &student, &fields).await;
                        Event::Submitted { result }
                    });
                }
                Effect::SaveEdit { record } => {
                    let reconciler = self.services.reconciler.clone();
                    self.tasks.spawn(async move {
                        let result = reconciler.save(&record).await;
                        Event::Saved { record, result }
                    });
                }
                Effect::ArmBanner { ticket } => {
                    let delay = self.config.banner_delay();
                    self.tasks.spawn(async move {
                        tokio::time::sleep(delay).await;
                        Event::BannerExpired { ticket }
                    });
                }
                Effect::Notify(notice) => {
                    if notice.recoverable {
                        info!(code = notice.code, message = %notice.message, "notice");
                    } else {
                        warn!(code = notice.code, message = %notice.message, "unrecoverable failure");
                    }
                    self.outbox.push(notice_event(&notice));
                }
            }
        }
    }
}
