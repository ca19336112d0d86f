use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::{
    sync::{Mutex, broadcast, mpsc, oneshot},
    time::{Duration, Instant, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use crate::{
    auth::SessionRecord,
    core::store::{EntryStore, StoreError},
    entry::{EntryForm, EntryPatch, LeaderboardEntry},
    op::{AppliedMutation, Mutation},
    persist::{self, PersistError, PersistResult, SlotStore},
    settings::ConferenceSettings,
    types::{EntryId, Revision},
};

use super::events::LeaderboardEvent;

/// Failures surfaced through [`LeaderboardHandle`].
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// Store rejected the mutation.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Storage failed.
    #[error(transparent)]
    Persist(#[from] PersistError),
    /// Runtime task has stopped.
    #[error("leaderboard runtime is not running")]
    ChannelClosed,
}

/// Runtime queue and write-batching knobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Write each mutation as soon as it is queued instead of waiting for
    /// the batch window.
    pub flush_on_mutation: bool,
    /// Longest a queued snapshot waits before being written.
    pub batch_max_latency_ms: u64,
    /// Capacity of the persistence queue.
    pub persist_queue_bound: usize,
    /// Capacity of the command queue.
    pub command_queue_bound: usize,
    /// Events buffered per subscriber before it lags.
    pub event_capacity: usize,
    /// How often storage is re-read to pick up writes from other processes;
    /// 0 disables it.
    pub reload_interval_ms: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            flush_on_mutation: true,
            batch_max_latency_ms: 75,
            persist_queue_bound: 64,
            command_queue_bound: 256,
            event_capacity: 1024,
            reload_interval_ms: 5_000,
        }
    }
}

/// Cloneable handle to the runtime task.
pub struct LeaderboardHandle {
    cmd_tx: mpsc::Sender<Command>,
    events_tx: broadcast::Sender<LeaderboardEvent>,
}

impl Clone for LeaderboardHandle {
    fn clone(&self) -> Self {
        Self {
            cmd_tx: self.cmd_tx.clone(),
            events_tx: self.events_tx.clone(),
        }
    }
}

enum Command {
    List {
        resp: oneshot::Sender<Vec<LeaderboardEntry>>,
    },
    Get {
        id: EntryId,
        resp: oneshot::Sender<Option<LeaderboardEntry>>,
    },
    Add {
        form: EntryForm,
        resp: oneshot::Sender<Result<LeaderboardEntry, RuntimeError>>,
    },
    Update {
        id: EntryId,
        patch: EntryPatch,
        resp: oneshot::Sender<Result<bool, RuntimeError>>,
    },
    Delete {
        id: EntryId,
        resp: oneshot::Sender<Result<bool, RuntimeError>>,
    },
    Settings {
        resp: oneshot::Sender<ConferenceSettings>,
    },
    SaveSettings {
        settings: ConferenceSettings,
        resp: oneshot::Sender<Result<(), RuntimeError>>,
    },
    LoadSession {
        resp: oneshot::Sender<Result<Option<SessionRecord>, RuntimeError>>,
    },
    SaveSession {
        record: SessionRecord,
        resp: oneshot::Sender<Result<(), RuntimeError>>,
    },
    ClearSession {
        resp: oneshot::Sender<Result<(), RuntimeError>>,
    },
    Reload {
        resp: oneshot::Sender<Result<bool, RuntimeError>>,
    },
    Flush {
        resp: oneshot::Sender<Result<Revision, RuntimeError>>,
    },
    Shutdown {
        resp: oneshot::Sender<Result<(), RuntimeError>>,
    },
}

type SlotCall<T> = Box<dyn FnOnce(&mut dyn SlotStore) -> PersistResult<T> + Send>;

type Stored = (Vec<LeaderboardEntry>, ConferenceSettings);

enum PersistMsg {
    Entries {
        revision: Revision,
        entries: Vec<LeaderboardEntry>,
        resp: oneshot::Sender<PersistResult<()>>,
    },
    Settings {
        settings: ConferenceSettings,
        resp: oneshot::Sender<PersistResult<()>>,
    },
    Reload {
        resp: oneshot::Sender<PersistResult<Option<Stored>>>,
    },
    LoadSession {
        resp: oneshot::Sender<PersistResult<Option<SessionRecord>>>,
    },
    WriteSession {
        call: SlotCall<()>,
        resp: oneshot::Sender<PersistResult<()>>,
    },
    Flush {
        resp: oneshot::Sender<PersistResult<Revision>>,
    },
    Shutdown {
        resp: oneshot::Sender<PersistResult<()>>,
    },
}

#[derive(Default)]
struct Pending {
    entries: Option<(Revision, Vec<LeaderboardEntry>)>,
    settings: Option<ConferenceSettings>,
}

impl Pending {
    fn is_empty(&self) -> bool {
        self.entries.is_none() && self.settings.is_none()
    }

    /// Puts back a batch that failed to write unless something newer was
    /// queued meanwhile.
    fn restore(&mut self, batch: Pending) {
        if self.entries.is_none() {
            self.entries = batch.entries;
        }
        if self.settings.is_none() {
            self.settings = batch.settings;
        }
    }
}

/// Shortest wait before a failed batch is retried.
const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Loads entries and settings from `slots` and spawns the runtime over them.
///
/// Malformed stored data is reported instead of being replaced with an
/// empty board.
pub fn open_leaderboard(
    slots: Box<dyn SlotStore>,
    config: RuntimeConfig,
) -> Result<LeaderboardHandle, PersistError> {
    let store = persist::load_store(&*slots)?;
    let settings = persist::load_settings(&*slots)?;
    info!(entries = store.len(), "leaderboard loaded");
    Ok(spawn_leaderboard(store, settings, slots, config))
}

/// Spawns the single-writer loop and its persistence worker.
///
/// Must be called from inside a tokio runtime.
pub fn spawn_leaderboard(
    store: EntryStore,
    settings: ConferenceSettings,
    slots: Box<dyn SlotStore>,
    config: RuntimeConfig,
) -> LeaderboardHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(config.command_queue_bound.max(1));
    let (events_tx, _) = broadcast::channel::<LeaderboardEvent>(config.event_capacity.max(1));

    let (persist_tx, persist_rx) = mpsc::channel::<PersistMsg>(config.persist_queue_bound.max(1));
    let (durable_tx, mut durable_rx) = mpsc::unbounded_channel::<Revision>();
    spawn_persistence_worker(slots, persist_rx, durable_tx, &config);

    let events_tx_loop = events_tx.clone();
    let reload_enabled = config.reload_interval_ms > 0;
    let reload_period = Duration::from_millis(config.reload_interval_ms.max(1));

    tokio::spawn(async move {
        let mut store = store;
        let mut settings = settings;
        let mut reload_tick = tokio::time::interval_at(Instant::now() + reload_period, reload_period);
        reload_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                cmd = cmd_rx.recv() => {
                    let Some(cmd) = cmd else { break; };
                    let done = handle_command(
                        cmd,
                        &mut store,
                        &mut settings,
                        &events_tx_loop,
                        &persist_tx,
                    ).await;

                    if done {
                        break;
                    }
                }
                Some(revision) = durable_rx.recv() => {
                    let _ = events_tx_loop.send(LeaderboardEvent::DurableUpTo { revision });
                }
                _ = reload_tick.tick(), if reload_enabled => {
                    if let Err(err) = reload(&mut store, &mut settings, &events_tx_loop, &persist_tx).await {
                        warn!(error = %err, "leaderboard reload failed");
                    }
                }
            }
        }
        debug!("leaderboard runtime stopped");
    });

    LeaderboardHandle { cmd_tx, events_tx }
}

impl LeaderboardHandle {
    /// Subscribes to runtime events.
    pub fn subscribe(&self) -> broadcast::Receiver<LeaderboardEvent> {
        self.events_tx.subscribe()
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(make(tx))
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    /// All entries in insertion order.
    pub async fn list(&self) -> Result<Vec<LeaderboardEntry>, RuntimeError> {
        self.request(|resp| Command::List { resp }).await
    }

    /// One entry by id.
    pub async fn get(&self, id: impl Into<EntryId>) -> Result<Option<LeaderboardEntry>, RuntimeError> {
        let id = id.into();
        self.request(|resp| Command::Get { id, resp }).await
    }

    /// Validates and appends a new entry, returning the stored record.
    ///
    /// With [`RuntimeConfig::flush_on_mutation`] a failed write is returned
    /// as [`RuntimeError::Persist`]. The entry stays on the board and its
    /// write stays queued for the next attempt.
    pub async fn add(&self, form: EntryForm) -> Result<LeaderboardEntry, RuntimeError> {
        self.request(|resp| Command::Add { form, resp }).await?
    }

    /// Patches an entry; `Ok(false)` when the id is unknown.
    pub async fn update(&self, id: impl Into<EntryId>, patch: EntryPatch) -> Result<bool, RuntimeError> {
        let id = id.into();
        self.request(|resp| Command::Update { id, patch, resp }).await?
    }

    /// Deletes an entry; `Ok(false)` when the id is unknown.
    pub async fn delete(&self, id: impl Into<EntryId>) -> Result<bool, RuntimeError> {
        let id = id.into();
        self.request(|resp| Command::Delete { id, resp }).await?
    }

    /// Current conference settings.
    pub async fn settings(&self) -> Result<ConferenceSettings, RuntimeError> {
        self.request(|resp| Command::Settings { resp }).await
    }

    /// Replaces the conference settings. Write failures surface like
    /// [`LeaderboardHandle::add`].
    pub async fn save_settings(&self, settings: ConferenceSettings) -> Result<(), RuntimeError> {
        self.request(|resp| Command::SaveSettings { settings, resp }).await?
    }

    /// Reads the stored admin session record.
    pub async fn load_session(&self) -> Result<Option<SessionRecord>, RuntimeError> {
        self.request(|resp| Command::LoadSession { resp }).await?
    }

    /// Stores an admin session record.
    pub async fn save_session(&self, record: SessionRecord) -> Result<(), RuntimeError> {
        self.request(|resp| Command::SaveSession { record, resp }).await?
    }

    /// Removes the admin session record.
    pub async fn clear_session(&self) -> Result<(), RuntimeError> {
        self.request(|resp| Command::ClearSession { resp }).await?
    }

    /// Re-reads storage and adopts entries or settings written by another
    /// process, emitting [`LeaderboardEvent::Reloaded`] when anything
    /// changed.
    ///
    /// Skipped (`Ok(false)`) while local writes are still queued. The
    /// runtime also does this every [`RuntimeConfig::reload_interval_ms`].
    pub async fn reload(&self) -> Result<bool, RuntimeError> {
        self.request(|resp| Command::Reload { resp }).await?
    }

    /// Waits until every queued write has reached storage and returns the
    /// durable revision.
    ///
    /// Fails with [`RuntimeError::Persist`] while a queued write keeps
    /// failing; the write stays queued.
    pub async fn flush(&self) -> Result<Revision, RuntimeError> {
        self.request(|resp| Command::Flush { resp }).await?
    }

    /// Flushes pending writes and stops the runtime. The runtime stops even
    /// when the final write fails.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        self.request(|resp| Command::Shutdown { resp }).await?
    }
}

async fn handle_command(
    cmd: Command,
    store: &mut EntryStore,
    settings: &mut ConferenceSettings,
    events_tx: &broadcast::Sender<LeaderboardEvent>,
    persist_tx: &mpsc::Sender<PersistMsg>,
) -> bool {
    match cmd {
        Command::List { resp } => {
            let _ = resp.send(store.export_snapshot());
        }
        Command::Get { id, resp } => {
            let _ = resp.send(store.get(&id).cloned());
        }
        Command::Add { form, resp } => {
            let res = match store.add(&form) {
                Ok((entry, _)) => {
                    debug!(id = %entry.id, "entry added");
                    publish(store, events_tx, persist_tx).await.map(|_| entry)
                }
                Err(err) => Err(RuntimeError::from(err)),
            };
            let _ = resp.send(res);
        }
        Command::Update { id, patch, resp } => {
            let res = match store.update(&id, patch) {
                Some(_) => publish(store, events_tx, persist_tx).await.map(|_| true),
                None => Ok(false),
            };
            let _ = resp.send(res);
        }
        Command::Delete { id, resp } => {
            let res = match store.delete(&id) {
                Some(_) => {
                    debug!(%id, "entry deleted");
                    publish(store, events_tx, persist_tx).await.map(|_| true)
                }
                None => Ok(false),
            };
            let _ = resp.send(res);
        }
        Command::Settings { resp } => {
            let _ = resp.send(settings.clone());
        }
        Command::SaveSettings { settings: next, resp } => {
            *settings = next;
            let (tx, rx) = oneshot::channel();
            let msg = PersistMsg::Settings {
                settings: settings.clone(),
                resp: tx,
            };
            let res = match persist_tx.send(msg).await {
                Ok(()) => {
                    let _ = events_tx.send(LeaderboardEvent::SettingsSaved);
                    written(rx).await
                }
                Err(_) => Err(RuntimeError::ChannelClosed),
            };
            let _ = resp.send(res);
        }
        Command::LoadSession { resp } => {
            let (tx, rx) = oneshot::channel();
            let out = ask_worker(persist_tx, PersistMsg::LoadSession { resp: tx }, rx).await;
            let _ = resp.send(out);
        }
        Command::SaveSession { record, resp } => {
            let (tx, rx) = oneshot::channel();
            let call: SlotCall<()> = Box::new(move |slots: &mut dyn SlotStore| {
                persist::save_session(slots, &record)
            });
            let out = ask_worker(persist_tx, PersistMsg::WriteSession { call, resp: tx }, rx).await;
            let _ = resp.send(out);
        }
        Command::ClearSession { resp } => {
            let (tx, rx) = oneshot::channel();
            let call: SlotCall<()> = Box::new(persist::clear_session);
            let out = ask_worker(persist_tx, PersistMsg::WriteSession { call, resp: tx }, rx).await;
            let _ = resp.send(out);
        }
        Command::Reload { resp } => {
            let _ = resp.send(reload(store, settings, events_tx, persist_tx).await);
        }
        Command::Flush { resp } => {
            let (tx, rx) = oneshot::channel();
            let out = ask_worker(persist_tx, PersistMsg::Flush { resp: tx }, rx).await;
            let _ = resp.send(out);
        }
        Command::Shutdown { resp } => {
            let (tx, rx) = oneshot::channel();
            let out = ask_worker(persist_tx, PersistMsg::Shutdown { resp: tx }, rx).await;
            let _ = resp.send(out);
            return true;
        }
    }

    false
}

/// Queues the full collection for writing, broadcasts one event per
/// mutation applied since the last call, then waits for the worker's verdict
/// on the write.
async fn publish(
    store: &mut EntryStore,
    events_tx: &broadcast::Sender<LeaderboardEvent>,
    persist_tx: &mpsc::Sender<PersistMsg>,
) -> Result<(), RuntimeError> {
    let (tx, rx) = oneshot::channel();
    persist_tx
        .send(PersistMsg::Entries {
            revision: store.revision(),
            entries: store.export_snapshot(),
            resp: tx,
        })
        .await
        .map_err(|_| RuntimeError::ChannelClosed)?;

    for applied in store.drain_pending() {
        let _ = events_tx.send(event_for(&applied));
    }
    written(rx).await
}

async fn written(rx: oneshot::Receiver<PersistResult<()>>) -> Result<(), RuntimeError> {
    rx.await
        .map_err(|_| RuntimeError::ChannelClosed)?
        .map_err(RuntimeError::from)
}

fn event_for(applied: &AppliedMutation) -> LeaderboardEvent {
    let id = applied.mutation.entry_id().to_string();
    match applied.mutation {
        Mutation::Added { .. } => LeaderboardEvent::EntryAdded { id },
        Mutation::Updated { .. } => LeaderboardEvent::EntryUpdated { id },
        Mutation::Deleted { .. } => LeaderboardEvent::EntryDeleted { id },
    }
}

/// Adopts whatever storage holds when it differs from memory.
async fn reload(
    store: &mut EntryStore,
    settings: &mut ConferenceSettings,
    events_tx: &broadcast::Sender<LeaderboardEvent>,
    persist_tx: &mpsc::Sender<PersistMsg>,
) -> Result<bool, RuntimeError> {
    let (tx, rx) = oneshot::channel();
    let Some((entries, stored_settings)) =
        ask_worker(persist_tx, PersistMsg::Reload { resp: tx }, rx).await?
    else {
        return Ok(false);
    };

    let mut changed = false;
    if entries.as_slice() != store.list() {
        store.replace_all(entries).map_err(|err| PersistError::Corrupt {
            key: persist::ENTRIES_KEY.to_string(),
            reason: err.to_string(),
        })?;
        changed = true;
    }
    if stored_settings != *settings {
        *settings = stored_settings;
        changed = true;
    }
    if changed {
        info!(entries = store.len(), "picked up outside changes");
        let _ = events_tx.send(LeaderboardEvent::Reloaded);
    }
    Ok(changed)
}

async fn ask_worker<T>(
    persist_tx: &mpsc::Sender<PersistMsg>,
    msg: PersistMsg,
    rx: oneshot::Receiver<PersistResult<T>>,
) -> Result<T, RuntimeError> {
    persist_tx
        .send(msg)
        .await
        .map_err(|_| RuntimeError::ChannelClosed)?;
    rx.await
        .map_err(|_| RuntimeError::ChannelClosed)
        .and_then(|r| r.map_err(RuntimeError::from))
}

/// State owned by the persistence task.
struct Worker {
    slots: Arc<Mutex<Box<dyn SlotStore>>>,
    pending: Pending,
    deadline: Instant,
    last_durable: Revision,
    durable_tx: mpsc::UnboundedSender<Revision>,
    latency: Duration,
    flush_on_mutation: bool,
}

impl Worker {
    /// Stages new data, starting the batch window if nothing was pending,
    /// and writes straight away when configured to.
    async fn stage(&mut self, fill: impl FnOnce(&mut Pending)) -> PersistResult<()> {
        if self.pending.is_empty() {
            self.deadline = Instant::now() + self.latency;
        }
        fill(&mut self.pending);
        if self.flush_on_mutation {
            self.write(false).await
        } else {
            Ok(())
        }
    }

    /// Writes the pending batch. On failure the batch goes back into
    /// `pending` and is retried after [`RETRY_DELAY`] or the next flush.
    async fn write(&mut self, call_flush: bool) -> PersistResult<()> {
        if self.pending.is_empty() && !call_flush {
            return Ok(());
        }

        let batch = std::mem::take(&mut self.pending);
        let revision = batch.entries.as_ref().map(|(rev, _)| *rev);
        let slots = Arc::clone(&self.slots);
        let (batch, result) = tokio::task::spawn_blocking(move || {
            let mut slots = slots.blocking_lock();
            let result = write_batch(&mut **slots, &batch, call_flush);
            (batch, result)
        })
        .await
        .map_err(|e| PersistError::Message(format!("join error: {e}")))?;

        match result {
            Ok(()) => {
                if let Some(rev) = revision {
                    self.last_durable = self.last_durable.max(rev);
                    let _ = self.durable_tx.send(self.last_durable);
                }
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "leaderboard write failed, keeping it queued");
                self.pending.restore(batch);
                self.deadline = Instant::now() + self.latency.max(RETRY_DELAY);
                Err(err)
            }
        }
    }

    async fn read_stored(&self) -> PersistResult<Option<Stored>> {
        if !self.pending.is_empty() {
            return Ok(None);
        }
        let read: SlotCall<Stored> = Box::new(|slots: &mut dyn SlotStore| -> PersistResult<Stored> {
            Ok((persist::load_entries(&*slots)?, persist::load_settings(&*slots)?))
        });
        with_slots(&self.slots, read).await.map(Some)
    }
}

fn write_batch(slots: &mut dyn SlotStore, batch: &Pending, call_flush: bool) -> PersistResult<()> {
    if let Some(settings) = &batch.settings {
        persist::save_settings(slots, settings)?;
    }
    if let Some((_, entries)) = &batch.entries {
        persist::save_entries(slots, entries)?;
    }
    if call_flush {
        slots.flush()?;
    }
    Ok(())
}

fn spawn_persistence_worker(
    slots: Box<dyn SlotStore>,
    mut rx: mpsc::Receiver<PersistMsg>,
    durable_tx: mpsc::UnboundedSender<Revision>,
    config: &RuntimeConfig,
) {
    let latency = Duration::from_millis(config.batch_max_latency_ms);
    let mut worker = Worker {
        slots: Arc::new(Mutex::new(slots)),
        pending: Pending::default(),
        deadline: Instant::now() + latency,
        last_durable: 0,
        durable_tx,
        latency,
        flush_on_mutation: config.flush_on_mutation,
    };

    tokio::spawn(async move {
        loop {
            tokio::select! {
                msg = rx.recv() => {
                    let Some(msg) = msg else {
                        let _ = worker.write(true).await;
                        break;
                    };

                    match msg {
                        PersistMsg::Entries { revision, entries, resp } => {
                            let result = worker.stage(|p| p.entries = Some((revision, entries))).await;
                            let _ = resp.send(result);
                        }
                        PersistMsg::Settings { settings, resp } => {
                            let result = worker.stage(|p| p.settings = Some(settings)).await;
                            let _ = resp.send(result);
                        }
                        PersistMsg::Reload { resp } => {
                            let _ = resp.send(worker.read_stored().await);
                        }
                        PersistMsg::LoadSession { resp } => {
                            let result = with_slots(&worker.slots, Box::new(|s: &mut dyn SlotStore| persist::load_session(&*s))).await;
                            let _ = resp.send(result);
                        }
                        PersistMsg::WriteSession { call, resp } => {
                            let _ = resp.send(with_slots(&worker.slots, call).await);
                        }
                        PersistMsg::Flush { resp } => {
                            let result = worker.write(true).await;
                            let _ = resp.send(result.map(|_| worker.last_durable));
                        }
                        PersistMsg::Shutdown { resp } => {
                            let _ = resp.send(worker.write(true).await);
                            break;
                        }
                    }
                }
                _ = tokio::time::sleep_until(worker.deadline), if !worker.pending.is_empty() => {
                    let _ = worker.write(false).await;
                }
            }
        }
    });
}

async fn with_slots<T: Send + 'static>(
    slots: &Arc<Mutex<Box<dyn SlotStore>>>,
    call: SlotCall<T>,
) -> PersistResult<T> {
    let slots_ref = Arc::clone(slots);
    tokio::task::spawn_blocking(move || {
        let mut slots = slots_ref.blocking_lock();
        call(&mut **slots)
    })
    .await
    .map_err(|e| PersistError::Message(format!("join error: {e}")))?
}
