//! Debounced input loop around a `FilterEngine`.
//!
//! Events are coalesced per slot (last wins, each event restarts its slot's
//! interval). A fixed tick applies due events, recomputes and publishes the
//! view through an `ArcSwap` plus a `watch` epoch.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use kadi_core::WeaponLite;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::engine::{FilterEngine, FilterView, SortSpec};
use crate::facet::{FacetKey, InputSlot, Selection};

#[derive(Debug, Clone)]
pub enum FilterEvent {
    Facet(FacetKey, Selection),
    Query(String),
    Sort(Option<SortSpec>),
    GroupBy(Option<FacetKey>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Slot {
    Facet(FacetKey),
    Query,
    Sort,
    GroupBy,
}

impl FilterEvent {
    fn slot(&self) -> Slot {
        match self {
            FilterEvent::Facet(k, _) => Slot::Facet(*k),
            FilterEvent::Query(_) => Slot::Query,
            FilterEvent::Sort(_) => Slot::Sort,
            FilterEvent::GroupBy(_) => Slot::GroupBy,
        }
    }

    fn input(&self) -> InputSlot {
        match self {
            FilterEvent::Facet(k, _) => k.slot(),
            FilterEvent::Query(_) => InputSlot::Text,
            FilterEvent::Sort(_) | FilterEvent::GroupBy(_) => InputSlot::Toggle,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DebounceConfig {
    pub toggle: Duration,
    pub slider: Duration,
    pub text: Duration,
    pub tick: Duration,
    pub capacity: usize,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            toggle: Duration::from_millis(100),
            slider: Duration::from_millis(100),
            text: Duration::from_millis(100),
            tick: Duration::from_millis(8),
            capacity: 256,
        }
    }
}

impl DebounceConfig {
    /// Defaults overridden by `KADI_DEBOUNCE_{TOGGLE,SLIDER,TEXT}_MS`.
    pub fn from_env() -> Self {
        let ms = |name: &str, default: Duration| {
            std::env::var(name).ok().and_then(|v| v.trim().parse::<u64>().ok()).map(Duration::from_millis).unwrap_or(default)
        };
        let d = Self::default();
        Self {
            toggle: ms("KADI_DEBOUNCE_TOGGLE_MS", d.toggle),
            slider: ms("KADI_DEBOUNCE_SLIDER_MS", d.slider),
            text: ms("KADI_DEBOUNCE_TEXT_MS", d.text),
            ..d
        }
    }

    fn interval(&self, slot: InputSlot) -> Duration {
        match slot {
            InputSlot::Toggle => self.toggle,
            InputSlot::Slider => self.slider,
            InputSlot::Text => self.text,
        }
    }
}

/// Coalesces events per slot with a per-slot deadline.
struct Pending {
    slots: BTreeMap<Slot, (Instant, FilterEvent)>,
}

impl Pending {
    fn new() -> Self { Self { slots: BTreeMap::new() } }

    fn push(&mut self, ev: FilterEvent, cfg: &DebounceConfig, now: Instant) {
        let deadline = now + cfg.interval(ev.input());
        self.slots.insert(ev.slot(), (deadline, ev));
    }

    fn drain_due(&mut self, now: Instant) -> Vec<FilterEvent> {
        let due: Vec<Slot> = self.slots.iter().filter(|(_, (d, _))| *d <= now).map(|(s, _)| *s).collect();
        due.into_iter().filter_map(|s| self.slots.remove(&s)).map(|(_, ev)| ev).collect()
    }

    fn drain_all(&mut self) -> Vec<FilterEvent> {
        std::mem::take(&mut self.slots).into_values().map(|(_, ev)| ev).collect()
    }
}

fn apply(engine: &mut FilterEngine, ev: FilterEvent) {
    let res = match ev {
        FilterEvent::Facet(k, sel) => engine.set_facet_values(k, sel),
        FilterEvent::Query(q) => {
            engine.set_query(q);
            Ok(())
        }
        FilterEvent::Sort(s) => {
            engine.set_sort(s);
            Ok(())
        }
        FilterEvent::GroupBy(k) => engine.set_group_by(k),
    };
    if let Err(e) = res {
        warn!(error = %e, "filter event rejected");
    }
}

/// Read side of the loop: latest view and an epoch subscription.
#[derive(Clone)]
pub struct FilterHandle {
    view: Arc<ArcSwap<FilterView>>,
    epoch_rx: watch::Receiver<u64>,
    weapons: Arc<Vec<WeaponLite>>,
}

impl FilterHandle {
    pub fn current(&self) -> Arc<FilterView> { self.view.load_full() }
    pub fn subscribe_epoch(&self) -> watch::Receiver<u64> { self.epoch_rx.clone() }
    pub fn weapons(&self) -> &Arc<Vec<WeaponLite>> { &self.weapons }
}

/// Spawn the debounced loop. It exits after the sender closes, publishing a final view.
pub fn spawn_filter_loop(mut engine: FilterEngine, cfg: DebounceConfig) -> (mpsc::Sender<FilterEvent>, FilterHandle) {
    let (tx, mut rx) = mpsc::channel::<FilterEvent>(cfg.capacity.max(1));
    let view = Arc::new(ArcSwap::from_pointee(engine.view()));
    let (epoch_tx, epoch_rx) = watch::channel(0u64);
    let handle = FilterHandle { view: Arc::clone(&view), epoch_rx, weapons: Arc::clone(engine.weapons()) };

    tokio::spawn(async move {
        let mut pending = Pending::new();
        let mut epoch = 0u64;
        let mut ticker = tokio::time::interval(cfg.tick);
        let mut publish = |engine: &FilterEngine| {
            epoch += 1;
            let mut next = engine.view();
            next.epoch = epoch;
            debug!(epoch, hits = next.hits.len(), "filter view published");
            view.store(Arc::new(next));
            let _ = epoch_tx.send(epoch);
        };
        loop {
            tokio::select! {
                maybe = rx.recv() => {
                    match maybe {
                        Some(ev) => pending.push(ev, &cfg, Instant::now()),
                        None => {
                            debug!("filter event channel closed; applying pending events");
                            for ev in pending.drain_all() {
                                apply(&mut engine, ev);
                            }
                            publish(&engine);
                            break;
                        }
                    }
                }
                _ = ticker.tick() => {
                    let due = pending.drain_due(Instant::now());
                    if !due.is_empty() {
                        for ev in due {
                            apply(&mut engine, ev);
                        }
                        publish(&engine);
                    }
                }
            }
        }
        info!(epoch, "filter loop stopped");
    });

    (tx, handle)
}
