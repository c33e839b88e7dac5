//! Viewport-visibility capability.
//!
//! Whether the host can tell when an element approaches the viewport is an
//! injected capability, not something the loader queries globally. A
//! [`VisibilityWatcher`] either registers an observation (returning an
//! [`Observation`] guard) or reports that the capability is missing by
//! returning `None`, which makes the loader render eagerly.
//!
//! Observations are RAII guards: dropping one disconnects it. A loader that
//! is unmounted, or whose strategy changes, drops its guard and the host
//! stops delivering entries for it.
//!
//! Two implementations ship with the crate:
//!
//! - [`Unsupported`]: no capability; every image renders eagerly.
//! - [`ManualWatcher`]: entries are delivered explicitly by the caller. Used
//!   by the `simulate` command and throughout the tests.

use crate::loader::{LazyImage, Transition};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

/// Parameters of one observation registration.
#[derive(Debug, Clone, PartialEq)]
pub struct ObserveOptions {
    /// Fraction of the target's area that must be visible.
    pub threshold: f64,
    /// Margin grown around the viewport before intersecting (CSS length).
    pub root_margin: String,
}

/// One visibility notification for an observed target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    pub is_intersecting: bool,
    pub intersection_ratio: f64,
}

impl IntersectionEntry {
    pub fn entering(ratio: f64) -> Self {
        Self {
            is_intersecting: true,
            intersection_ratio: ratio,
        }
    }

    pub fn leaving() -> Self {
        Self {
            is_intersecting: false,
            intersection_ratio: 0.0,
        }
    }
}

/// Identifier of a live observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObservationId(pub u64);

impl fmt::Display for ObservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Guard for a registered observation. Dropping it disconnects.
pub struct Observation {
    id: ObservationId,
    disconnect: Option<Box<dyn FnOnce(ObservationId)>>,
}

impl Observation {
    /// Create a guard that runs `disconnect` exactly once, on drop.
    pub fn new(id: ObservationId, disconnect: impl FnOnce(ObservationId) + 'static) -> Self {
        Self {
            id,
            disconnect: Some(Box::new(disconnect)),
        }
    }

    pub fn id(&self) -> ObservationId {
        self.id
    }
}

impl Drop for Observation {
    fn drop(&mut self) {
        if let Some(disconnect) = self.disconnect.take() {
            disconnect(self.id);
        }
    }
}

impl fmt::Debug for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observation").field("id", &self.id).finish()
    }
}

/// Host capability for observing when a placeholder nears the viewport.
pub trait VisibilityWatcher {
    /// Register an observation of the placeholder.
    ///
    /// Returns `None` when the host has no visibility capability.
    fn observe(&self, options: &ObserveOptions) -> Option<Observation>;
}

/// Host without visibility detection. Images are never deferred.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unsupported;

impl VisibilityWatcher for Unsupported {
    fn observe(&self, _options: &ObserveOptions) -> Option<Observation> {
        None
    }
}

#[derive(Debug, Default)]
struct Registry {
    next_id: u64,
    active: BTreeMap<ObservationId, ObserveOptions>,
    registered: u64,
    disconnected: u64,
}

/// Watcher whose entries are delivered by hand.
///
/// Keeps a registry of live observations; [`ManualWatcher::dispatch`] only
/// reaches a loader whose observation is still connected, mirroring a real
/// observer that stops calling back after `disconnect()`.
#[derive(Debug, Clone, Default)]
pub struct ManualWatcher {
    registry: Rc<RefCell<Registry>>,
}

impl ManualWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver an entry to `image` if its observation is connected.
    ///
    /// Returns `None` when nothing was delivered or the entry caused no
    /// transition.
    pub fn dispatch(&self, image: &mut LazyImage, entry: IntersectionEntry) -> Option<Transition> {
        let id = image.observation_id()?;
        if !self.is_active(id) {
            return None;
        }
        image.on_intersection(entry)
    }

    pub fn is_active(&self, id: ObservationId) -> bool {
        self.registry.borrow().active.contains_key(&id)
    }

    /// Number of currently connected observations.
    pub fn active_count(&self) -> usize {
        self.registry.borrow().active.len()
    }

    /// Options a live observation was registered with.
    pub fn options(&self, id: ObservationId) -> Option<ObserveOptions> {
        self.registry.borrow().active.get(&id).cloned()
    }

    /// Total registrations and disconnections since creation.
    pub fn counts(&self) -> (u64, u64) {
        let reg = self.registry.borrow();
        (reg.registered, reg.disconnected)
    }
}

impl VisibilityWatcher for ManualWatcher {
    fn observe(&self, options: &ObserveOptions) -> Option<Observation> {
        let id = {
            let mut reg = self.registry.borrow_mut();
            reg.next_id += 1;
            let id = ObservationId(reg.next_id);
            reg.active.insert(id, options.clone());
            reg.registered += 1;
            id
        };
        let registry: Weak<RefCell<Registry>> = Rc::downgrade(&self.registry);
        Some(Observation::new(id, move |id| {
            if let Some(registry) = registry.upgrade() {
                let mut reg = registry.borrow_mut();
                if reg.active.remove(&id).is_some() {
                    reg.disconnected += 1;
                }
            }
        }))
    }
}
