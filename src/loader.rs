//! Deferred image loader.
//!
//! [`LazyImage`] is the state machine behind one deferred image. The host
//! (a browser hydration script, the `simulate` command, or a test) feeds it
//! events and renders it whenever it likes; the loader itself never blocks
//! and owns nothing but its directive, its phase, and at most one live
//! visibility [`Observation`].
//!
//! ```text
//!            intersect / exempt on mount
//!  Pending ─────────────────────────────▶ Visible ──load──▶ Loaded
//!                                            │
//!                                            └───error──▶ Failed
//! ```
//!
//! `Loaded` and `Failed` are terminal and render identically except for the
//! image source: a failed image shows the placeholder resource. Both count as
//! *settled*, which is what drives the fade to full opacity.
//!
//! ## Eagerness
//!
//! Two independent knobs can skip deferral:
//!
//! - `loading = eager` always starts the loader in `Visible`.
//! - `priority = true` does the same while
//!   `loader.priority_bypasses_observation` is set (the default). With that
//!   flag off, a lazy priority image is still observed but with the wider
//!   `priority_root_margin`.
//!
//! A host without visibility detection ([`Unsupported`](crate::visibility::Unsupported))
//! makes every image `Visible` on mount.

use crate::config::SiteConfig;
use crate::directive::{ImageDirective, Loading};
use crate::markup;
use crate::placeholder::resolve_placeholder;
use crate::visibility::{
    IntersectionEntry, Observation, ObservationId, ObserveOptions, VisibilityWatcher,
};
use maud::Markup;
use std::fmt;

/// Lifecycle phase of one loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Not observed yet, or observed but not intersecting.
    Pending,
    /// In view (or exempt); the real image is rendered and loading.
    Visible,
    /// The real image finished loading.
    Loaded,
    /// The real image failed; the placeholder stands in for it.
    Failed,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Pending => "pending",
            Phase::Visible => "visible",
            Phase::Loaded => "loaded",
            Phase::Failed => "failed",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A phase change produced by an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: Phase,
    pub to: Phase,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} \u{2192} {}", self.from, self.to)
    }
}

/// Events a host delivers to a loader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoaderEvent {
    Intersection(IntersectionEntry),
    Load,
    Error,
}

/// Loader tuning taken from [`SiteConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct LoaderSettings {
    pub threshold: f64,
    pub root_margin: String,
    pub priority_root_margin: String,
    pub priority_bypasses_observation: bool,
    pub min_height: String,
}

impl LoaderSettings {
    pub fn from_site_config(config: &SiteConfig) -> Self {
        Self {
            threshold: config.loader.threshold,
            root_margin: config.loader.root_margin.clone(),
            priority_root_margin: config.loader.priority_root_margin.clone(),
            priority_bypasses_observation: config.loader.priority_bypasses_observation,
            min_height: config.placeholder.min_height.clone(),
        }
    }
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self::from_site_config(&SiteConfig::default())
    }
}

/// State machine for one deferred image.
#[derive(Debug)]
pub struct LazyImage {
    directive: ImageDirective,
    placeholder: String,
    settings: LoaderSettings,
    phase: Phase,
    observation: Option<Observation>,
}

impl LazyImage {
    /// Create a loader. Exempt directives start `Visible`, so the very first
    /// render already shows the real image.
    pub fn new(directive: ImageDirective, config: &SiteConfig) -> Self {
        let placeholder = resolve_placeholder(&directive, config);
        let mut image = Self {
            directive,
            placeholder,
            settings: LoaderSettings::from_site_config(config),
            phase: Phase::Pending,
            observation: None,
        };
        if image.bypasses_observation() {
            image.phase = Phase::Visible;
        }
        image
    }

    pub fn directive(&self) -> &ImageDirective {
        &self.directive
    }

    pub fn settings(&self) -> &LoaderSettings {
        &self.settings
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Placeholder resource used while pending and after a failed load.
    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Whether the real image element is rendered.
    pub fn is_in_view(&self) -> bool {
        self.phase != Phase::Pending
    }

    /// Whether loading finished, successfully or not.
    pub fn is_settled(&self) -> bool {
        matches!(self.phase, Phase::Loaded | Phase::Failed)
    }

    pub fn has_error(&self) -> bool {
        self.phase == Phase::Failed
    }

    /// Source the rendered `<img>` points at.
    pub fn current_src(&self) -> &str {
        if self.has_error() {
            &self.placeholder
        } else {
            &self.directive.src
        }
    }

    /// Id of the live observation, if one is registered.
    pub fn observation_id(&self) -> Option<ObservationId> {
        self.observation.as_ref().map(Observation::id)
    }

    /// Whether this directive skips visibility observation entirely.
    pub fn bypasses_observation(&self) -> bool {
        self.directive.is_eager()
            || (self.directive.priority && self.settings.priority_bypasses_observation)
    }

    /// `loading` attribute for the real `<img>`. Images that skip observation
    /// fetch immediately, whatever the directive asked for.
    pub fn loading_attr(&self) -> Loading {
        if self.bypasses_observation() {
            Loading::Eager
        } else {
            self.directive.loading
        }
    }

    /// Observation parameters: the priority margin is wider so priority
    /// images start fetching earlier.
    pub fn observe_options(&self) -> ObserveOptions {
        let root_margin = if self.directive.priority {
            &self.settings.priority_root_margin
        } else {
            &self.settings.root_margin
        };
        ObserveOptions {
            threshold: self.settings.threshold,
            root_margin: root_margin.clone(),
        }
    }

    /// Attach to the host once the placeholder exists.
    ///
    /// Registers an observation for pending deferred images. Exempt images
    /// and hosts without visibility capability go straight to `Visible`.
    pub fn mount(&mut self, watcher: &dyn VisibilityWatcher) -> Option<Transition> {
        if self.phase != Phase::Pending || self.observation.is_some() {
            return None;
        }
        if self.bypasses_observation() {
            return self.advance(Phase::Visible);
        }
        match watcher.observe(&self.observe_options()) {
            Some(observation) => {
                tracing::trace!(
                    src = %self.directive.src,
                    observation = %observation.id(),
                    "observing placeholder"
                );
                self.observation = Some(observation);
                None
            }
            None => self.advance(Phase::Visible),
        }
    }

    /// Detach from the host. Disconnects any live observation.
    pub fn unmount(&mut self) {
        self.observation = None;
    }

    /// Apply a new loading strategy / priority.
    ///
    /// Any observation bound to the old configuration is torn down. A pending
    /// loader is then re-evaluated as if freshly mounted; an in-view loader
    /// never returns to `Pending`.
    pub fn reconfigure(
        &mut self,
        loading: Loading,
        priority: bool,
        watcher: &dyn VisibilityWatcher,
    ) -> Option<Transition> {
        if self.directive.loading == loading && self.directive.priority == priority {
            return None;
        }
        self.directive.loading = loading;
        self.directive.priority = priority;
        let was_observing = self.observation.take().is_some();
        if was_observing || self.bypasses_observation() {
            self.mount(watcher)
        } else {
            None
        }
    }

    /// Handle a visibility entry. Only the first intersecting entry while
    /// observed moves the loader; it also ends the observation.
    pub fn on_intersection(&mut self, entry: IntersectionEntry) -> Option<Transition> {
        if self.phase != Phase::Pending || self.observation.is_none() || !entry.is_intersecting {
            return None;
        }
        self.observation = None;
        self.advance(Phase::Visible)
    }

    /// The real image loaded.
    pub fn on_load(&mut self) -> Option<Transition> {
        if self.phase != Phase::Visible {
            return None;
        }
        self.advance(Phase::Loaded)
    }

    /// The real image failed to load. Recovered locally: the placeholder
    /// takes the image's place and the fade settles.
    pub fn on_error(&mut self) -> Option<Transition> {
        if self.phase != Phase::Visible {
            return None;
        }
        self.advance(Phase::Failed)
    }

    pub fn handle(&mut self, event: LoaderEvent) -> Option<Transition> {
        match event {
            LoaderEvent::Intersection(entry) => self.on_intersection(entry),
            LoaderEvent::Load => self.on_load(),
            LoaderEvent::Error => self.on_error(),
        }
    }

    /// Render the current phase.
    pub fn render(&self) -> Markup {
        markup::render(self)
    }

    fn advance(&mut self, to: Phase) -> Option<Transition> {
        let from = self.phase;
        self.phase = to;
        tracing::trace!(src = %self.directive.src, %from, %to, "phase transition");
        Some(Transition { from, to })
    }
}
