//! Scripted runs of a single loader.
//!
//! Backs the `lazyframe simulate` command: build a directive, mount it on a
//! [`ManualWatcher`] (or on [`Unsupported`] to model a host without
//! visibility detection), replay an event script and record every step.
//!
//! ```text
//! $ lazyframe simulate --src /a.jpg --width 400 --height 250 --events leave,intersect,leave,load
//! ```

use crate::config::SiteConfig;
use crate::directive::ImageDirective;
use crate::loader::{LazyImage, Phase, Transition};
use crate::visibility::{IntersectionEntry, ManualWatcher, Unsupported};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum SimulateError {
    #[error("unknown event '{0}' (expected intersect, leave, load, error or unmount)")]
    UnknownEvent(String),
}

/// One scripted host event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimEvent {
    /// An intersecting visibility entry.
    Intersect,
    /// A non-intersecting visibility entry.
    Leave,
    Load,
    Error,
    Unmount,
}

impl FromStr for SimEvent {
    type Err = SimulateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "intersect" | "enter" => Ok(SimEvent::Intersect),
            "leave" | "exit" => Ok(SimEvent::Leave),
            "load" => Ok(SimEvent::Load),
            "error" => Ok(SimEvent::Error),
            "unmount" => Ok(SimEvent::Unmount),
            other => Err(SimulateError::UnknownEvent(other.to_string())),
        }
    }
}

impl fmt::Display for SimEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SimEvent::Intersect => "intersect",
            SimEvent::Leave => "leave",
            SimEvent::Load => "load",
            SimEvent::Error => "error",
            SimEvent::Unmount => "unmount",
        })
    }
}

/// Parse a comma-separated event script. Blank items are skipped.
pub fn parse_events(script: &str) -> Result<Vec<SimEvent>, SimulateError> {
    script
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(str::parse)
        .collect()
}

/// What happened at one step of the script.
#[derive(Debug, Clone, PartialEq)]
pub struct SimStep {
    pub event: SimEvent,
    pub transition: Option<Transition>,
    /// Phase after the event.
    pub phase: Phase,
    /// Whether an observation was still connected after the event.
    pub observing: bool,
}

/// Full record of a simulated run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationReport {
    pub src: String,
    /// Phase before mounting, i.e. the very first render.
    pub initial_phase: Phase,
    pub initial_markup: String,
    /// Transition caused by mounting, if any.
    pub mount: Option<Transition>,
    pub observer_available: bool,
    pub steps: Vec<SimStep>,
    pub final_phase: Phase,
    pub final_markup: String,
}

/// Run `events` against a freshly created loader.
pub fn run(
    directive: ImageDirective,
    config: &SiteConfig,
    observer_available: bool,
    events: &[SimEvent],
) -> SimulationReport {
    let watcher = ManualWatcher::new();
    let src = directive.src.clone();
    let mut image = LazyImage::new(directive, config);
    let initial_phase = image.phase();
    let initial_markup = image.render().into_string();

    let mount = if observer_available {
        image.mount(&watcher)
    } else {
        image.mount(&Unsupported)
    };

    let steps = events
        .iter()
        .map(|&event| {
            let transition = match event {
                SimEvent::Intersect => watcher.dispatch(&mut image, IntersectionEntry::entering(1.0)),
                SimEvent::Leave => watcher.dispatch(&mut image, IntersectionEntry::leaving()),
                SimEvent::Load => image.on_load(),
                SimEvent::Error => image.on_error(),
                SimEvent::Unmount => {
                    image.unmount();
                    None
                }
            };
            SimStep {
                event,
                transition,
                phase: image.phase(),
                observing: image.observation_id().is_some(),
            }
        })
        .collect();

    SimulationReport {
        src,
        initial_phase,
        initial_markup,
        mount,
        observer_available,
        steps,
        final_phase: image.phase(),
        final_markup: image.render().into_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::Loading;

    fn directive() -> ImageDirective {
        ImageDirective::new("/a.jpg").with_dimensions(400, 250)
    }

    #[test]
    fn parse_events_accepts_aliases_and_blanks() {
        let events = parse_events("intersect, LEAVE,,load,enter,exit").unwrap();
        assert_eq!(
            events,
            vec![
                SimEvent::Intersect,
                SimEvent::Leave,
                SimEvent::Load,
                SimEvent::Intersect,
                SimEvent::Leave
            ]
        );
    }

    #[test]
    fn parse_events_rejects_unknown() {
        assert_eq!(
            parse_events("intersect,scroll"),
            Err(SimulateError::UnknownEvent("scroll".to_string()))
        );
    }

    #[test]
    fn lazy_run_swaps_once_and_never_reverts() {
        let events = parse_events("leave,intersect,leave,intersect").unwrap();
        let report = run(directive(), &SiteConfig::default(), true, &events);

        assert_eq!(report.initial_phase, Phase::Pending);
        assert_eq!(report.mount, None);
        let transitions: Vec<Option<Transition>> =
            report.steps.iter().map(|s| s.transition).collect();
        assert_eq!(transitions[0], None);
        assert_eq!(transitions[1].map(|t| t.to), Some(Phase::Visible));
        assert_eq!(transitions[2], None);
        assert_eq!(transitions[3], None);
        assert!(report.steps[0].observing);
        assert!(!report.steps[1].observing);
        assert!(report.final_markup.contains(r#"<img src="/a.jpg""#));
    }

    #[test]
    fn eager_run_starts_visible() {
        let report = run(
            directive().with_loading(Loading::Eager),
            &SiteConfig::default(),
            true,
            &[SimEvent::Load],
        );
        assert_eq!(report.initial_phase, Phase::Visible);
        assert!(report.initial_markup.contains("<img"));
        assert_eq!(report.final_phase, Phase::Loaded);
    }

    #[test]
    fn missing_observer_mounts_visible() {
        let report = run(directive(), &SiteConfig::default(), false, &[]);
        assert_eq!(report.initial_phase, Phase::Pending);
        assert_eq!(report.mount.map(|t| t.to), Some(Phase::Visible));
        assert_eq!(report.final_phase, Phase::Visible);
    }

    #[test]
    fn unmount_stops_delivery() {
        let events = parse_events("unmount,intersect").unwrap();
        let report = run(directive(), &SiteConfig::default(), true, &events);
        assert!(!report.steps[0].observing);
        assert_eq!(report.steps[1].transition, None);
        assert_eq!(report.final_phase, Phase::Pending);
    }

    #[test]
    fn error_run_settles_on_placeholder() {
        let events = parse_events("intersect,error").unwrap();
        let report = run(directive(), &SiteConfig::default(), true, &events);
        assert_eq!(report.final_phase, Phase::Failed);
        assert!(report.final_markup.contains("lf-loaded"));
        assert!(report.final_markup.contains("data:image/svg+xml"));
    }
}
