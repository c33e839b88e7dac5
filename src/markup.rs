//! HTML rendering for deferred images.
//!
//! Uses [maud](https://maud.lambda.xyz/) like the rest of the crate. Three
//! shapes are produced depending on the loader's phase:
//!
//! - **Pending**: a `div.lf-placeholder` block sized by
//!   [`PlaceholderBox`](crate::placeholder::PlaceholderBox).
//! - **Visible / Loaded**: the real `<img>`, wrapped in `<picture>` when the
//!   directive has alternate formats.
//! - **Failed**: a plain `<img>` whose source is the placeholder resource.
//!   No `<source>` children, or the browser would keep choosing them. The
//!   image's own aspect ratio is pinned inline; otherwise the placeholder's
//!   intrinsic ratio would resize the box.
//!
//! The image carries `lf-loading` until it settles, then `lf-loaded`; the
//! stylesheet fades between the two.
//!
//! [`render_frame`] wraps any of these for static output: a pending image
//! gets a `<template>` holding its in-view markup, and `data-lf-*` attributes
//! tell the hydration script how to observe it.

use crate::directive::{ImageDirective, Loading};
use crate::formats::ordered_alternates;
use crate::loader::{LazyImage, Phase};
use crate::placeholder::PlaceholderBox;
use maud::{Markup, html};

fn class_list(base: &[&str], extra: Option<&str>) -> String {
    let mut classes: Vec<&str> = base.to_vec();
    if let Some(extra) = extra.map(str::trim).filter(|c| !c.is_empty()) {
        classes.push(extra);
    }
    classes.join(" ")
}

fn non_empty(s: &str) -> Option<&str> {
    Some(s).filter(|s| !s.is_empty())
}

/// Generated declarations first, then the caller's `style` hook.
fn merge_style(generated: &str, extra: Option<&str>) -> Option<String> {
    let extra = extra.map(str::trim).filter(|s| !s.is_empty());
    match (non_empty(generated), extra) {
        (Some(generated), Some(extra)) => Some(format!("{generated} {extra}")),
        (Some(generated), None) => Some(generated.to_string()),
        (None, extra) => extra.map(str::to_string),
    }
}

/// Render a loader in its current phase.
pub fn render(image: &LazyImage) -> Markup {
    match image.phase() {
        Phase::Pending => placeholder_block(image.directive(), &image.settings().min_height),
        Phase::Visible | Phase::Loaded => {
            picture(image.directive(), image.is_settled(), image.loading_attr())
        }
        Phase::Failed => fallback_img(image.directive(), image.placeholder()),
    }
}

/// The block shown while an image is deferred.
pub fn placeholder_block(directive: &ImageDirective, min_height: &str) -> Markup {
    let geometry = PlaceholderBox::for_directive(directive, min_height);
    html! {
        div
            class=(class_list(&["lf-placeholder"], directive.class.as_deref()))
            style=[merge_style(&geometry.to_css(), directive.style.as_deref())]
            role="img"
            aria-label=[non_empty(&directive.alt)] {}
    }
}

/// The real image, format-negotiated when alternates exist.
///
/// Every `<source>` shares the directive's `sizes` hint; the primary
/// resource is the `<img>` fallback. `loading` is the attribute actually
/// emitted, which may differ from the directive's (see
/// [`LazyImage::loading_attr`]).
pub fn picture(directive: &ImageDirective, settled: bool, loading: Loading) -> Markup {
    let alternates = ordered_alternates(&directive.formats);
    if alternates.is_empty() {
        return img(directive, settled, loading);
    }
    html! {
        picture {
            @for (format, url) in &alternates {
                source type=(format.mime_type()) srcset=(url) sizes=(directive.sizes);
            }
            (img(directive, settled, loading))
        }
    }
}

fn img(directive: &ImageDirective, settled: bool, loading: Loading) -> Markup {
    let state = if settled { "lf-loaded" } else { "lf-loading" };
    let sizes = directive.srcset.as_ref().map(|_| directive.sizes.as_str());
    html! {
        img
            src=(directive.src)
            alt=(directive.alt)
            width=[directive.width]
            height=[directive.height]
            srcset=[directive.srcset.as_deref()]
            sizes=[sizes]
            loading=(loading.as_str())
            decoding="async"
            fetchpriority=[directive.priority.then_some("high")]
            class=(class_list(&["lf-img", state], directive.class.as_deref()))
            style=[directive.style.as_deref()];
    }
}

/// The image after a failed load: placeholder source, settled opacity.
pub fn fallback_img(directive: &ImageDirective, placeholder: &str) -> Markup {
    let ratio = PlaceholderBox::for_directive(directive, "0")
        .aspect_ratio
        .map(|(w, h)| format!("aspect-ratio: {w} / {h};"))
        .unwrap_or_default();
    html! {
        img
            src=(placeholder)
            alt=(directive.alt)
            width=[directive.width]
            height=[directive.height]
            class=(class_list(&["lf-img", "lf-loaded", "lf-failed"], directive.class.as_deref()))
            style=[merge_style(&ratio, directive.style.as_deref())];
    }
}

/// Static first render of a loader plus what the hydration script needs.
pub fn render_frame(image: &LazyImage) -> Markup {
    let pending = image.phase() == Phase::Pending;
    let observe = image.observe_options();
    html! {
        div.lf-frame
            data-lf-state=(image.phase().as_str())
            data-lf-threshold=[pending.then_some(observe.threshold)]
            data-lf-margin=[pending.then_some(observe.root_margin.as_str())]
            data-lf-placeholder=(image.placeholder()) {
            (render(image))
            @if pending {
                template.lf-template {
                    (picture(image.directive(), false, image.loading_attr()))
                }
            }
        }
    }
}
