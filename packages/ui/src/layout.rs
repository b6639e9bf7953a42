//! Desktop/mobile layout selection by viewport width.

use dioxus::prelude::*;

use crate::lifecycle::DomListener;

/// Viewports at least this wide (CSS px) get the three-pane desktop layout.
pub const DESKTOP_MIN_WIDTH: f64 = 1224.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutVariant {
    Desktop,
    Mobile,
}

impl LayoutVariant {
    pub fn for_width(width: f64) -> Self {
        if width >= DESKTOP_MIN_WIDTH {
            LayoutVariant::Desktop
        } else {
            LayoutVariant::Mobile
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn viewport_width() -> f64 {
    web_sys::window()
        .and_then(|w| w.inner_width().ok())
        .and_then(|w| w.as_f64())
        .unwrap_or(DESKTOP_MIN_WIDTH)
}

#[cfg(not(target_arch = "wasm32"))]
fn viewport_width() -> f64 {
    DESKTOP_MIN_WIDTH
}

pub fn use_layout() -> Signal<LayoutVariant> {
    use_context::<Signal<LayoutVariant>>()
}

/// Provides the current [`LayoutVariant`] and re-evaluates it on window resize.
#[component]
pub fn LayoutProvider(children: Element) -> Element {
    let variant = use_context_provider(|| Signal::new(LayoutVariant::for_width(viewport_width())));

    let _resize = use_hook(move || {
        std::rc::Rc::new(DomListener::on_window("resize", move || {
            let next = LayoutVariant::for_width(viewport_width());
            let mut variant = variant;
            if *variant.peek() != next {
                tracing::debug!(?next, "Layout changed");
                variant.set(next);
            }
        }))
    });

    rsx! {
        {children}
    }
}
