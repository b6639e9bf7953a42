//! Subscriptions owned by a mounted view.
//!
//! A view that shows remote data keeps two watchers alive while it is
//! mounted: the session-change subscription and a document visibility
//! listener that reloads when the tab becomes visible again. Both live in a
//! [`ViewLifecycle`] and are released when it is dropped, so a view that
//! unmounts never receives another callback.

use api::Subscription;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{closure::Closure, JsCast};

/// A DOM event listener removed again on drop. Inert outside the browser.
pub struct DomListener {
    #[cfg(target_arch = "wasm32")]
    attached: Option<(web_sys::EventTarget, &'static str, Closure<dyn FnMut(web_sys::Event)>)>,
}

impl DomListener {
    pub fn on_window(event: &'static str, callback: impl FnMut() + 'static) -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            let target = web_sys::window().map(web_sys::EventTarget::from);
            Self::attach(target, event, callback)
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = (event, callback);
            Self {}
        }
    }

    pub fn on_document(event: &'static str, callback: impl FnMut() + 'static) -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            let target = web_sys::window()
                .and_then(|w| w.document())
                .map(web_sys::EventTarget::from);
            Self::attach(target, event, callback)
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = (event, callback);
            Self {}
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn attach(
        target: Option<web_sys::EventTarget>,
        event: &'static str,
        mut callback: impl FnMut() + 'static,
    ) -> Self {
        let Some(target) = target else {
            return Self { attached: None };
        };
        let closure = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_event| callback()));
        if let Err(e) = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref()) {
            tracing::warn!("Failed to listen for {event}: {e:?}");
            return Self { attached: None };
        }
        Self {
            attached: Some((target, event, closure)),
        }
    }
}

impl Drop for DomListener {
    fn drop(&mut self) {
        #[cfg(target_arch = "wasm32")]
        if let Some((target, event, closure)) = self.attached.take() {
            let _ = target.remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub fn document_visible() -> bool {
    web_sys::window()
        .and_then(|w| w.document())
        .map(|d| d.visibility_state() == web_sys::VisibilityState::Visible)
        .unwrap_or(true)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn document_visible() -> bool {
    true
}

/// Calls back whenever the document turns visible.
pub struct VisibilityWatch {
    _listener: DomListener,
}

impl VisibilityWatch {
    pub fn new(on_visible: impl Fn() + 'static) -> Self {
        Self {
            _listener: DomListener::on_document("visibilitychange", move || {
                if document_visible() {
                    on_visible();
                }
            }),
        }
    }
}

/// Watchers of one mounted view.
pub struct ViewLifecycle {
    session: Subscription,
    _visibility: VisibilityWatch,
}

impl ViewLifecycle {
    pub fn new(session: Subscription, visibility: VisibilityWatch) -> Self {
        Self {
            session,
            _visibility: visibility,
        }
    }

    pub fn is_active(&self) -> bool {
        self.session.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api::SessionEvents;

    #[test]
    fn test_dropping_lifecycle_releases_subscription() {
        let events = SessionEvents::new();
        let lifecycle = ViewLifecycle::new(events.subscribe(|_| {}), VisibilityWatch::new(|| {}));
        assert!(lifecycle.is_active());
        assert_eq!(events.listener_count(), 1);

        drop(lifecycle);

        assert_eq!(events.listener_count(), 0);
    }
}
