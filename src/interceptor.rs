//! Link-click interception.
//!
//! Each tab holds a [`NavigationGate`] that the tab manager consults before
//! letting the rendering engine follow a navigation. The stock gate,
//! [`LinkInterceptor`], turns middle-button clicks on links into "open in a
//! new tab" instead of navigating the current tab.
//!
//! The interceptor only remembers the last pointer button pressed. It does
//! not check that the navigation was actually caused by that press, so a
//! script navigation flagged as a link click right after a middle press is
//! also redirected.

use tracing::debug;
use winit::event::MouseButton as WinitMouseButton;

/// Pointer button as reported by the engine's input surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Left,
    Middle,
    Right,
    Back,
    Forward,
    Other(u16),
}

impl From<WinitMouseButton> for PointerButton {
    fn from(button: WinitMouseButton) -> Self {
        match button {
            WinitMouseButton::Left => Self::Left,
            WinitMouseButton::Right => Self::Right,
            WinitMouseButton::Middle => Self::Middle,
            WinitMouseButton::Back => Self::Back,
            WinitMouseButton::Forward => Self::Forward,
            WinitMouseButton::Other(id) => Self::Other(id),
        }
    }
}

/// What caused the engine to ask for a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationKind {
    /// The user activated a hyperlink.
    LinkClicked,
    /// Address bar, `load_url` or any other embedder-issued load.
    Typed,
    FormSubmitted,
    BackForward,
    Reload,
    /// Script or server redirect.
    Redirect,
    Other,
}

/// A navigation the engine wants to perform, awaiting a verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRequest {
    /// Engine-assigned id, echoed back with the verdict.
    pub id: u64,
    pub url: String,
    pub kind: NavigationKind,
}

impl NavigationRequest {
    pub fn new(id: u64, url: impl Into<String>, kind: NavigationKind) -> Self {
        Self {
            id,
            url: url.into(),
            kind,
        }
    }
}

/// Outcome of [`NavigationGate::check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationVerdict {
    /// Let the engine navigate the tab in place.
    Proceed,
    /// Do not navigate; open this URL in a new tab instead.
    OpenInNewTab(String),
}

/// Per-tab navigation policy consulted before the engine's default path.
pub trait NavigationGate {
    /// Records a raw pointer press on the tab's content.
    fn pointer_pressed(&mut self, button: PointerButton);

    /// Decides what to do with a navigation request. Evaluated synchronously,
    /// before the engine starts loading anything.
    fn check(&mut self, request: &NavigationRequest) -> NavigationVerdict;
}

/// Redirects middle-clicked links into new tabs.
#[derive(Debug, Clone, Default)]
pub struct LinkInterceptor {
    last_button: Option<PointerButton>,
}

impl LinkInterceptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last button pressed on this tab, if any. Persists until the next press.
    pub fn last_button(&self) -> Option<PointerButton> {
        self.last_button
    }
}

impl NavigationGate for LinkInterceptor {
    fn pointer_pressed(&mut self, button: PointerButton) {
        self.last_button = Some(button);
    }

    fn check(&mut self, request: &NavigationRequest) -> NavigationVerdict {
        if request.kind == NavigationKind::LinkClicked
            && self.last_button == Some(PointerButton::Middle)
        {
            debug!(url = %request.url, "Middle-click on link, opening in new tab");
            return NavigationVerdict::OpenInNewTab(request.url.clone());
        }
        NavigationVerdict::Proceed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(url: &str) -> NavigationRequest {
        NavigationRequest::new(1, url, NavigationKind::LinkClicked)
    }

    #[test]
    fn test_no_press_proceeds() {
        let mut gate = LinkInterceptor::new();
        assert_eq!(gate.check(&link("https://a.org")), NavigationVerdict::Proceed);
    }

    #[test]
    fn test_middle_click_on_link_opens_new_tab() {
        let mut gate = LinkInterceptor::new();
        gate.pointer_pressed(PointerButton::Middle);
        assert_eq!(
            gate.check(&link("https://a.org/page")),
            NavigationVerdict::OpenInNewTab("https://a.org/page".to_string())
        );
    }

    #[test]
    fn test_other_buttons_proceed() {
        for button in [
            PointerButton::Left,
            PointerButton::Right,
            PointerButton::Back,
            PointerButton::Forward,
            PointerButton::Other(7),
        ] {
            let mut gate = LinkInterceptor::new();
            gate.pointer_pressed(button);
            assert_eq!(gate.check(&link("https://a.org")), NavigationVerdict::Proceed);
        }
    }

    #[test]
    fn test_non_link_navigations_never_vetoed() {
        let mut gate = LinkInterceptor::new();
        gate.pointer_pressed(PointerButton::Middle);
        for kind in [
            NavigationKind::Typed,
            NavigationKind::FormSubmitted,
            NavigationKind::BackForward,
            NavigationKind::Reload,
            NavigationKind::Redirect,
            NavigationKind::Other,
        ] {
            let request = NavigationRequest::new(2, "https://b.org", kind);
            assert_eq!(gate.check(&request), NavigationVerdict::Proceed);
        }
    }

    #[test]
    fn test_last_button_persists_until_next_press() {
        let mut gate = LinkInterceptor::new();
        gate.pointer_pressed(PointerButton::Middle);
        let _ = gate.check(&link("https://a.org"));
        // No implicit reset after a navigation.
        assert_eq!(gate.last_button(), Some(PointerButton::Middle));
        assert!(matches!(
            gate.check(&link("https://b.org")),
            NavigationVerdict::OpenInNewTab(_)
        ));

        gate.pointer_pressed(PointerButton::Left);
        assert_eq!(gate.check(&link("https://c.org")), NavigationVerdict::Proceed);
    }

    #[test]
    fn test_winit_button_conversion() {
        assert_eq!(PointerButton::from(WinitMouseButton::Middle), PointerButton::Middle);
        assert_eq!(PointerButton::from(WinitMouseButton::Left), PointerButton::Left);
        assert_eq!(PointerButton::from(WinitMouseButton::Other(9)), PointerButton::Other(9));
    }
}
