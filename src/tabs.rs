//! Tab lifecycle and chrome synchronization.
//!
//! [`TabManager`] owns the ordered tab strip. Each [`Tab`] owns its
//! rendering engine and its navigation gate. The manager turns UI requests
//! (new tab, focus, close, address-bar submit) into engine commands, and
//! engine callbacks (URL changed, load finished, navigation requested) into
//! [`ChromeEvent`]s that the host applies to the window: title, address bar,
//! tab labels, theme, close.
//!
//! Per-tab load state:
//!
//! ```text
//! Created ──load──▶ Loading ──ok──▶ Loaded
//!                      │  ▲            │
//!                      │  └──next load─┘
//!                      └──fail─▶ Failed
//! ```
//!
//! The strip is never empty while the window is open: closing the last tab
//! closes the window instead.

use std::fmt;

use tracing::{debug, info, warn};
use url::Url;

use crate::engine::{EngineEvent, RenderingEngine};
use crate::interceptor::{
    LinkInterceptor, NavigationGate, NavigationRequest, NavigationVerdict, PointerButton,
};
use crate::preferences::{SettingsStore, Theme};
use crate::settings;
use crate::urlbar::UrlBar;

/// Label shown until the engine reports a real page title.
pub const DEFAULT_TAB_TITLE: &str = "New Tab";

/// Upper bound on engine pump rounds per [`TabManager::spin`] call.
const MAX_SPIN_ROUNDS: usize = 32;

// ─────────────────────────────────────────────────────────────────────────────
// Types
// ─────────────────────────────────────────────────────────────────────────────

/// Stable tab handle. Never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TabId(u64);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tab-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Created,
    Loading,
    Loaded,
    Failed,
}

/// What a "new tab" UI action asks for.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NewTabRequest {
    /// Home page, default label.
    #[default]
    Blank,
    /// A specific address, with an optional initial label.
    Open { url: String, title: Option<String> },
}

impl NewTabRequest {
    pub fn url(url: impl Into<String>) -> Self {
        Self::Open {
            url: url.into(),
            title: None,
        }
    }

    pub fn titled(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self::Open {
            url: url.into(),
            title: Some(title.into()),
        }
    }
}

/// Where a tab-strip click landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabStripHit {
    Tab(usize),
    /// Empty area after the last tab.
    Empty,
}

impl TabStripHit {
    /// Toolkit convention: a negative index means no tab under the pointer.
    pub fn from_index(index: i32) -> Self {
        usize::try_from(index).map_or(Self::Empty, Self::Tab)
    }
}

/// Result of [`TabManager::close_tab`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    Closed(TabId),
    /// It was the last tab: the window closes and the tab stays.
    WindowClosed,
    /// Bad index, or the window is already closed.
    Ignored,
}

/// Change the host must reflect in the window chrome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChromeEvent {
    WindowTitleChanged(String),
    AddressBarChanged(String),
    TabOpened { tab: TabId, index: usize },
    TabClosed { tab: TabId },
    TabLabelChanged { tab: TabId, label: String },
    TabMoved { tab: TabId, from: usize, to: usize },
    FocusChanged { tab: TabId, index: usize },
    /// Settings were applied; restyle the chrome.
    ThemeChanged(Theme),
    CloseWindow,
}

/// One browsing context: an engine instance plus what the chrome shows.
pub struct Tab<E> {
    id: TabId,
    url: String,
    title: String,
    state: LoadState,
    engine: E,
    gate: Box<dyn NavigationGate>,
}

impl<E> Tab<E> {
    pub fn id(&self) -> TabId {
        self.id
    }

    /// Current address, mirrors what the engine reports.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Label in the tab strip.
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn load_state(&self) -> LoadState {
        self.state
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }
}

impl<E> fmt::Debug for Tab<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tab")
            .field("id", &self.id)
            .field("url", &self.url)
            .field("title", &self.title)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// TabManager
// ─────────────────────────────────────────────────────────────────────────────

/// Ordered tab strip of one browser window.
pub struct TabManager<E> {
    tabs: Vec<Tab<E>>,
    focused: Option<usize>,
    next_id: u64,
    new_engine: Box<dyn FnMut() -> E>,
    settings: SettingsStore,
    home_url: String,
    host_title: String,
    address_bar: UrlBar,
    window_title: String,
    window_open: bool,
    /// Tab currently showing the settings dialog.
    settings_tab: Option<TabId>,
    events: Vec<ChromeEvent>,
}

impl<E: RenderingEngine> TabManager<E> {
    /// Creates an empty strip. `new_engine` builds the engine of every tab.
    pub fn new(
        settings: SettingsStore,
        home_url: impl Into<String>,
        host_title: impl Into<String>,
        new_engine: impl FnMut() -> E + 'static,
    ) -> Self {
        let host_title = host_title.into();
        Self {
            tabs: Vec::new(),
            focused: None,
            next_id: 1,
            new_engine: Box::new(new_engine),
            settings,
            home_url: home_url.into(),
            window_title: host_title.clone(),
            host_title,
            address_bar: UrlBar::new(),
            window_open: true,
            settings_tab: None,
            events: Vec::new(),
        }
    }

    // ── Tab lifecycle ──────────────────────────────────────────────────

    /// Opens a tab, starts loading it and focuses it.
    ///
    /// A missing or malformed URL opens the home page labelled
    /// [`DEFAULT_TAB_TITLE`]. Returns `None` once the window is closed.
    pub fn new_tab(&mut self, request: NewTabRequest) -> Option<TabId> {
        if !self.window_open {
            return None;
        }

        let (url, title) = match request {
            NewTabRequest::Open { url, title } if Url::parse(&url).is_ok() => {
                (url, title.unwrap_or_else(|| DEFAULT_TAB_TITLE.to_string()))
            }
            NewTabRequest::Open { url, .. } => {
                debug!(url = %url, "Not a URL, opening home page");
                (self.home_url.clone(), DEFAULT_TAB_TITLE.to_string())
            }
            NewTabRequest::Blank => (self.home_url.clone(), DEFAULT_TAB_TITLE.to_string()),
        };

        let id = TabId(self.next_id);
        self.next_id += 1;

        let mut tab = Tab {
            id,
            url: url.clone(),
            title: title.clone(),
            state: LoadState::Created,
            engine: (self.new_engine)(),
            gate: Box::new(LinkInterceptor::new()),
        };
        tab.engine.load_url(&url);
        tab.state = LoadState::Loading;

        self.tabs.push(tab);
        let index = self.tabs.len() - 1;
        info!(tab = %id, index, url = %url, "Tab opened");

        self.events.push(ChromeEvent::TabOpened { tab: id, index });
        self.events.push(ChromeEvent::TabLabelChanged { tab: id, label: title });
        self.focus_tab(index);
        Some(id)
    }

    /// Focuses the tab at `index` and refreshes the window title and
    /// address bar from it.
    pub fn focus_tab(&mut self, index: usize) -> bool {
        if !self.window_open || index >= self.tabs.len() {
            return false;
        }
        self.focused = Some(index);
        let id = self.tabs[index].id;
        debug!(tab = %id, index, "Tab focused");

        self.events.push(ChromeEvent::FocusChanged { tab: id, index });
        self.refresh_window_title();
        let url = self.tabs[index].url.clone();
        self.address_bar.reset_to(&url);
        self.events.push(ChromeEvent::AddressBarChanged(url));
        true
    }

    /// Closes the tab at `index`, or the window if it is the last one.
    ///
    /// Closing the focused tab moves focus to the tab that takes its place,
    /// or to the new last tab.
    pub fn close_tab(&mut self, index: usize) -> CloseOutcome {
        if !self.window_open || index >= self.tabs.len() {
            return CloseOutcome::Ignored;
        }

        if self.tabs.len() == 1 {
            info!("Last tab closed, closing window");
            self.window_open = false;
            self.events.push(ChromeEvent::CloseWindow);
            return CloseOutcome::WindowClosed;
        }

        let tab = self.tabs.remove(index);
        info!(tab = %tab.id, index, "Tab closed");
        if self.settings_tab == Some(tab.id) {
            self.settings_tab = None;
        }
        self.events.push(ChromeEvent::TabClosed { tab: tab.id });

        match self.focused {
            Some(focused) if focused == index => {
                self.focus_tab(index.min(self.tabs.len() - 1));
            }
            Some(focused) if focused > index => self.focused = Some(focused - 1),
            _ => {}
        }
        CloseOutcome::Closed(tab.id)
    }

    /// Double-click on the tab strip: empty area opens a blank tab.
    pub fn on_tab_double_clicked(&mut self, hit: TabStripHit) -> Option<TabId> {
        match hit {
            TabStripHit::Empty => self.new_tab(NewTabRequest::Blank),
            TabStripHit::Tab(_) => None,
        }
    }

    /// Drags a tab to another position. Focus follows the focused tab.
    pub fn move_tab(&mut self, from: usize, to: usize) -> bool {
        if from >= self.tabs.len() || to >= self.tabs.len() || from == to {
            return false;
        }
        let focused_id = self.focused_tab().map(Tab::id);
        let tab = self.tabs.remove(from);
        let id = tab.id;
        self.tabs.insert(to, tab);
        self.focused = focused_id.and_then(|id| self.index_of(id));
        self.events.push(ChromeEvent::TabMoved { tab: id, from, to });
        true
    }

    /// Opens the settings dialog in a new tab.
    pub fn open_settings(&mut self) -> Option<TabId> {
        let url = settings::dialog_url(self.settings.get());
        let id = self.new_tab(NewTabRequest::titled(url, settings::DIALOG_TITLE))?;
        self.settings_tab = Some(id);
        Some(id)
    }

    /// Tab showing the settings dialog, if one is open.
    pub fn settings_tab(&self) -> Option<TabId> {
        self.settings_tab
    }

    // ── Navigation controls (focused tab) ──────────────────────────────

    /// Address bar Enter / "Go": resolves the text and loads it in the
    /// focused tab. Returns the URL being loaded.
    pub fn submit_address_bar(&mut self) -> Option<String> {
        let engine = self.settings.search_engine();
        let url = self.address_bar.submit(engine)?;
        self.load_in_focused(&url);
        Some(url)
    }

    /// Loads `url` in the focused tab without going through the resolver.
    pub fn load_in_focused(&mut self, url: &str) -> bool {
        let Some(tab) = self.focused_tab_mut() else {
            return false;
        };
        debug!(tab = %tab.id, url, "Loading");
        tab.engine.load_url(url);
        tab.state = LoadState::Loading;
        true
    }

    pub fn go_back(&mut self) {
        if let Some(tab) = self.focused_tab_mut() {
            tab.engine.go_back();
        }
    }

    pub fn go_forward(&mut self) {
        if let Some(tab) = self.focused_tab_mut() {
            tab.engine.go_forward();
        }
    }

    pub fn reload(&mut self) {
        if let Some(tab) = self.focused_tab_mut() {
            tab.engine.reload();
        }
    }

    /// Raw pointer press on the content of the tab at `index`.
    pub fn pointer_pressed(&mut self, index: usize, button: PointerButton) {
        if let Some(tab) = self.tabs.get_mut(index) {
            tab.gate.pointer_pressed(button);
        }
    }

    // ── Engine callbacks ───────────────────────────────────────────────

    /// Pumps every tab's engine until no callback is left (bounded).
    /// Returns the number of events handled.
    pub fn spin(&mut self) -> usize {
        let mut handled = 0;
        for _ in 0..MAX_SPIN_ROUNDS {
            let round = self.spin_once();
            if round == 0 {
                break;
            }
            handled += round;
        }
        handled
    }

    fn spin_once(&mut self) -> usize {
        let ids: Vec<TabId> = self.tabs.iter().map(|t| t.id).collect();
        let mut handled = 0;
        for id in ids {
            let Some(index) = self.index_of(id) else {
                continue;
            };
            for event in self.tabs[index].engine.spin() {
                self.handle_engine_event(id, event);
                handled += 1;
            }
        }
        handled
    }

    /// Applies one engine callback to the tab it belongs to.
    pub fn handle_engine_event(&mut self, id: TabId, event: EngineEvent) {
        let Some(index) = self.index_of(id) else {
            debug!(tab = %id, ?event, "Event for closed tab dropped");
            return;
        };
        let is_focused = self.focused == Some(index);

        match event {
            EngineEvent::LoadStarted => self.tabs[index].state = LoadState::Loading,
            EngineEvent::UrlChanged(url) => {
                self.tabs[index].url = url.clone();
                if is_focused {
                    self.address_bar.set_url(&url);
                    self.events.push(ChromeEvent::AddressBarChanged(url));
                }
            }
            EngineEvent::LoadFinished { success: true } => {
                let tab = &mut self.tabs[index];
                tab.state = LoadState::Loaded;
                let page_title = tab.engine.title();
                tab.title = if page_title.is_empty() {
                    DEFAULT_TAB_TITLE.to_string()
                } else {
                    page_title
                };
                debug!(tab = %id, title = %tab.title, "Load finished");
                self.events.push(ChromeEvent::TabLabelChanged {
                    tab: id,
                    label: tab.title.clone(),
                });
                if is_focused {
                    self.refresh_window_title();
                }
            }
            EngineEvent::LoadFinished { success: false } => {
                warn!(tab = %id, url = %self.tabs[index].url, "Load failed");
                self.tabs[index].state = LoadState::Failed;
            }
            EngineEvent::NavigationRequested(request) => {
                self.handle_navigation_request(index, request);
            }
            EngineEvent::PointerPressed(button) => {
                self.tabs[index].gate.pointer_pressed(button);
            }
        }
    }

    fn handle_navigation_request(&mut self, index: usize, request: NavigationRequest) {
        if settings::is_settings_apply_url(&request.url) {
            self.tabs[index].engine.decide_navigation(request.id, false);
            if self.is_showing_dialog(index) {
                self.apply_settings(index, &request.url);
            } else {
                warn!(
                    tab = %self.tabs[index].id,
                    url = %request.url,
                    "Settings submission outside the dialog ignored"
                );
            }
            return;
        }

        let tab = &mut self.tabs[index];
        match tab.gate.check(&request) {
            NavigationVerdict::Proceed => tab.engine.decide_navigation(request.id, true),
            NavigationVerdict::OpenInNewTab(url) => {
                tab.engine.decide_navigation(request.id, false);
                info!(from = %tab.id, url = %url, "Link opened in new tab");
                self.new_tab(NewTabRequest::url(url));
            }
        }
    }

    fn is_showing_dialog(&self, index: usize) -> bool {
        let tab = &self.tabs[index];
        self.settings_tab == Some(tab.id) && tab.url.starts_with("data:")
    }

    /// Applies a dialog submission, then dismisses the dialog tab. The last
    /// tab is sent back home instead of closing the window.
    fn apply_settings(&mut self, index: usize, url: &str) {
        let Some(submitted) = settings::parse_apply_url(url, self.settings.get()) else {
            warn!(url, "Malformed settings submission");
            return;
        };
        let theme = settings::apply(&self.settings, submitted);
        self.events.push(ChromeEvent::ThemeChanged(theme));

        if self.tabs.len() > 1 {
            self.close_tab(index);
            return;
        }
        self.settings_tab = None;
        let home = self.home_url.clone();
        let tab = &mut self.tabs[index];
        tab.engine.load_url(&home);
        tab.state = LoadState::Loading;
        tab.title = DEFAULT_TAB_TITLE.to_string();
        self.events.push(ChromeEvent::TabLabelChanged {
            tab: tab.id,
            label: tab.title.clone(),
        });
    }

    fn refresh_window_title(&mut self) {
        let page_title = self
            .focused_tab()
            .map(|tab| tab.engine.title())
            .unwrap_or_default();
        self.window_title = format!("{} - {}", self.host_title, page_title);
        self.events
            .push(ChromeEvent::WindowTitleChanged(self.window_title.clone()));
    }

    // ── Accessors ──────────────────────────────────────────────────────

    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    pub fn tabs(&self) -> impl Iterator<Item = &Tab<E>> {
        self.tabs.iter()
    }

    pub fn tab(&self, index: usize) -> Option<&Tab<E>> {
        self.tabs.get(index)
    }

    pub fn tab_mut(&mut self, index: usize) -> Option<&mut Tab<E>> {
        self.tabs.get_mut(index)
    }

    pub fn index_of(&self, id: TabId) -> Option<usize> {
        self.tabs.iter().position(|t| t.id == id)
    }

    pub fn focused_index(&self) -> Option<usize> {
        self.focused
    }

    pub fn focused_tab(&self) -> Option<&Tab<E>> {
        self.focused.and_then(|i| self.tabs.get(i))
    }

    pub fn focused_tab_mut(&mut self) -> Option<&mut Tab<E>> {
        self.focused.and_then(|i| self.tabs.get_mut(i))
    }

    pub fn window_title(&self) -> &str {
        &self.window_title
    }

    pub fn address_bar(&self) -> &UrlBar {
        &self.address_bar
    }

    pub fn address_bar_mut(&mut self) -> &mut UrlBar {
        &mut self.address_bar
    }

    pub fn is_window_open(&self) -> bool {
        self.window_open
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn home_url(&self) -> &str {
        &self.home_url
    }

    /// Takes the chrome changes queued since the last call.
    pub fn drain_events(&mut self) -> Vec<ChromeEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::HeadlessEngine;
    use crate::interceptor::NavigationKind;
    use crate::preferences::{SearchEngine, Settings};

    const HOME: &str = "https://google.com/";

    fn manager() -> TabManager<HeadlessEngine> {
        TabManager::new(SettingsStore::default(), HOME, "TabBrows", HeadlessEngine::new)
    }

    fn urls(m: &TabManager<HeadlessEngine>) -> Vec<String> {
        m.tabs().map(|t| t.url().to_string()).collect()
    }

    #[test]
    fn test_new_tab_defaults() {
        let mut m = manager();
        let id = m.new_tab(NewTabRequest::Blank).unwrap();
        let tab = m.focused_tab().unwrap();
        assert_eq!(tab.id(), id);
        assert_eq!(tab.url(), HOME);
        assert_eq!(tab.title(), DEFAULT_TAB_TITLE);
        assert_eq!(tab.load_state(), LoadState::Loading);
        assert_eq!(m.address_bar().text(), HOME);
    }

    #[test]
    fn test_new_tab_keeps_given_label_until_load() {
        let mut m = manager();
        m.new_tab(NewTabRequest::titled("https://github.com/", "My projects"));
        assert_eq!(m.focused_tab().unwrap().title(), "My projects");

        m.spin();
        let tab = m.focused_tab().unwrap();
        assert_eq!(tab.title(), "github.com");
        assert_eq!(tab.load_state(), LoadState::Loaded);
    }

    #[test]
    fn test_malformed_url_request_opens_home() {
        let mut m = manager();
        m.new_tab(NewTabRequest::titled("not a url", "Ignored"));
        let tab = m.focused_tab().unwrap();
        assert_eq!(tab.url(), HOME);
        assert_eq!(tab.title(), DEFAULT_TAB_TITLE);
    }

    #[test]
    fn test_non_url_payloads_open_home() {
        let mut m = manager();
        for payload in ["false", "3", "hello", ""] {
            m.new_tab(NewTabRequest::url(payload));
            let tab = m.focused_tab().unwrap();
            assert_eq!(tab.url(), HOME);
            assert_eq!(tab.title(), DEFAULT_TAB_TITLE);
        }
    }

    #[test]
    fn test_tab_ids_not_reused() {
        let mut m = manager();
        let a = m.new_tab(NewTabRequest::Blank).unwrap();
        let b = m.new_tab(NewTabRequest::Blank).unwrap();
        m.close_tab(1);
        let c = m.new_tab(NewTabRequest::Blank).unwrap();
        assert_ne!(b, c);
        assert_ne!(a, c);
    }

    #[test]
    fn test_focus_refreshes_chrome() {
        let mut m = manager();
        m.new_tab(NewTabRequest::url("https://a.org/"));
        m.new_tab(NewTabRequest::url("https://b.org/"));
        m.spin();
        m.drain_events();

        assert!(m.focus_tab(0));
        assert_eq!(m.window_title(), "TabBrows - a.org");
        assert_eq!(m.address_bar().text(), "https://a.org/");
        assert_eq!(m.address_bar().cursor_position(), 0);

        let events = m.drain_events();
        assert!(events.contains(&ChromeEvent::WindowTitleChanged(
            "TabBrows - a.org".to_string()
        )));
        assert!(events.contains(&ChromeEvent::AddressBarChanged("https://a.org/".to_string())));

        assert!(!m.focus_tab(5));
    }

    #[test]
    fn test_close_keeps_relative_order() {
        let mut m = manager();
        for url in ["https://a.org/", "https://b.org/", "https://c.org/", "https://d.org/"] {
            m.new_tab(NewTabRequest::url(url));
        }
        assert!(matches!(m.close_tab(1), CloseOutcome::Closed(_)));
        assert_eq!(m.tab_count(), 3);
        assert_eq!(urls(&m), ["https://a.org/", "https://c.org/", "https://d.org/"]);
    }

    #[test]
    fn test_close_focused_moves_to_right_neighbour() {
        let mut m = manager();
        for url in ["https://a.org/", "https://b.org/", "https://c.org/"] {
            m.new_tab(NewTabRequest::url(url));
        }
        m.focus_tab(1);
        m.close_tab(1);
        assert_eq!(m.focused_tab().unwrap().url(), "https://c.org/");

        // Last position: falls back to the left.
        m.close_tab(1);
        assert_eq!(m.focused_tab().unwrap().url(), "https://a.org/");
    }

    #[test]
    fn test_close_before_focused_keeps_focus() {
        let mut m = manager();
        for url in ["https://a.org/", "https://b.org/", "https://c.org/"] {
            m.new_tab(NewTabRequest::url(url));
        }
        m.close_tab(0);
        assert_eq!(m.focused_index(), Some(1));
        assert_eq!(m.focused_tab().unwrap().url(), "https://c.org/");
    }

    #[test]
    fn test_close_last_tab_closes_window() {
        let mut m = manager();
        m.new_tab(NewTabRequest::Blank);
        assert_eq!(m.close_tab(0), CloseOutcome::WindowClosed);
        assert!(!m.is_window_open());
        assert_eq!(m.tab_count(), 1);
        assert!(m.drain_events().contains(&ChromeEvent::CloseWindow));

        // Nothing happens once the window is gone.
        assert_eq!(m.close_tab(0), CloseOutcome::Ignored);
        assert!(m.new_tab(NewTabRequest::Blank).is_none());
    }

    #[test]
    fn test_close_bad_index_ignored() {
        let mut m = manager();
        m.new_tab(NewTabRequest::Blank);
        m.new_tab(NewTabRequest::Blank);
        assert_eq!(m.close_tab(2), CloseOutcome::Ignored);
        assert_eq!(m.tab_count(), 2);
    }

    #[test]
    fn test_double_click() {
        let mut m = manager();
        m.new_tab(NewTabRequest::Blank);
        assert!(m.on_tab_double_clicked(TabStripHit::Tab(0)).is_none());
        assert_eq!(m.tab_count(), 1);
        assert!(m.on_tab_double_clicked(TabStripHit::from_index(-1)).is_some());
        assert_eq!(m.tab_count(), 2);
        assert_eq!(TabStripHit::from_index(2), TabStripHit::Tab(2));
    }

    #[test]
    fn test_failed_load_keeps_title_and_url() {
        let mut m = manager();
        m.new_tab(NewTabRequest::url("https://a.org/"));
        m.spin();

        m.address_bar_mut().focus();
        m.address_bar_mut().insert_str("https://bad host/");
        assert_eq!(m.submit_address_bar().as_deref(), Some("https://bad host/"));
        m.spin();

        let tab = m.focused_tab().unwrap();
        assert_eq!(tab.load_state(), LoadState::Failed);
        assert_eq!(tab.title(), "a.org");
        assert_eq!(tab.url(), "https://a.org/");
    }

    #[test]
    fn test_last_load_decides_state() {
        let mut m = manager();
        m.new_tab(NewTabRequest::url("https://a.org/"));
        m.load_in_focused("https://bad host/");
        m.spin();
        assert_eq!(m.focused_tab().unwrap().load_state(), LoadState::Failed);
    }

    #[test]
    fn test_empty_page_title_falls_back() {
        let mut m = manager();
        m.new_tab(NewTabRequest::url("file:///tmp/index.html"));
        m.spin();
        assert_eq!(m.focused_tab().unwrap().title(), DEFAULT_TAB_TITLE);
    }

    #[test]
    fn test_title_update_scoped_to_event_tab() {
        let mut m = manager();
        m.new_tab(NewTabRequest::url("https://a.org/"));
        m.new_tab(NewTabRequest::url("https://b.org/"));
        m.spin();
        m.drain_events();

        // Background tab finishes a load: its label changes, the chrome does not.
        m.tab_mut(0).unwrap().engine_mut().load_url("https://c.org/");
        m.spin();
        assert_eq!(m.tab(0).unwrap().title(), "c.org");
        assert_eq!(m.tab(0).unwrap().url(), "https://c.org/");
        assert_eq!(m.address_bar().text(), "https://b.org/");
        assert_eq!(m.window_title(), "TabBrows - b.org");
    }

    #[test]
    fn test_submit_uses_current_search_engine() {
        let mut m = manager();
        m.new_tab(NewTabRequest::Blank);
        m.settings().apply(Settings {
            theme: Theme::Light,
            search_engine: SearchEngine::DuckDuckGo,
        });
        m.address_bar_mut().focus();
        m.address_bar_mut().insert_str("rust lang");
        assert_eq!(
            m.submit_address_bar().as_deref(),
            Some("https://duckduckgo.com/?q=rust+lang")
        );
        m.spin();
        assert_eq!(m.address_bar().text(), "https://duckduckgo.com/?q=rust+lang");
    }

    #[test]
    fn test_middle_click_opens_new_tab() {
        let mut m = manager();
        m.new_tab(NewTabRequest::url("https://a.org/"));
        m.spin();

        let engine = m.tab_mut(0).unwrap().engine_mut();
        engine.press_pointer(PointerButton::Middle);
        engine.activate_link("https://a.org/next");
        m.spin();

        assert_eq!(m.tab_count(), 2);
        assert_eq!(m.tab(0).unwrap().url(), "https://a.org/");
        assert_eq!(m.tab(1).unwrap().url(), "https://a.org/next");
        assert_eq!(m.focused_index(), Some(1));
        assert_eq!(m.tab(0).unwrap().engine().pending_navigations(), 0);
    }

    #[test]
    fn test_left_click_navigates_in_place() {
        let mut m = manager();
        m.new_tab(NewTabRequest::url("https://a.org/"));
        m.spin();

        m.pointer_pressed(0, PointerButton::Left);
        m.tab_mut(0).unwrap().engine_mut().activate_link("https://a.org/next");
        m.spin();

        assert_eq!(m.tab_count(), 1);
        assert_eq!(m.tab(0).unwrap().url(), "https://a.org/next");
    }

    #[test]
    fn test_move_tab_keeps_focus() {
        let mut m = manager();
        for url in ["https://a.org/", "https://b.org/", "https://c.org/"] {
            m.new_tab(NewTabRequest::url(url));
        }
        m.focus_tab(0);
        assert!(m.move_tab(0, 2));
        assert_eq!(urls(&m), ["https://b.org/", "https://c.org/", "https://a.org/"]);
        assert_eq!(m.focused_index(), Some(2));
        assert!(!m.move_tab(0, 3));
        assert!(!m.move_tab(1, 1));
    }

    #[test]
    fn test_settings_dialog_apply() {
        let mut m = manager();
        m.new_tab(NewTabRequest::Blank);
        m.open_settings();
        m.spin();
        assert_eq!(m.tab_count(), 2);
        assert_eq!(m.focused_tab().unwrap().title(), settings::DIALOG_TITLE);
        m.drain_events();

        m.tab_mut(1).unwrap().engine_mut().request_navigation(
            "http://tabbrows.settings/apply?theme=dark&search_engine=Bing",
            NavigationKind::Other,
        );
        m.spin();

        assert_eq!(m.settings().theme(), Theme::Dark);
        assert_eq!(m.settings().search_engine(), SearchEngine::Bing);
        assert_eq!(m.tab_count(), 1);
        assert!(m.drain_events().contains(&ChromeEvent::ThemeChanged(Theme::Dark)));
    }

    const APPLY_DARK_YAHOO: &str =
        "http://tabbrows.settings/apply?theme=dark&search_engine=Yahoo";

    #[test]
    fn test_apply_url_from_ordinary_tab_is_vetoed() {
        let mut m = manager();
        m.new_tab(NewTabRequest::url("https://a.org/"));
        m.new_tab(NewTabRequest::url("https://evil.example/"));
        m.spin();
        m.drain_events();

        let engine = m.tab_mut(1).unwrap().engine_mut();
        engine.request_navigation(APPLY_DARK_YAHOO, NavigationKind::Redirect);
        engine.activate_link(APPLY_DARK_YAHOO);
        m.spin();

        assert_eq!(m.settings().get(), Settings::default());
        assert_eq!(m.tab_count(), 2);
        assert_eq!(m.tab(1).unwrap().url(), "https://evil.example/");
        assert_eq!(m.tab(1).unwrap().engine().pending_navigations(), 0);
        assert!(
            !m.drain_events()
                .iter()
                .any(|e| matches!(e, ChromeEvent::ThemeChanged(_)))
        );
    }

    #[test]
    fn test_dialog_tab_that_left_the_dialog_cannot_apply() {
        let mut m = manager();
        m.new_tab(NewTabRequest::Blank);
        m.open_settings();
        m.spin();

        m.load_in_focused("https://evil.example/");
        m.spin();
        m.tab_mut(1)
            .unwrap()
            .engine_mut()
            .request_navigation(APPLY_DARK_YAHOO, NavigationKind::Other);
        m.spin();

        assert_eq!(m.settings().search_engine(), SearchEngine::Google);
        assert_eq!(m.tab_count(), 2);
    }

    #[test]
    fn test_apply_from_last_tab_keeps_window_open() {
        let mut m = manager();
        m.new_tab(NewTabRequest::url("https://a.org/"));
        let dialog = m.open_settings().unwrap();
        m.spin();
        m.close_tab(0);
        assert_eq!(m.focused_tab().unwrap().id(), dialog);

        m.tab_mut(0)
            .unwrap()
            .engine_mut()
            .request_navigation(APPLY_DARK_YAHOO, NavigationKind::Other);
        m.spin();

        assert_eq!(m.settings().search_engine(), SearchEngine::Yahoo);
        assert!(m.is_window_open());
        assert_eq!(m.tab_count(), 1);
        assert_eq!(m.settings_tab(), None);
        let tab = m.focused_tab().unwrap();
        assert_eq!(tab.url(), HOME);
        assert_eq!(tab.load_state(), LoadState::Loaded);
        assert!(!m.drain_events().contains(&ChromeEvent::CloseWindow));
    }

    #[test]
    fn test_history_controls_act_on_focused_tab() {
        let mut m = manager();
        m.new_tab(NewTabRequest::url("https://a.org/"));
        m.spin();
        m.load_in_focused("https://b.org/");
        m.spin();

        m.go_back();
        m.spin();
        assert_eq!(m.focused_tab().unwrap().url(), "https://a.org/");
        m.go_forward();
        m.spin();
        assert_eq!(m.focused_tab().unwrap().url(), "https://b.org/");
        m.reload();
        m.spin();
        assert_eq!(m.focused_tab().unwrap().load_state(), LoadState::Loaded);
    }
}
