//! Rendering-engine boundary.
//!
//! The tab manager never fetches or paints anything itself. It drives one
//! [`RenderingEngine`] per tab through a small capability set (load, back,
//! forward, reload, title/URL queries, navigation verdicts) and receives the
//! engine's callbacks as [`EngineEvent`]s, pulled with [`RenderingEngine::spin`]
//! from the UI thread, the same way a Servo embedder spins its event loop
//! after a wake-up.
//!
//! [`HeadlessEngine`] is an in-process implementation with its own history
//! stack. It "loads" any URL that parses and fails the rest, which is enough
//! for the shell binary and for tests.

use std::collections::VecDeque;

use tracing::{debug, warn};
use url::Url;

use crate::interceptor::{NavigationKind, NavigationRequest, PointerButton};

/// Environment variable read by the engine at initialization.
pub const ENGINE_FLAGS_VAR: &str = "TABBROWS_ENGINE_FLAGS";

/// Flag enabling proprietary media codecs in the engine.
pub const PROPRIETARY_CODECS_FLAG: &str = "--enable-proprietary-media-audios";

/// Callback raised by an engine instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A main-frame load began.
    LoadStarted,
    /// The committed URL changed (navigation, redirect, history move).
    UrlChanged(String),
    /// The current load completed.
    LoadFinished { success: bool },
    /// The engine wants to navigate and waits for
    /// [`RenderingEngine::decide_navigation`] before doing anything.
    NavigationRequested(NavigationRequest),
    /// Raw pointer press on the content area.
    PointerPressed(PointerButton),
}

/// Capabilities the browser core consumes from a rendering engine.
pub trait RenderingEngine {
    /// Programmatic load. Never goes through the navigation gate.
    fn load_url(&mut self, url: &str);

    fn go_back(&mut self);

    fn go_forward(&mut self);

    fn reload(&mut self);

    /// Currently committed URL, empty before the first commit.
    fn url(&self) -> String;

    /// Page title as reported by the document, possibly empty.
    fn title(&self) -> String;

    /// Answers a pending [`EngineEvent::NavigationRequested`].
    fn decide_navigation(&mut self, request_id: u64, allow: bool);

    /// Drains the callbacks raised since the last call.
    fn spin(&mut self) -> Vec<EngineEvent>;
}

/// Builds the engine flags value with the codec flag added once.
pub fn engine_flags_with_codecs(existing: Option<&str>) -> String {
    match existing.map(str::trim) {
        Some(flags) if flags.split_whitespace().any(|f| f == PROPRIETARY_CODECS_FLAG) => {
            flags.to_string()
        }
        Some(flags) if !flags.is_empty() => format!("{flags} {PROPRIETARY_CODECS_FLAG}"),
        _ => PROPRIETARY_CODECS_FLAG.to_string(),
    }
}

/// Exports the proprietary-codec flag for engines created afterwards.
///
/// # Safety
///
/// Mutates the process environment. Must run before any other thread
/// exists, i.e. at the top of `main` before the event loop is built.
pub unsafe fn enable_proprietary_codecs() {
    let flags = engine_flags_with_codecs(std::env::var(ENGINE_FLAGS_VAR).ok().as_deref());
    debug!(flags = %flags, "Engine flags");
    // SAFETY: single-threaded at this point, see the function contract.
    unsafe { std::env::set_var(ENGINE_FLAGS_VAR, flags) };
}

// ─────────────────────────────────────────────────────────────────────────────
// HeadlessEngine
// ─────────────────────────────────────────────────────────────────────────────

/// Engine without a renderer: keeps a history stack and reports loads.
///
/// Commands are queued and executed on the next [`RenderingEngine::spin`],
/// so callers observe the same "request now, callback later" ordering as
/// with a real engine.
///
/// A URL "loads" when it parses. Its page title is the `<title>` of a
/// `data:` document, otherwise the host name (empty for host-less URLs such
/// as `file:///`). Anything unparsable fails the load and leaves the
/// committed URL untouched.
#[derive(Debug, Default)]
pub struct HeadlessEngine {
    history: Vec<String>,
    position: Option<usize>,
    title: String,
    commands: VecDeque<Command>,
    outbox: VecDeque<EngineEvent>,
    pending: Vec<NavigationRequest>,
    next_request_id: u64,
}

#[derive(Debug, Clone)]
enum Command {
    Load(String),
    Back,
    Forward,
    Reload,
}

impl HeadlessEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates the user pressing a pointer button on the page.
    pub fn press_pointer(&mut self, button: PointerButton) {
        self.outbox.push_back(EngineEvent::PointerPressed(button));
    }

    /// Simulates the page asking to navigate. Returns the request id.
    pub fn request_navigation(&mut self, url: &str, kind: NavigationKind) -> u64 {
        self.next_request_id += 1;
        let request = NavigationRequest::new(self.next_request_id, url, kind);
        self.pending.push(request.clone());
        self.outbox.push_back(EngineEvent::NavigationRequested(request));
        self.next_request_id
    }

    /// Hyperlink activation, shorthand for [`Self::request_navigation`].
    pub fn activate_link(&mut self, url: &str) -> u64 {
        self.request_navigation(url, NavigationKind::LinkClicked)
    }

    pub fn can_go_back(&self) -> bool {
        self.position.is_some_and(|p| p > 0)
    }

    pub fn can_go_forward(&self) -> bool {
        self.position.is_some_and(|p| p + 1 < self.history.len())
    }

    /// Navigations still waiting for a verdict.
    pub fn pending_navigations(&self) -> usize {
        self.pending.len()
    }

    fn execute(&mut self, command: Command) {
        match command {
            Command::Load(url) => self.navigate(&url),
            Command::Back => {
                if let Some(position) = self.position
                    && position > 0
                {
                    self.move_in_history(position - 1);
                }
            }
            Command::Forward => {
                if let Some(position) = self.position
                    && position + 1 < self.history.len()
                {
                    self.move_in_history(position + 1);
                }
            }
            Command::Reload => {
                if let Some(position) = self.position {
                    self.move_in_history(position);
                }
            }
        }
    }

    fn navigate(&mut self, url: &str) {
        self.outbox.push_back(EngineEvent::LoadStarted);
        let Ok(parsed) = Url::parse(url) else {
            warn!(url, "Load failed: malformed URL");
            self.outbox.push_back(EngineEvent::LoadFinished { success: false });
            return;
        };

        let next = self.position.map_or(0, |p| p + 1);
        self.history.truncate(next);
        self.history.push(parsed.to_string());
        self.position = Some(next);
        self.commit(&parsed);
    }

    fn move_in_history(&mut self, position: usize) {
        self.position = Some(position);
        self.outbox.push_back(EngineEvent::LoadStarted);
        // History only holds URLs that already parsed once.
        if let Ok(parsed) = Url::parse(&self.history[position]) {
            self.commit(&parsed);
        }
    }

    fn commit(&mut self, url: &Url) {
        self.title = page_title(url);
        let committed = self.current_url().to_string();
        self.outbox.push_back(EngineEvent::UrlChanged(committed));
        self.outbox.push_back(EngineEvent::LoadFinished { success: true });
    }

    fn current_url(&self) -> &str {
        self.position
            .and_then(|p| self.history.get(p))
            .map(String::as_str)
            .unwrap_or_default()
    }
}

impl RenderingEngine for HeadlessEngine {
    fn load_url(&mut self, url: &str) {
        self.commands.push_back(Command::Load(url.to_string()));
    }

    fn go_back(&mut self) {
        self.commands.push_back(Command::Back);
    }

    fn go_forward(&mut self) {
        self.commands.push_back(Command::Forward);
    }

    fn reload(&mut self) {
        self.commands.push_back(Command::Reload);
    }

    fn url(&self) -> String {
        self.current_url().to_string()
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn decide_navigation(&mut self, request_id: u64, allow: bool) {
        let Some(index) = self.pending.iter().position(|r| r.id == request_id) else {
            warn!(request_id, "Verdict for unknown navigation request");
            return;
        };
        let request = self.pending.remove(index);
        if allow {
            self.commands.push_back(Command::Load(request.url));
        } else {
            debug!(url = %request.url, "Navigation vetoed");
        }
    }

    fn spin(&mut self) -> Vec<EngineEvent> {
        while let Some(command) = self.commands.pop_front() {
            self.execute(command);
        }
        self.outbox.drain(..).collect()
    }
}

fn page_title(url: &Url) -> String {
    if url.scheme() == "data" {
        let payload = url.path().split_once(',').map_or("", |(_, body)| body);
        let document = String::from_utf8_lossy(&urlencoding::decode_binary(payload.as_bytes()))
            .into_owned();
        return document
            .split_once("<title>")
            .and_then(|(_, rest)| rest.split_once("</title>"))
            .map(|(title, _)| title.trim().to_string())
            .unwrap_or_default();
    }
    url.host_str().unwrap_or_default().to_string()
}
