//! Boucle d'événements Winit et cycle de vie de la fenêtre.
//!
//! ## Pattern "Two-Phase App"
//!
//! Winit 0.30 impose que les fenêtres soient créées dans `resumed()`, pas
//! dans `main()`. L'application est donc un enum à deux états :
//!
//! ```text
//! App::Initial { config, startup, icon }  →  [resumed()]  →  App::Running(AppState)
//! ```
//!
//! ## Flux des événements
//!
//! ```text
//! WindowEvent (clavier, souris)
//!     │
//!     ▼
//! TabManager (onglets, barre d'adresse, moteurs)
//!     │  spin() : callbacks des moteurs
//!     ▼
//! ChromeEvent → titre de fenêtre, thème, fermeture
//! ```
//!
//! ## Zones de la fenêtre
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Onglets (32px)                       │
//! ├──────────────────────────────────────┤
//! │ Barre d'adresse (40px)               │
//! ├──────────────────────────────────────┤
//! │ Contenu de l'onglet actif            │
//! └──────────────────────────────────────┘
//! ```

use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::event::{ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{Key, ModifiersState, NamedKey};
use winit::window::{Window, WindowId};

use crate::config::Config;
use crate::engine::HeadlessEngine;
use crate::icon::{self, AppIcon};
use crate::preferences::SettingsStore;
use crate::resolver;
use crate::tabs::{ChromeEvent, NewTabRequest, TabManager, TabStripHit};

/// Hauteur de la bande d'onglets (pixels logiques).
pub const TAB_STRIP_HEIGHT: f64 = 32.0;

/// Hauteur totale du chrome : onglets + barre d'adresse.
pub const CHROME_HEIGHT: f64 = TAB_STRIP_HEIGHT + 40.0;

/// Largeur fixe d'un onglet dans la bande.
pub const TAB_WIDTH: f64 = 180.0;

const DOUBLE_CLICK_INTERVAL: Duration = Duration::from_millis(500);

// ─────────────────────────────────────────────────────────────────────────────
// AppState
// ─────────────────────────────────────────────────────────────────────────────

/// État de la fenêtre, créé lors de `resumed()`.
pub struct AppState {
    pub window: Window,
    pub tabs: TabManager<HeadlessEngine>,
    /// Configuration chargée au démarrage, réécrite quand les réglages changent.
    pub config: Config,
    pub modifiers: ModifiersState,
    /// Position du curseur en pixels physiques.
    pub cursor_position: PhysicalPosition<f64>,
    last_strip_click: Option<(Instant, TabStripHit)>,
}

// ─────────────────────────────────────────────────────────────────────────────
// App : enum deux phases
// ─────────────────────────────────────────────────────────────────────────────

/// Application à deux phases de vie.
pub enum App {
    /// Phase pré-initialisation : on attend que Winit appelle `resumed()`.
    Initial {
        config: Config,
        startup: Vec<NewTabRequest>,
        icon: AppIcon,
    },

    /// Phase opérationnelle : la fenêtre existe.
    Running(Box<AppState>),
}

impl App {
    pub fn new(config: Config, startup: Vec<NewTabRequest>, icon: AppIcon) -> Self {
        Self::Initial {
            config,
            startup,
            icon,
        }
    }
}

/// Onglets ouverts au démarrage.
///
/// Les arguments CLI (hors flags `--...`) passent par le résolveur avec le
/// moteur de recherche configuré. Sans argument, on ouvre les onglets de la
/// configuration.
pub fn startup_requests(
    config: &Config,
    args: impl IntoIterator<Item = String>,
) -> Vec<NewTabRequest> {
    let from_args: Vec<NewTabRequest> = args
        .into_iter()
        .filter(|arg| !arg.starts_with("--"))
        .map(|arg| NewTabRequest::url(resolver::resolve(&arg, config.search.engine)))
        .collect();
    if !from_args.is_empty() {
        return from_args;
    }

    let from_config: Vec<NewTabRequest> = config
        .general
        .startup_tabs
        .iter()
        .map(|tab| NewTabRequest::Open {
            url: tab.url.clone(),
            title: tab.title.clone(),
        })
        .collect();
    if from_config.is_empty() {
        vec![NewTabRequest::Blank]
    } else {
        from_config
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Raccourcis clavier
// ─────────────────────────────────────────────────────────────────────────────

/// Actions globales, actives même quand la barre d'adresse a le focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    NewTab,
    CloseTab,
    NextTab,
    PreviousTab,
    FocusAddressBar,
    Back,
    Forward,
    Reload,
    OpenSettings,
}

/// Associe une touche (avec modificateurs) à un raccourci.
pub fn shortcut_for(key: &Key, mods: ModifiersState) -> Option<Shortcut> {
    match key {
        Key::Named(NamedKey::Tab) if mods.control_key() => Some(if mods.shift_key() {
            Shortcut::PreviousTab
        } else {
            Shortcut::NextTab
        }),
        Key::Named(NamedKey::F5) => Some(Shortcut::Reload),
        Key::Named(NamedKey::ArrowLeft) if mods.alt_key() => Some(Shortcut::Back),
        Key::Named(NamedKey::ArrowRight) if mods.alt_key() => Some(Shortcut::Forward),
        Key::Character(c) if mods.control_key() => match c.to_lowercase().as_str() {
            "t" => Some(Shortcut::NewTab),
            "w" => Some(Shortcut::CloseTab),
            "l" => Some(Shortcut::FocusAddressBar),
            "r" => Some(Shortcut::Reload),
            "," => Some(Shortcut::OpenSettings),
            _ => None,
        },
        _ => None,
    }
}

/// Onglet sous le curseur, `x` en pixels logiques.
pub fn tab_strip_hit(x: f64, tab_count: usize) -> TabStripHit {
    if x < 0.0 {
        return TabStripHit::Empty;
    }
    let index = (x / TAB_WIDTH) as usize;
    if index < tab_count {
        TabStripHit::Tab(index)
    } else {
        TabStripHit::Empty
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// AppState : dispatch
// ─────────────────────────────────────────────────────────────────────────────

impl AppState {
    /// Fait tourner les moteurs puis applique les changements au chrome.
    fn pump(&mut self, event_loop: &ActiveEventLoop) {
        self.tabs.spin();
        for event in self.tabs.drain_events() {
            match event {
                ChromeEvent::WindowTitleChanged(title) => self.window.set_title(&title),
                ChromeEvent::ThemeChanged(theme) => {
                    info!(%theme, "Theme re-applied");
                    self.config.set_settings(self.tabs.settings().get());
                    if let Err(e) = self.config.save() {
                        warn!(error = %e, "Cannot save settings");
                    }
                    self.window.request_redraw();
                }
                ChromeEvent::CloseWindow => {
                    info!("Window closing");
                    event_loop.exit();
                }
                other => {
                    debug!(event = ?other, "Chrome update");
                    self.window.request_redraw();
                }
            }
        }
    }

    fn run_shortcut(&mut self, shortcut: Shortcut) {
        debug!(?shortcut, "Shortcut");
        match shortcut {
            Shortcut::NewTab => {
                self.tabs.new_tab(NewTabRequest::Blank);
            }
            Shortcut::CloseTab => {
                if let Some(index) = self.tabs.focused_index() {
                    self.tabs.close_tab(index);
                }
            }
            Shortcut::NextTab | Shortcut::PreviousTab => {
                let count = self.tabs.tab_count();
                if let Some(index) = self.tabs.focused_index()
                    && count > 1
                {
                    let next = if shortcut == Shortcut::NextTab {
                        (index + 1) % count
                    } else {
                        (index + count - 1) % count
                    };
                    self.tabs.focus_tab(next);
                }
            }
            Shortcut::FocusAddressBar => self.tabs.address_bar_mut().focus(),
            Shortcut::Back => self.tabs.go_back(),
            Shortcut::Forward => self.tabs.go_forward(),
            Shortcut::Reload => self.tabs.reload(),
            Shortcut::OpenSettings => {
                self.tabs.open_settings();
            }
        }
    }

    /// Touches destinées à la barre d'adresse focusée.
    fn edit_address_bar(&mut self, event: &KeyEvent) {
        let mods = self.modifiers;
        match &event.logical_key {
            Key::Named(NamedKey::Enter) => {
                if let Some(url) = self.tabs.submit_address_bar() {
                    info!(url = %url, "Address bar submitted");
                }
            }
            Key::Named(NamedKey::Escape) => self.tabs.address_bar_mut().unfocus(),
            Key::Named(NamedKey::Backspace) => self.tabs.address_bar_mut().backspace(),
            Key::Named(NamedKey::Delete) => self.tabs.address_bar_mut().delete(),
            Key::Named(NamedKey::ArrowLeft) => self.tabs.address_bar_mut().move_left(),
            Key::Named(NamedKey::ArrowRight) => self.tabs.address_bar_mut().move_right(),
            Key::Named(NamedKey::Home) => self.tabs.address_bar_mut().home(),
            Key::Named(NamedKey::End) => self.tabs.address_bar_mut().end(),
            Key::Named(NamedKey::Space) => self.tabs.address_bar_mut().insert_char(' '),
            Key::Character(c) if !mods.control_key() && !mods.alt_key() => {
                self.tabs.address_bar_mut().insert_str(c);
            }
            _ => {}
        }
    }

    fn on_key(&mut self, event: &KeyEvent) {
        if event.state != ElementState::Pressed {
            return;
        }
        if let Some(shortcut) = shortcut_for(&event.logical_key, self.modifiers) {
            self.run_shortcut(shortcut);
            return;
        }
        if self.tabs.address_bar().is_focused() {
            self.edit_address_bar(event);
        }
    }

    fn on_mouse_press(&mut self, button: MouseButton) {
        let pos = self
            .cursor_position
            .to_logical::<f64>(self.window.scale_factor());

        if pos.y < TAB_STRIP_HEIGHT {
            if button != MouseButton::Left {
                return;
            }
            let hit = tab_strip_hit(pos.x, self.tabs.tab_count());
            let now = Instant::now();
            let double = self.last_strip_click.is_some_and(|(at, last)| {
                last == hit && now.duration_since(at) <= DOUBLE_CLICK_INTERVAL
            });
            if double {
                self.last_strip_click = None;
                self.tabs.on_tab_double_clicked(hit);
                return;
            }
            self.last_strip_click = Some((now, hit));
            if let TabStripHit::Tab(index) = hit {
                self.tabs.focus_tab(index);
            }
        } else if pos.y < CHROME_HEIGHT {
            if button == MouseButton::Left {
                self.tabs.address_bar_mut().focus();
            }
        } else {
            if self.tabs.address_bar().is_focused() {
                self.tabs.address_bar_mut().unfocus();
            }
            if let Some(index) = self.tabs.focused_index() {
                self.tabs.pointer_pressed(index, button.into());
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ApplicationHandler : dispatch des événements Winit
// ─────────────────────────────────────────────────────────────────────────────

impl ApplicationHandler for App {
    /// Appelé une fois par Winit quand l'application peut créer des fenêtres.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Self::Initial {
            config,
            startup,
            icon: app_icon,
        } = self
        else {
            return;
        };

        // ── 1. Fenêtre ─────────────────────────────────────────────────
        let window_attributes = Window::default_attributes()
            .with_title(config.general.window_title.as_str())
            .with_inner_size(LogicalSize::new(
                f64::from(config.window.width),
                f64::from(config.window.height),
            ))
            .with_window_icon(icon::load_window_icon(app_icon));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => window,
            Err(e) => {
                error!(error = %e, "Cannot create window");
                event_loop.exit();
                return;
            }
        };

        // ── 2. Réglages + gestionnaire d'onglets ───────────────────────
        let config = std::mem::take(config);
        let settings = SettingsStore::new(config.settings());
        info!(
            theme = %settings.theme(),
            engine = %settings.search_engine(),
            "Settings loaded"
        );
        let mut tabs = TabManager::new(
            settings,
            config.general.home_url.clone(),
            config.general.window_title.clone(),
            HeadlessEngine::new,
        );

        // ── 3. Onglets de démarrage ────────────────────────────────────
        for request in std::mem::take(startup) {
            tabs.new_tab(request);
        }

        // ── 4. Transition Initial → Running ────────────────────────────
        let mut state = Box::new(AppState {
            window,
            tabs,
            config,
            modifiers: ModifiersState::default(),
            cursor_position: PhysicalPosition::default(),
            last_strip_click: None,
        });
        state.pump(event_loop);
        *self = Self::Running(state);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Self::Running(state) = self else {
            return;
        };

        match event {
            // ── Fermeture de la fenêtre ────────────────────────────────
            WindowEvent::CloseRequested => {
                event_loop.exit();
                return;
            }

            // ── Modificateurs clavier (Ctrl, Shift, Alt, Meta) ────────
            WindowEvent::ModifiersChanged(new_modifiers) => {
                state.modifiers = new_modifiers.state();
            }

            WindowEvent::CursorMoved { position, .. } => {
                state.cursor_position = position;
            }

            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button,
                ..
            } => state.on_mouse_press(button),

            WindowEvent::KeyboardInput { event, .. } => state.on_key(&event),

            _ => (),
        }

        state.pump(event_loop);
    }
}
