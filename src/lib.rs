//! # TabBrows : navigateur multi-onglets
//!
//! Coeur d'un navigateur à onglets : résolution des adresses, interception
//! des clics molette, cycle de vie des onglets et réglages partagés. Le
//! moteur de rendu est derrière un trait ; le binaire fournit la fenêtre.
//!
//! ## Architecture des modules
//!
//! - [`preferences`] : `SettingsStore`, thème et moteur de recherche partagés
//!   par tous les onglets.
//!
//! - [`resolver`] : texte de la barre d'adresse → URL (schéma explicite,
//!   domaine nu, ou recherche).
//!
//! - [`interceptor`] : politique de navigation par onglet. Un clic molette
//!   sur un lien ouvre un nouvel onglet au lieu de naviguer.
//!
//! - [`engine`] : frontière avec le moteur de rendu (`RenderingEngine`,
//!   `EngineEvent`) et `HeadlessEngine`, moteur sans rendu.
//!
//! - [`tabs`] : `TabManager`, création/fermeture/focus des onglets et
//!   synchronisation du chrome (titre, barre d'adresse, libellés).
//!
//! - [`urlbar`] : modèle texte + curseur de la barre d'adresse.
//!
//! - [`settings`] : dialogue de réglages affiché dans un onglet.
//!
//! - [`icon`] : icône de la fenêtre avec fichier de secours.
//!
//! - [`config`] : fichier `config.toml`.
//!
//! - [`browser`] : boucle d'événements Winit ("Two-Phase App").

pub mod browser;
pub mod config;
pub mod engine;
pub mod icon;
pub mod interceptor;
pub mod preferences;
pub mod resolver;
pub mod settings;
pub mod tabs;
pub mod urlbar;
