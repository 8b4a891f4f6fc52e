//! Barre d'adresse : modèle texte + curseur, sans dépendance graphique.
//!
//! La barre reflète l'URL de l'onglet actif tant que l'utilisateur ne la
//! modifie pas. Quand l'URL change, le texte est remplacé et le curseur
//! revient au début (la fin d'une longue URL reste hors champ, le domaine
//! reste visible). La validation passe par [`crate::resolver`].

use crate::preferences::SearchEngine;
use crate::resolver;

/// État du focus de la barre d'adresse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlBarFocus {
    /// Pas de focus, le clavier va à la page.
    Unfocused,
    /// Vient d'être focusée : tout est sélectionné, la prochaine frappe
    /// remplace le contenu.
    Selected,
    /// Édition caractère par caractère.
    Editing,
}

/// Modèle de la barre d'adresse.
#[derive(Debug, Clone)]
pub struct UrlBar {
    text: String,
    /// Offset en octets dans `text`.
    cursor: usize,
    focus: UrlBarFocus,
    /// Dernière URL reçue, restaurée sur Escape.
    current_url: String,
}

impl Default for UrlBar {
    fn default() -> Self {
        Self::new()
    }
}

impl UrlBar {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            cursor: 0,
            focus: UrlBarFocus::Unfocused,
            current_url: String::new(),
        }
    }

    /// Affiche l'URL de l'onglet, curseur au début.
    ///
    /// Pendant une édition, seule l'URL mémorisée change : le texte tapé
    /// n'est pas écrasé.
    pub fn set_url(&mut self, url: &str) {
        self.current_url = url.to_string();
        if self.focus == UrlBarFocus::Unfocused {
            self.text = url.to_string();
            self.cursor = 0;
        }
    }

    /// Affiche l'URL même en cours d'édition (changement d'onglet).
    pub fn reset_to(&mut self, url: &str) {
        self.focus = UrlBarFocus::Unfocused;
        self.set_url(url);
    }

    /// Focus (Ctrl+L ou clic) : sélectionne tout.
    pub fn focus(&mut self) {
        self.focus = UrlBarFocus::Selected;
        self.cursor = self.text.len();
    }

    /// Escape : abandonne la saisie et restaure l'URL courante.
    pub fn unfocus(&mut self) {
        let url = std::mem::take(&mut self.current_url);
        self.reset_to(&url);
    }

    fn take_selection(&mut self) {
        if self.focus == UrlBarFocus::Selected {
            self.text.clear();
            self.cursor = 0;
        }
        self.focus = UrlBarFocus::Editing;
    }

    pub fn insert_char(&mut self, c: char) {
        self.take_selection();
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn insert_str(&mut self, s: &str) {
        s.chars().for_each(|c| self.insert_char(c));
    }

    /// Backspace. Avec tout sélectionné, efface tout.
    pub fn backspace(&mut self) {
        if self.focus == UrlBarFocus::Selected {
            self.take_selection();
            return;
        }
        self.focus = UrlBarFocus::Editing;
        if let Some(prev) = self.prev_boundary() {
            self.text.drain(prev..self.cursor);
            self.cursor = prev;
        }
    }

    /// Suppr. Avec tout sélectionné, efface tout.
    pub fn delete(&mut self) {
        if self.focus == UrlBarFocus::Selected {
            self.take_selection();
            return;
        }
        self.focus = UrlBarFocus::Editing;
        if let Some(c) = self.text[self.cursor..].chars().next() {
            self.text.drain(self.cursor..self.cursor + c.len_utf8());
        }
    }

    pub fn move_left(&mut self) {
        if self.focus == UrlBarFocus::Selected {
            self.focus = UrlBarFocus::Editing;
            self.cursor = 0;
            return;
        }
        if let Some(prev) = self.prev_boundary() {
            self.cursor = prev;
        }
    }

    pub fn move_right(&mut self) {
        if self.focus == UrlBarFocus::Selected {
            self.focus = UrlBarFocus::Editing;
            return;
        }
        if let Some(c) = self.text[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    pub fn home(&mut self) {
        self.focus = UrlBarFocus::Editing;
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.focus = UrlBarFocus::Editing;
        self.cursor = self.text.len();
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.text[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
    }

    /// Entrée / bouton "Go" : résout le texte en URL à charger.
    ///
    /// Texte vide → `None`, rien n'est chargé.
    pub fn submit(&mut self, engine: SearchEngine) -> Option<String> {
        let input = self.text.trim();
        if input.is_empty() {
            return None;
        }
        let url = resolver::resolve(input, engine);
        self.focus = UrlBarFocus::Unfocused;
        Some(url)
    }

    pub fn is_focused(&self) -> bool {
        self.focus != UrlBarFocus::Unfocused
    }

    pub fn focus_state(&self) -> UrlBarFocus {
        self.focus
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Position du curseur en caractères.
    pub fn cursor_position(&self) -> usize {
        self.text[..self.cursor].chars().count()
    }
}
