//! Icône de la fenêtre.
//!
//! Cherche d'abord le fichier principal, puis le secondaire. Si aucun
//! n'existe, la fenêtre garde l'icône par défaut du système et un warning
//! est émis. Le démarrage n'échoue jamais à cause de l'icône.

use std::path::{Path, PathBuf};

use tracing::{info, warn};
use winit::window::Icon;

/// Résultat de la recherche d'icône.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppIcon {
    Primary(PathBuf),
    /// Le fichier principal manque, le secondaire existe.
    Fallback(PathBuf),
    /// Aucun fichier : icône système.
    Default,
}

impl AppIcon {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Primary(path) | Self::Fallback(path) => Some(path),
            Self::Default => None,
        }
    }
}

/// Choisit le fichier d'icône à utiliser.
pub fn resolve_icon(primary: &Path, secondary: &Path) -> AppIcon {
    if primary.is_file() {
        return AppIcon::Primary(primary.to_path_buf());
    }
    if secondary.is_file() {
        info!(
            missing = %primary.display(),
            using = %secondary.display(),
            "Icône principale absente, fichier secondaire utilisé"
        );
        return AppIcon::Fallback(secondary.to_path_buf());
    }
    warn!(
        primary = %primary.display(),
        secondary = %secondary.display(),
        "Aucune icône trouvée, icône par défaut"
    );
    AppIcon::Default
}

/// Décode l'icône choisie pour winit. `None` → icône système.
pub fn load_window_icon(icon: &AppIcon) -> Option<Icon> {
    let path = icon.path()?;
    let image = match image::open(path) {
        Ok(image) => image,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Icône illisible");
            return None;
        }
    };
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    match Icon::from_rgba(rgba.into_raw(), width, height) {
        Ok(icon) => Some(icon),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Icône invalide");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(path: &Path) {
        image::RgbaImage::from_pixel(4, 4, image::Rgba([255, 0, 0, 255]))
            .save(path)
            .unwrap();
    }

    #[test]
    fn test_primary_preferred() {
        let dir = tempfile::tempdir().unwrap();
        let primary = dir.path().join("icon.png");
        let secondary = dir.path().join("other.png");
        write_png(&primary);
        write_png(&secondary);
        assert_eq!(resolve_icon(&primary, &secondary), AppIcon::Primary(primary));
    }

    #[test]
    fn test_secondary_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let primary = dir.path().join("icon.ico");
        let secondary = dir.path().join("icon.png");
        write_png(&secondary);
        assert_eq!(resolve_icon(&primary, &secondary), AppIcon::Fallback(secondary));
    }

    #[test]
    fn test_both_missing_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let icon = resolve_icon(&dir.path().join("a.ico"), &dir.path().join("b.png"));
        assert_eq!(icon, AppIcon::Default);
        assert!(icon.path().is_none());
        assert!(load_window_icon(&icon).is_none());
    }

    #[test]
    fn test_load_png_icon() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("icon.png");
        write_png(&path);
        assert!(load_window_icon(&AppIcon::Primary(path)).is_some());
    }

    #[test]
    fn test_corrupt_icon_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("icon.png");
        std::fs::write(&path, b"not an image").unwrap();
        assert!(load_window_icon(&AppIcon::Primary(path)).is_none());
    }
}
