//! Settings dialog rendered as an HTML page in a tab.
//!
//! The page is loaded from a `data:` URL pre-filled with the current theme
//! and search engine. Its Apply button navigates to
//! `http://tabbrows.settings/apply?theme=..&search_engine=..`; the tab
//! manager intercepts that navigation, writes both values to the
//! [`SettingsStore`] and asks the host to re-apply the theme.

use tracing::warn;

use crate::preferences::{SearchEngine, Settings, SettingsStore, Theme};

/// Domain used for the apply action (never actually loaded).
const APPLY_DOMAIN: &str = "tabbrows.settings";

/// Label of the dialog tab.
pub const DIALOG_TITLE: &str = "Settings";

/// Returns `true` if the URL is the dialog's apply action.
pub fn is_settings_apply_url(url: &str) -> bool {
    url.starts_with(&format!("http://{APPLY_DOMAIN}/apply"))
        || url.starts_with(&format!("https://{APPLY_DOMAIN}/apply"))
}

/// Reads the submitted form from an apply URL.
///
/// Missing fields keep the `fallback` value; unknown engine names become
/// Google and unknown themes light.
pub fn parse_apply_url(url: &str, fallback: Settings) -> Option<Settings> {
    let (_, query) = url.split_once('?')?;
    let mut settings = fallback;
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "theme" => settings.theme = Theme::from_name(&value),
            "search_engine" => settings.search_engine = SearchEngine::from_name(&value),
            other => warn!(key = other, "Unknown settings field ignored"),
        }
    }
    Some(settings)
}

/// Writes the submitted values back and returns the theme to re-apply.
pub fn apply(store: &SettingsStore, submitted: Settings) -> Theme {
    store.apply(submitted);
    submitted.theme
}

/// `data:` URL showing the dialog for the given initial state.
pub fn dialog_url(current: Settings) -> String {
    format!(
        "data:text/html;charset=utf-8,{}",
        urlencoding::encode(&generate_settings_html(current))
    )
}

/// Generates the dialog page with the current values selected.
pub fn generate_settings_html(current: Settings) -> String {
    let engine_options: String = SearchEngine::ALL
        .iter()
        .map(|engine| {
            let selected = if *engine == current.search_engine {
                " selected"
            } else {
                ""
            };
            format!(
                "<option value=\"{name}\"{selected}>{name}</option>",
                name = engine.name()
            )
        })
        .collect();

    let (bg, fg) = match current.theme {
        Theme::Light => ("#F0F2F5", "#333"),
        Theme::Dark => ("#1a1a1a", "#e0e0e0"),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
body {{ font-family: Arial, sans-serif; background: {bg}; color: {fg}; width: 300px; margin: 24px auto; }}
fieldset {{ border: 1px solid #888; border-radius: 6px; margin-bottom: 16px; }}
legend {{ font-weight: bold; }}
button {{ background: #66A3FF; color: white; border: none; border-radius: 6px; padding: 6px 16px; }}
</style>
</head>
<body>
<fieldset><legend>Theme Mode</legend>
<label><input type="radio" name="theme" value="light"{light_checked}> Light</label>
<label><input type="radio" name="theme" value="dark"{dark_checked}> Dark</label>
</fieldset>
<fieldset><legend>Default Search Engine</legend>
<select id="search_engine">{engine_options}</select>
</fieldset>
<button onclick="apply()">Apply</button>
<script>
function apply() {{
    var theme = document.querySelector('input[name="theme"]:checked').value;
    var engine = document.getElementById("search_engine").value;
    window.location.href = "http://{domain}/apply?theme=" + encodeURIComponent(theme)
        + "&search_engine=" + encodeURIComponent(engine);
}}
</script>
</body>
</html>"#,
        title = DIALOG_TITLE,
        light_checked = if current.theme == Theme::Light { " checked" } else { "" },
        dark_checked = if current.theme == Theme::Dark { " checked" } else { "" },
        domain = APPLY_DOMAIN,
    )
}
