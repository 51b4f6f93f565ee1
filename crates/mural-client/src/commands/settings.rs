//! Per-device look and feel: theme colour, font and rainbow mode.
//!
//! Nothing here touches the shared backend. Values live in the
//! [`PreferenceStore`](mural_store::PreferenceStore) and are re-applied on
//! startup.

use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use mural_shared::constants::{
    DEFAULT_FONT_FAMILY, DEFAULT_RAINBOW_MODE, PREF_FONT_FAMILY, PREF_RAINBOW_MODE,
    PREF_THEME_COLOR,
};
use mural_shared::types::ThemeColor;

use crate::context::AppContext;
use crate::error::ClientError;
use crate::events::ThemeView;

const SAVE_CONTEXT: &str = "Erro ao salvar configurações";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    pub theme_color: ThemeColor,
    pub font_family: String,
    pub rainbow_mode: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme_color: ThemeColor::default(),
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            rainbow_mode: DEFAULT_RAINBOW_MODE,
        }
    }
}

impl Preferences {
    pub fn theme(&self) -> ThemeView {
        ThemeView {
            primary_color: self.theme_color.to_string(),
            font_family: self.font_family.clone(),
            rainbow_mode: self.rainbow_mode,
        }
    }
}

pub struct SettingsPanel {
    ctx: Arc<AppContext>,
    current: Mutex<Preferences>,
}

impl SettingsPanel {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self {
            ctx,
            current: Mutex::new(Preferences::default()),
        }
    }

    pub fn current(&self) -> Preferences {
        self.current.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn update(&self, f: impl FnOnce(&mut Preferences)) -> Preferences {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut current);
        let prefs = current.clone();
        drop(current);
        self.ctx.view.apply_theme(&prefs.theme());
        prefs
    }

    /// Read stored values and apply them. Missing or unreadable values keep
    /// their defaults.
    pub fn load(&self) -> Preferences {
        let store = &self.ctx.backend.prefs;
        let read = |key: &str| match store.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "could not read preference");
                None
            }
        };

        let mut prefs = Preferences::default();
        if let Some(raw) = read(PREF_THEME_COLOR) {
            match ThemeColor::parse(&raw) {
                Ok(color) => prefs.theme_color = color,
                Err(e) => warn!(error = %e, "ignoring stored theme colour"),
            }
        }
        if let Some(font) = read(PREF_FONT_FAMILY).filter(|f| !f.trim().is_empty()) {
            prefs.font_family = font;
        }
        if let Some(raw) = read(PREF_RAINBOW_MODE) {
            prefs.rainbow_mode = raw == "true";
        }

        debug!(color = %prefs.theme_color, rainbow = prefs.rainbow_mode, "preferences loaded");
        self.update(|current| *current = prefs)
    }

    pub fn apply_theme_color(&self, color: &str) -> Result<ThemeColor, ClientError> {
        let result = ThemeColor::parse(color)
            .map_err(|_| ClientError::validation(format!("Cor inválida: {color}")))
            .and_then(|color| {
                self.ctx.backend.prefs.set(PREF_THEME_COLOR, color.as_str())?;
                Ok(color)
            });
        let color = self.ctx.reported(SAVE_CONTEXT, result)?;

        self.update(|p| p.theme_color = color.clone());
        self.ctx.notifier.success("Cor do tema aplicada!");
        Ok(color)
    }

    /// Same as [`apply_theme_color`](Self::apply_theme_color); the presets
    /// are just shortcuts in the view.
    pub fn set_preset_color(&self, color: &str) -> Result<ThemeColor, ClientError> {
        self.apply_theme_color(color)
    }

    pub fn apply_font(&self, font: &str) -> Result<(), ClientError> {
        let font = font.trim();
        let result = if font.is_empty() {
            Err(ClientError::validation("Por favor, selecione uma fonte!"))
        } else {
            self.ctx
                .backend
                .prefs
                .set(PREF_FONT_FAMILY, font)
                .map_err(ClientError::from)
        };
        self.ctx.reported(SAVE_CONTEXT, result)?;

        self.update(|p| p.font_family = font.to_string());
        self.ctx.notifier.success("Fonte aplicada!");
        Ok(())
    }

    /// Flip rainbow mode; returns the new state.
    pub fn toggle_rainbow(&self) -> Result<bool, ClientError> {
        let enabled = !self.current().rainbow_mode;
        let result = self
            .ctx
            .backend
            .prefs
            .set(PREF_RAINBOW_MODE, if enabled { "true" } else { "false" })
            .map_err(ClientError::from);
        self.ctx.reported(SAVE_CONTEXT, result)?;

        self.update(|p| p.rainbow_mode = enabled);
        if enabled {
            self.ctx.notifier.success("Modo arco-íris ativado! 🌈");
        } else {
            self.ctx.notifier.success("Modo arco-íris desativado");
        }
        Ok(enabled)
    }

    /// Back to defaults after confirmation. `Ok(false)` when declined.
    pub async fn reset(&self) -> Result<bool, ClientError> {
        if !self
            .ctx
            .view
            .confirm("Tem certeza que deseja restaurar as configurações padrão?")
            .await
        {
            return Ok(false);
        }

        let store = &self.ctx.backend.prefs;
        let result = [PREF_THEME_COLOR, PREF_FONT_FAMILY, PREF_RAINBOW_MODE]
            .into_iter()
            .try_for_each(|key| store.remove(key))
            .map_err(ClientError::from);
        self.ctx.reported(SAVE_CONTEXT, result)?;

        self.update(|p| *p = Preferences::default());
        self.ctx.notifier.success("Configurações restauradas!");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;
    use mural_store::PreferenceStore;

    #[tokio::test]
    async fn applied_values_persist_and_reload() {
        let h = Harness::new();
        let panel = SettingsPanel::new(h.ctx());

        panel.apply_theme_color("#FF3B30").unwrap();
        panel.apply_font("Georgia, serif").unwrap();
        assert!(panel.toggle_rainbow().unwrap());

        assert_eq!(h.prefs.get(PREF_THEME_COLOR).unwrap().as_deref(), Some("#ff3b30"));
        assert_eq!(h.prefs.get(PREF_RAINBOW_MODE).unwrap().as_deref(), Some("true"));

        let reloaded = SettingsPanel::new(h.ctx()).load();
        assert_eq!(reloaded.theme_color.as_str(), "#ff3b30");
        assert_eq!(reloaded.font_family, "Georgia, serif");
        assert!(reloaded.rainbow_mode);

        let theme = h.view.last_theme().unwrap();
        assert_eq!(theme.css_properties()[0], ("--primary-color", "#ff3b30"));
        assert!(theme.rainbow_mode);
    }

    #[tokio::test]
    async fn invalid_colour_is_not_stored() {
        let h = Harness::new();
        let panel = SettingsPanel::new(h.ctx());

        assert!(panel.set_preset_color("vermelho").is_err());
        assert_eq!(h.prefs.get(PREF_THEME_COLOR).unwrap(), None);
        assert_eq!(h.view.visible_toasts()[0].message, "Cor inválida: vermelho");
        assert_eq!(h.view.last_theme(), None);
    }

    #[tokio::test]
    async fn reset_restores_defaults() {
        let h = Harness::new();
        let panel = SettingsPanel::new(h.ctx());
        panel.apply_theme_color("#34c759").unwrap();
        panel.apply_font("monospace").unwrap();
        panel.toggle_rainbow().unwrap();

        h.view.answer_confirm(false);
        assert!(!panel.reset().await.unwrap());
        assert!(h.prefs.get(PREF_FONT_FAMILY).unwrap().is_some());

        h.view.answer_confirm(true);
        assert!(panel.reset().await.unwrap());
        for key in [PREF_THEME_COLOR, PREF_FONT_FAMILY, PREF_RAINBOW_MODE] {
            assert_eq!(h.prefs.get(key).unwrap(), None, "{key} still stored");
        }
        let current = panel.current();
        assert_eq!(current.theme_color.as_str(), "#007aff");
        assert_eq!(
            current.font_family,
            "-apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif"
        );
        assert!(!current.rainbow_mode);

        let theme = h.view.last_theme().unwrap();
        assert_eq!(theme.primary_color, "#007aff");
        assert_eq!(theme.font_family, current.font_family);
        assert!(!theme.rainbow_mode);
        assert_eq!(
            h.view.visible_toasts().last().unwrap().message,
            "Configurações restauradas!"
        );
    }

    #[tokio::test]
    async fn garbage_in_store_falls_back_to_defaults() {
        let h = Harness::new();
        h.prefs.set(PREF_THEME_COLOR, "blue").unwrap();
        h.prefs.set(PREF_RAINBOW_MODE, "sim").unwrap();

        let prefs = SettingsPanel::new(h.ctx()).load();
        assert_eq!(prefs, Preferences::default());
        assert!(h.view.visible_toasts().is_empty());
    }

    #[tokio::test]
    async fn toggle_twice_turns_rainbow_off() {
        let h = Harness::new();
        let panel = SettingsPanel::new(h.ctx());
        assert!(panel.toggle_rainbow().unwrap());
        assert!(!panel.toggle_rainbow().unwrap());
        assert_eq!(h.prefs.get(PREF_RAINBOW_MODE).unwrap().as_deref(), Some("false"));
        let last = h.view.visible_toasts().pop().unwrap();
        assert_eq!(last.message, "Modo arco-íris desativado");
        assert_eq!(last.kind, mural_shared::types::NoticeKind::Success);
    }
}
