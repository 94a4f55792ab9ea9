use std::{fs, path::Path, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{native::Priority, software::SoftwareBackend, Result};

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend: BackendConfig,
    /// Hint preset applied on startup, in order.
    pub hints: Vec<HintSetting>,
}

impl AppConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(?path, "loading configuration");
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

/// Configuration of the in-process resource backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub render_targets: bool,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            render_targets: true,
        }
    }
}

impl BackendConfig {
    pub fn build(&self) -> Arc<SoftwareBackend> {
        Arc::new(SoftwareBackend::new().with_render_targets(self.render_targets))
    }
}

/// An untyped hint assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HintSetting {
    pub name: String,
    pub value: String,
    #[serde(default = "default_priority")]
    pub priority: Priority,
}

fn default_priority() -> Priority {
    Priority::Normal
}

impl HintSetting {
    pub fn new(name: impl Into<String>, value: impl Into<String>, priority: Priority) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            priority,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{native::Capability, native::NativeAllocator, MediaError};

    #[test]
    fn empty_document_uses_defaults() {
        let config = AppConfig::from_json_str("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(config.backend.render_targets);
        assert!(config.hints.is_empty());
    }

    #[test]
    fn parses_hint_presets() {
        let config = AppConfig::from_json_str(
            r#"{
                "backend": { "render_targets": false },
                "hints": [
                    { "name": "SDL_RENDER_DRIVER", "value": "opengl", "priority": "override" },
                    { "name": "SDL_RENDER_VSYNC", "value": "1" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(
            config.hints,
            vec![
                HintSetting::new("SDL_RENDER_DRIVER", "opengl", Priority::Override),
                HintSetting::new("SDL_RENDER_VSYNC", "1", Priority::Normal),
            ]
        );
        assert!(!config.backend.build().supports(Capability::RenderTargets));
    }

    #[test]
    fn rejects_unknown_priorities() {
        let err = AppConfig::from_json_str(
            r#"{ "hints": [{ "name": "SDL_RENDER_VSYNC", "value": "1", "priority": "urgent" }] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, MediaError::Config(_)));
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "hints": [{{ "name": "SDL_EVENT_LOGGING", "value": "2" }}] }}"#).unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.hints[0].name, "SDL_EVENT_LOGGING");
        assert!(matches!(
            AppConfig::load(file.path().with_extension("missing")),
            Err(MediaError::Io(_))
        ));
    }
}
