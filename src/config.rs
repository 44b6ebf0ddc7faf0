use serde::Deserialize;

pub const DEFAULT_MOBX_PACKAGE: &str = "mobx";

/// Plugin options, read from the JSON block next to the plugin in `.swcrc`.
///
/// ```json
/// ["swc_plugin_async_to_mobx_flow", { "mobxPackage": "mobx" }]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Module the namespace import of `flow` is taken from. Lets callers
    /// point at a fork or a shim of MobX.
    pub mobx_package: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mobx_package: DEFAULT_MOBX_PACKAGE.to_string(),
        }
    }
}

impl Config {
    /// Parse the raw plugin config. Anything unreadable falls back to the
    /// defaults.
    pub fn from_json(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return Self::default();
        }
        match serde_json::from_str::<Config>(raw) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(%err, "invalid plugin config, using defaults");
                Self::default()
            }
        }
    }
}
