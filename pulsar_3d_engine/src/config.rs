//! Renderer configuration

/// Renderer configuration
///
/// Passed to the backend at bootstrap time. Validation defaults to on in
/// debug builds only.
#[derive(Debug, Clone)]
pub struct Config {
    /// Enable validation/debug layers
    pub enable_validation: bool,
    /// Application name
    pub app_name: String,
    /// Application version (major, minor, patch)
    pub app_version: (u32, u32, u32),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enable_validation: cfg!(debug_assertions),
            app_name: "Pulsar3D Application".to_string(),
            app_version: (1, 0, 0),
        }
    }
}
