//! Shell configuration.
//!
//! Identity of the embedded application: the private scheme and host it is
//! served under, where the bundle's web root sits, and the interface-boundary
//! constants for the surrounding window. All values are fixed per process.

/// Environment variable consulted for the engine license key.
pub const LICENSE_KEY_ENV: &str = "VISOR_LICENSE_KEY";

/// Static identity and layout of the embedded application.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Private URI scheme the app is served under.
    pub scheme: &'static str,
    /// Host identifier for app URLs.
    pub host: &'static str,
    /// Root segment inside the bundle where web resources live.
    pub content_root: &'static str,
    /// SPA entry document the root path rewrites to.
    pub entry_document: &'static str,
    /// Window title (consumed by the embedding application, not by this core).
    pub window_title: &'static str,
    /// Initial window width in pixels.
    pub window_width: u32,
    /// Initial window height in pixels.
    pub window_height: u32,
    /// Development mode: load from a dev server and enable dev tools.
    pub dev_mode: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            scheme: "app",
            host: "dashboard",
            content_root: "/web",
            entry_document: "/index.html",
            window_title: "Visor Dashboard",
            window_width: 1280,
            window_height: 800,
            dev_mode: false,
        }
    }
}

impl ShellConfig {
    /// The URL the shell navigates to at startup.
    pub fn app_url(&self) -> String {
        format!("{}://{}/", self.scheme, self.host)
    }
}

/// Resolve the engine license key: an explicit value from the embedding
/// application wins, then the [`LICENSE_KEY_ENV`] environment variable.
/// Empty strings count as unset.
pub fn license_key(explicit: Option<&str>) -> Option<String> {
    resolve_license_key(explicit, std::env::var(LICENSE_KEY_ENV).ok())
}

fn resolve_license_key(explicit: Option<&str>, env: Option<String>) -> Option<String> {
    if let Some(key) = explicit {
        if !key.is_empty() {
            return Some(key.to_string());
        }
    }
    env.filter(|key| !key.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_url() {
        assert_eq!(ShellConfig::default().app_url(), "app://dashboard/");
    }

    #[test]
    fn test_license_key_prefers_explicit() {
        assert_eq!(
            resolve_license_key(Some("abc"), Some("env".to_string())),
            Some("abc".to_string())
        );
    }

    #[test]
    fn test_license_key_falls_back_to_env() {
        assert_eq!(
            resolve_license_key(None, Some("env".to_string())),
            Some("env".to_string())
        );
        assert_eq!(
            resolve_license_key(Some(""), Some("env".to_string())),
            Some("env".to_string())
        );
    }

    #[test]
    fn test_license_key_empty_everywhere() {
        assert_eq!(resolve_license_key(None, Some(String::new())), None);
        assert_eq!(resolve_license_key(None, None), None);
    }
}
