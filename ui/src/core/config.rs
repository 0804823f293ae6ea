//! Build-time application settings.

use once_cell::sync::OnceCell;

const DEFAULT_API_BASE: &str = "/dashboard/";
const DEFAULT_CURRENCY_SIGN: &str = "$";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Absolute, or relative to the page origin.
    pub api_base: String,
    pub currency_sign: String,
    /// Endpoint receiving the synthetic download form, relative to `api_base`.
    pub download_endpoint: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: option_env!("ICE_API_BASE")
                .unwrap_or(DEFAULT_API_BASE)
                .to_string(),
            currency_sign: option_env!("ICE_CURRENCY_SIGN")
                .unwrap_or(DEFAULT_CURRENCY_SIGN)
                .to_string(),
            download_endpoint: "download".to_string(),
        }
    }
}

static CONFIG: OnceCell<AppConfig> = OnceCell::new();

impl AppConfig {
    pub fn global() -> &'static AppConfig {
        CONFIG.get_or_init(AppConfig::default)
    }

    /// `api_base` made absolute against `origin` and ending in `/`.
    pub fn resolved_api_base(&self, origin: &str) -> String {
        let mut base = if self.api_base.starts_with("http://") || self.api_base.starts_with("https://")
        {
            self.api_base.clone()
        } else {
            format!(
                "{}/{}",
                origin.trim_end_matches('/'),
                self.api_base.trim_start_matches('/')
            )
        };
        if !base.ends_with('/') {
            base.push('/');
        }
        base
    }

    pub fn download_action(&self, origin: &str) -> String {
        format!("{}{}", self.resolved_api_base(origin), self.download_endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base: &str) -> AppConfig {
        AppConfig {
            api_base: base.to_string(),
            ..AppConfig::default()
        }
    }

    #[test]
    fn relative_base_joins_origin() {
        assert_eq!(
            config("/dashboard").resolved_api_base("https://ice.example.com/"),
            "https://ice.example.com/dashboard/"
        );
    }

    #[test]
    fn absolute_base_is_kept() {
        assert_eq!(
            config("https://api.example.com/ice/").resolved_api_base("https://ignored"),
            "https://api.example.com/ice/"
        );
    }

    #[test]
    fn download_action_lives_under_base() {
        assert_eq!(
            config("/dashboard/").download_action("http://localhost:8080"),
            "http://localhost:8080/dashboard/download"
        );
    }
}
