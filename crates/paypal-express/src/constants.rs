use crate::error::PaypalError;

/// Production NVP endpoint.
pub const NVP_ENDPOINT: &str = "https://api-3t.paypal.com/nvp";

/// Sandbox NVP endpoint.
pub const SANDBOX_NVP_ENDPOINT: &str = "https://api-3t.sandbox.paypal.com/nvp";

/// Buyer approval page (production).
pub const REDIRECT_BASE: &str = "https://www.paypal.com/cgi-bin/webscr";

/// Buyer approval page (sandbox).
pub const SANDBOX_REDIRECT_BASE: &str = "https://www.sandbox.paypal.com/cgi-bin/webscr";

/// NVP API version sent with every request.
pub const API_VERSION: &str = "88.0";

/// Runtime API configuration. Decouples the client from compile-time
/// constants so the same code can target production or the sandbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub endpoint: String,
    pub redirect_base: String,
    pub version: String,
}

impl Default for ApiConfig {
    /// Defaults to the production environment.
    fn default() -> Self {
        Self {
            endpoint: NVP_ENDPOINT.to_string(),
            redirect_base: REDIRECT_BASE.to_string(),
            version: API_VERSION.to_string(),
        }
    }
}

impl ApiConfig {
    pub fn sandbox() -> Self {
        Self {
            endpoint: SANDBOX_NVP_ENDPOINT.to_string(),
            redirect_base: SANDBOX_REDIRECT_BASE.to_string(),
            version: API_VERSION.to_string(),
        }
    }

    /// Read `PAYPAL_SANDBOX` and `PAYPAL_API_VERSION` from the environment.
    pub fn from_env() -> Result<Self, PaypalError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, PaypalError> {
        let sandbox = lookup("PAYPAL_SANDBOX")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let mut config = if sandbox {
            Self::sandbox()
        } else {
            Self::default()
        };

        if let Some(version) = lookup("PAYPAL_API_VERSION") {
            let version = version.trim();
            if version.is_empty() || version.parse::<f32>().is_err() {
                return Err(PaypalError::ConfigError(format!(
                    "PAYPAL_API_VERSION must look like `88.0`, got '{version}'"
                )));
            }
            config.version = version.to_string();
        }

        Ok(config)
    }

    pub fn is_sandbox(&self) -> bool {
        self.endpoint == SANDBOX_NVP_ENDPOINT
    }
}
