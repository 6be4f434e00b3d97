//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `NEXUS_BASE_URL` - Public URL for the storefront
//!
//! ## Optional
//! - `NEXUS_HOST` - Bind address (default: 127.0.0.1)
//! - `NEXUS_PORT` - Listen port (default: 3000)
//! - `CATALOG_SPREADSHEET_PATH` - Catalog CSV export
//!   (default: `crates/storefront/data/cutting_tools_catalog.csv`)
//! - `CATALOG_CACHE_TTL_SECS` - How long a loaded catalog is reused (default: 300)
//! - `STOCK_SOURCE` - `spreadsheet` or `airtable` (default: spreadsheet)
//! - `AIRTABLE_BASE_ID`, `AIRTABLE_API_KEY` - Hosted stock table (set both or neither)
//! - `AIRTABLE_TABLE` - Table name (default: Stock)
//! - `AIRTABLE_API_URL` - API root (default: <https://api.airtable.com/v0>)
//! - `EMAILJS_SERVICE_ID`, `EMAILJS_PUBLIC_KEY` - Email delivery (set both or neither)
//! - `EMAILJS_PRIVATE_KEY` - EmailJS access token for server-side sends
//! - `EMAILJS_CONTACT_TEMPLATE` - Template for contact messages (default: `template_contact`)
//! - `EMAILJS_API_URL` - API root (default: <https://api.emailjs.com>)
//! - `SALES_EMAIL` - Inbox for order notifications and quote requests
//! - `CONTACT_EMAIL` - Inbox for the contact form
//! - `RAZORPAY_KEY_ID` - Payment widget key; online payment is disabled without it
//! - `GST_RATE` - Tax rate as a fraction (default: 0.18)
//! - `FREE_SHIPPING_THRESHOLD` - Subtotal above which shipping is free (default: 1000000)
//! - `FLAT_SHIPPING_FEE` - Shipping below the threshold (default: 50000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use nexus_core::{Money, PricingPolicy};
use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

const DEFAULT_SPREADSHEET_PATH: &str = "crates/storefront/data/cutting_tools_catalog.csv";
const DEFAULT_AIRTABLE_API_URL: &str = "https://api.airtable.com/v0";
const DEFAULT_EMAILJS_API_URL: &str = "https://api.emailjs.com";
const DEFAULT_CONTACT_EMAIL: &str = "nexusautomation.in@gmail.com";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "your_",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Where the stock lookup page reads inventory from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StockSource {
    #[default]
    Spreadsheet,
    Airtable,
}

impl FromStr for StockSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spreadsheet" | "csv" => Ok(Self::Spreadsheet),
            "airtable" => Ok(Self::Airtable),
            other => Err(format!("expected 'spreadsheet' or 'airtable', got '{other}'")),
        }
    }
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Catalog spreadsheet and stock source
    pub catalog: CatalogConfig,
    /// Hosted stock table, if configured
    pub airtable: Option<AirtableConfig>,
    /// Email delivery, if configured
    pub emailjs: Option<EmailJsConfig>,
    /// Notification inboxes
    pub inboxes: InboxConfig,
    /// Payment widget settings
    pub payment: PaymentConfig,
    /// Tax and shipping rates
    pub pricing: PricingPolicy,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

/// Catalog loading configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub spreadsheet_path: PathBuf,
    pub stock_source: StockSource,
    pub cache_ttl: Duration,
}

/// Airtable REST API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct AirtableConfig {
    pub api_url: String,
    pub base_id: String,
    pub table: String,
    pub api_key: SecretString,
}

impl std::fmt::Debug for AirtableConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AirtableConfig")
            .field("api_url", &self.api_url)
            .field("base_id", &self.base_id)
            .field("table", &self.table)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// EmailJS REST API configuration.
///
/// The public key is the account's browser-safe user id; the private key
/// (access token) is what authorizes server-side sends.
#[derive(Clone)]
pub struct EmailJsConfig {
    pub api_url: String,
    pub service_id: String,
    pub public_key: String,
    pub private_key: Option<SecretString>,
    pub contact_template: String,
}

impl std::fmt::Debug for EmailJsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailJsConfig")
            .field("api_url", &self.api_url)
            .field("service_id", &self.service_id)
            .field("public_key", &self.public_key)
            .field(
                "private_key",
                &self.private_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("contact_template", &self.contact_template)
            .finish()
    }
}

/// Inboxes that receive notifications.
#[derive(Debug, Clone)]
pub struct InboxConfig {
    pub sales_email: String,
    pub contact_email: String,
}

/// Payment widget configuration.
#[derive(Debug, Clone, Default)]
pub struct PaymentConfig {
    /// Razorpay key id (public). `None` disables online payment.
    pub razorpay_key_id: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`StorefrontConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars(&lookup);

        let host = vars.parsed("NEXUS_HOST", "127.0.0.1")?;
        let port = vars.parsed("NEXUS_PORT", "3000")?;
        let base_url = vars.required("NEXUS_BASE_URL")?;

        let catalog = CatalogConfig {
            spreadsheet_path: PathBuf::from(vars.or_default(
                "CATALOG_SPREADSHEET_PATH",
                DEFAULT_SPREADSHEET_PATH,
            )),
            stock_source: vars.parsed("STOCK_SOURCE", "spreadsheet")?,
            cache_ttl: Duration::from_secs(vars.parsed("CATALOG_CACHE_TTL_SECS", "300")?),
        };

        let airtable = AirtableConfig::from_vars(&vars)?;
        if catalog.stock_source == StockSource::Airtable && airtable.is_none() {
            return Err(ConfigError::InvalidEnvVar(
                "STOCK_SOURCE".to_string(),
                "airtable requires AIRTABLE_BASE_ID and AIRTABLE_API_KEY".to_string(),
            ));
        }

        let emailjs = EmailJsConfig::from_vars(&vars)?;

        let contact_email = vars.or_default("CONTACT_EMAIL", DEFAULT_CONTACT_EMAIL);
        let inboxes = InboxConfig {
            sales_email: vars.optional("SALES_EMAIL").unwrap_or_else(|| contact_email.clone()),
            contact_email,
        };

        let payment = PaymentConfig {
            razorpay_key_id: vars.optional("RAZORPAY_KEY_ID"),
        };

        let defaults = PricingPolicy::default();
        let pricing = PricingPolicy {
            gst_rate: vars.parsed_or("GST_RATE", defaults.gst_rate)?,
            free_shipping_threshold: Money::new(vars.parsed_or(
                "FREE_SHIPPING_THRESHOLD",
                defaults.free_shipping_threshold.amount(),
            )?),
            flat_shipping_fee: Money::new(
                vars.parsed_or("FLAT_SHIPPING_FEE", defaults.flat_shipping_fee.amount())?,
            ),
        };
        if pricing.gst_rate.is_sign_negative() || pricing.gst_rate >= Decimal::ONE {
            return Err(ConfigError::InvalidEnvVar(
                "GST_RATE".to_string(),
                "must be a fraction between 0 and 1".to_string(),
            ));
        }

        Ok(Self {
            host,
            port,
            base_url,
            catalog,
            airtable,
            emailjs,
            inboxes,
            payment,
            pricing,
            sentry_dsn: vars.optional("SENTRY_DSN"),
            sentry_environment: vars.optional("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: vars.parsed("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: vars.parsed("SENTRY_TRACES_SAMPLE_RATE", "0.1")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether session cookies should be marked secure.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl AirtableConfig {
    /// Load only the Airtable settings from the environment.
    ///
    /// Used by tooling that talks to the stock table without running the
    /// storefront, so `NEXUS_BASE_URL` is not required.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if only one of the base id and API key is set,
    /// or if the key fails validation.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        let _ = dotenvy::dotenv();
        let lookup = |key: &str| std::env::var(key).ok();
        Self::from_vars(&Vars(&lookup))
    }

    fn from_vars(vars: &Vars<'_>) -> Result<Option<Self>, ConfigError> {
        let base_id = vars.optional("AIRTABLE_BASE_ID");
        let api_key = vars.optional("AIRTABLE_API_KEY");
        match (base_id, api_key) {
            (None, None) => Ok(None),
            (Some(_), None) => Err(ConfigError::MissingEnvVar("AIRTABLE_API_KEY".to_string())),
            (None, Some(_)) => Err(ConfigError::MissingEnvVar("AIRTABLE_BASE_ID".to_string())),
            (Some(base_id), Some(api_key)) => {
                validate_secret_strength(&api_key, "AIRTABLE_API_KEY")?;
                Ok(Some(Self {
                    api_url: vars.or_default("AIRTABLE_API_URL", DEFAULT_AIRTABLE_API_URL),
                    base_id,
                    table: vars.or_default("AIRTABLE_TABLE", "Stock"),
                    api_key: SecretString::from(api_key),
                }))
            }
        }
    }
}

impl EmailJsConfig {
    fn from_vars(vars: &Vars<'_>) -> Result<Option<Self>, ConfigError> {
        let service_id = vars.optional("EMAILJS_SERVICE_ID");
        let public_key = vars.optional("EMAILJS_PUBLIC_KEY");
        match (service_id, public_key) {
            (None, None) => Ok(None),
            (Some(_), None) => Err(ConfigError::MissingEnvVar("EMAILJS_PUBLIC_KEY".to_string())),
            (None, Some(_)) => Err(ConfigError::MissingEnvVar("EMAILJS_SERVICE_ID".to_string())),
            (Some(service_id), Some(public_key)) => {
                let private_key = vars
                    .optional("EMAILJS_PRIVATE_KEY")
                    .map(|key| {
                        validate_secret_strength(&key, "EMAILJS_PRIVATE_KEY")?;
                        Ok::<_, ConfigError>(SecretString::from(key))
                    })
                    .transpose()?;
                Ok(Some(Self {
                    api_url: vars.or_default("EMAILJS_API_URL", DEFAULT_EMAILJS_API_URL),
                    service_id,
                    public_key,
                    private_key,
                    contact_template: vars.or_default("EMAILJS_CONTACT_TEMPLATE", "template_contact"),
                }))
            }
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable lookup with the usual required/optional/default accessors.
struct Vars<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Vars<'_> {
    /// Get a variable, treating blank values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    fn parsed<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.or_default(key, default)
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }

    fn parsed_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key).map_or(Ok(default), |value| {
            value
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS
        .iter()
        .find(|pattern| lower.contains(**pattern))
    {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the key issued by the provider."
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const AIRTABLE_KEY: &str = "patQ8f2LkM1xZ9.b7c4e1a9f03d52c8e6b1a7d4f9c2e05b";

    fn load(pairs: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-airtable-token", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        assert!(validate_secret_strength(AIRTABLE_KEY, "TEST_VAR").is_ok());
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = load(&[("NEXUS_BASE_URL", "http://localhost:3000")]).unwrap();

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert!(!config.is_secure());
        assert_eq!(config.catalog.stock_source, StockSource::Spreadsheet);
        assert_eq!(config.catalog.cache_ttl, Duration::from_secs(300));
        assert_eq!(
            config.catalog.spreadsheet_path,
            PathBuf::from(DEFAULT_SPREADSHEET_PATH)
        );
        assert!(config.airtable.is_none());
        assert!(config.emailjs.is_none());
        assert!(config.payment.razorpay_key_id.is_none());
        assert_eq!(config.pricing, PricingPolicy::default());
        assert_eq!(config.inboxes.sales_email, DEFAULT_CONTACT_EMAIL);
    }

    #[test]
    fn test_missing_base_url() {
        assert!(matches!(
            load(&[]),
            Err(ConfigError::MissingEnvVar(key)) if key == "NEXUS_BASE_URL"
        ));
    }

    #[test]
    fn test_invalid_port() {
        let result = load(&[("NEXUS_BASE_URL", "http://x"), ("NEXUS_PORT", "eighty")]);
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(key, _)) if key == "NEXUS_PORT"));
    }

    #[test]
    fn test_pricing_overrides() {
        let config = load(&[
            ("NEXUS_BASE_URL", "http://x"),
            ("GST_RATE", "0.12"),
            ("FLAT_SHIPPING_FEE", "1500"),
        ])
        .unwrap();
        assert_eq!(config.pricing.gst_rate, Decimal::new(12, 2));
        assert_eq!(config.pricing.flat_shipping_fee, Money::from_rupees(1500));

        let result = load(&[("NEXUS_BASE_URL", "http://x"), ("GST_RATE", "18")]);
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(key, _)) if key == "GST_RATE"));
    }

    #[test]
    fn test_airtable_needs_both_values() {
        let result = load(&[("NEXUS_BASE_URL", "http://x"), ("AIRTABLE_BASE_ID", "appXYZ")]);
        assert!(
            matches!(result, Err(ConfigError::MissingEnvVar(key)) if key == "AIRTABLE_API_KEY")
        );
    }

    #[test]
    fn test_airtable_stock_source_requires_airtable() {
        let result = load(&[("NEXUS_BASE_URL", "http://x"), ("STOCK_SOURCE", "airtable")]);
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(key, _)) if key == "STOCK_SOURCE"));

        let config = load(&[
            ("NEXUS_BASE_URL", "https://nexus.example.in"),
            ("STOCK_SOURCE", "airtable"),
            ("AIRTABLE_BASE_ID", "appXYZ"),
            ("AIRTABLE_API_KEY", AIRTABLE_KEY),
        ])
        .unwrap();
        let airtable = config.airtable.as_ref().unwrap();
        assert_eq!(airtable.table, "Stock");
        assert_eq!(airtable.api_url, DEFAULT_AIRTABLE_API_URL);
        assert!(config.is_secure());
    }

    #[test]
    fn test_config_debug_redacts_secrets() {
        let config = load(&[
            ("NEXUS_BASE_URL", "http://x"),
            ("AIRTABLE_BASE_ID", "appXYZ"),
            ("AIRTABLE_API_KEY", AIRTABLE_KEY),
            ("EMAILJS_SERVICE_ID", "service_nexus"),
            ("EMAILJS_PUBLIC_KEY", "pk_visible"),
            ("EMAILJS_PRIVATE_KEY", "Zq8vN3kP1wX7rT5yB2mL9cF4"),
        ])
        .unwrap();

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("appXYZ"));
        assert!(debug_output.contains("pk_visible"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains(AIRTABLE_KEY));
        assert!(!debug_output.contains("Zq8vN3kP1wX7rT5yB2mL9cF4"));
    }

    #[test]
    fn test_stock_source_parse() {
        assert_eq!("Airtable".parse::<StockSource>(), Ok(StockSource::Airtable));
        assert_eq!("csv".parse::<StockSource>(), Ok(StockSource::Spreadsheet));
        assert!("excel".parse::<StockSource>().is_err());
    }
}
