use anyhow::Context;
use bigdecimal::BigDecimal;
use dotenvy::dotenv;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// How the gateway expects the API key to be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// `X-API-Key: <key>` header.
    ApiKeyHeader,
    /// `Authorization: Basic base64(<key>:)` header.
    Basic,
}

impl FromStr for AuthScheme {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "api_key" | "api-key" | "x-api-key" => Ok(AuthScheme::ApiKeyHeader),
            "basic" => Ok(AuthScheme::Basic),
            other => anyhow::bail!("unknown auth scheme: {}", other),
        }
    }
}

#[derive(Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub api_key: String,
    pub auth: AuthScheme,
    /// Lifetime requested for each PIX charge, in seconds.
    pub pix_expiry_secs: u32,
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &mask_secret(&self.api_key))
            .field("auth", &self.auth)
            .field("pix_expiry_secs", &self.pix_expiry_secs)
            .finish()
    }
}

fn mask_secret(value: &str) -> String {
    if value.len() > 8 && value.is_ascii() {
        format!("{}****{}", &value[..4], &value[value.len() - 4..])
    } else {
        "****".to_string()
    }
}

#[derive(Debug, Clone)]
pub struct DeliveryConfig {
    pub city: String,
    pub state: String,
    /// CEP prefixes served by the store. Empty means no restriction.
    pub cep_prefixes: Vec<String>,
    pub delivery_fee: BigDecimal,
    /// Subtotal at which delivery becomes free, when the store offers it.
    pub free_delivery_threshold: Option<BigDecimal>,
}

impl DeliveryConfig {
    /// Delivery fee owed for a given cart subtotal.
    pub fn fee_for(&self, subtotal: &BigDecimal) -> BigDecimal {
        match &self.free_delivery_threshold {
            Some(threshold) if subtotal >= threshold => BigDecimal::from(0),
            _ => self.delivery_fee.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LookupConfig {
    pub viacep_base_url: String,
    pub geocode_base_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval_secs: u64,
    pub max_attempts: u32,
}

impl PollPolicy {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval_secs: 5,
            max_attempts: 120,
        }
    }
}

/// One storefront profile. Everything that differed between the store
/// variants lives here; the rest of the crate is parameterized by it.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    pub store_name: String,
    /// Lowercase identifier used to namespace persisted session state.
    pub store_slug: String,
    pub currency: String,
    pub gateway: GatewayConfig,
    pub delivery: DeliveryConfig,
    pub lookup: LookupConfig,
    pub polling: PollPolicy,
}

impl StorefrontConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok(); // Load .env file if present

        let base_url = env::var("PEDIDO_GATEWAY_URL").context("PEDIDO_GATEWAY_URL is not set")?;
        url::Url::parse(&base_url).context("PEDIDO_GATEWAY_URL is not a valid URL")?;

        let api_key =
            env::var("PEDIDO_GATEWAY_API_KEY").context("PEDIDO_GATEWAY_API_KEY is not set")?;
        if api_key.trim().is_empty() {
            anyhow::bail!("PEDIDO_GATEWAY_API_KEY is empty");
        }

        let auth = env::var("PEDIDO_GATEWAY_AUTH")
            .unwrap_or_else(|_| "api_key".to_string())
            .parse::<AuthScheme>()?;

        let store_name =
            env::var("PEDIDO_STORE_NAME").unwrap_or_else(|_| "Pedido Delivery".to_string());
        let store_slug = match env::var("PEDIDO_STORE_SLUG") {
            Ok(slug) => slug,
            Err(_) => slugify(&store_name),
        };

        Ok(StorefrontConfig {
            store_name,
            store_slug,
            currency: env::var("PEDIDO_CURRENCY").unwrap_or_else(|_| "BRL".to_string()),
            gateway: GatewayConfig {
                base_url,
                api_key,
                auth,
                pix_expiry_secs: env::var("PEDIDO_PIX_EXPIRY_SECS")
                    .unwrap_or_else(|_| "600".to_string())
                    .parse()
                    .context("PEDIDO_PIX_EXPIRY_SECS must be an integer")?,
            },
            delivery: DeliveryConfig {
                city: env::var("PEDIDO_DELIVERY_CITY")
                    .unwrap_or_else(|_| "Foz do Iguaçu".to_string()),
                state: env::var("PEDIDO_DELIVERY_STATE").unwrap_or_else(|_| "PR".to_string()),
                cep_prefixes: parse_cep_prefixes(
                    &env::var("PEDIDO_CEP_PREFIXES").unwrap_or_else(|_| "858".to_string()),
                ),
                delivery_fee: parse_amount("PEDIDO_DELIVERY_FEE", "0")?,
                free_delivery_threshold: match env::var("PEDIDO_FREE_DELIVERY_THRESHOLD") {
                    Ok(raw) => Some(
                        BigDecimal::from_str(raw.trim())
                            .context("PEDIDO_FREE_DELIVERY_THRESHOLD must be a decimal amount")?,
                    ),
                    Err(_) => None,
                },
            },
            lookup: LookupConfig {
                viacep_base_url: env::var("PEDIDO_VIACEP_URL")
                    .unwrap_or_else(|_| "https://viacep.com.br".to_string()),
                geocode_base_url: env::var("PEDIDO_GEOCODE_URL")
                    .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string()),
            },
            polling: PollPolicy {
                interval_secs: env::var("PEDIDO_POLL_INTERVAL_SECS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .context("PEDIDO_POLL_INTERVAL_SECS must be an integer")?,
                max_attempts: env::var("PEDIDO_POLL_MAX_ATTEMPTS")
                    .unwrap_or_else(|_| "120".to_string())
                    .parse()
                    .context("PEDIDO_POLL_MAX_ATTEMPTS must be an integer")?,
            },
        })
    }
}

fn parse_amount(var: &str, default: &str) -> anyhow::Result<BigDecimal> {
    let raw = env::var(var).unwrap_or_else(|_| default.to_string());
    BigDecimal::from_str(raw.trim()).with_context(|| format!("{} must be a decimal amount", var))
}

fn parse_cep_prefixes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|prefix| !prefix.is_empty())
        .map(str::to_string)
        .collect()
}

/// Turns a display name into a storage-safe slug: "Bendita Marmita"
/// becomes "bendita-marmita".
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_dash = true;
    for ch in name.chars() {
        if ch.is_alphanumeric() {
            slug.extend(ch.to_lowercase());
            last_was_dash = false;
        } else if !last_was_dash {
            slug.push('-');
            last_was_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
