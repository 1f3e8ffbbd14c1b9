use std::{env, time::Duration};

use log::*;
use vixis_common::{parse_boolean_flag, Secret};

const DEFAULT_VPS_HOST: &str = "127.0.0.1";
const DEFAULT_VPS_PORT: u16 = 8480;
const DEFAULT_RATE_LIMIT_MAX: u32 = 60;
const DEFAULT_RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);

const DLOCAL_SANDBOX_URL: &str = "https://sandbox.dlocal.com";
const DLOCAL_LIVE_URL: &str = "https://api.dlocal.com";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address,
    /// rather than the connection's remote address.
    pub use_x_forwarded_for: bool,
    /// If true, the Forwarded header will be used to determine the client's IP address, rather
    /// than the connection's remote address.
    pub use_forwarded: bool,
    /// dLocal payment provider configuration
    pub dlocal: DlocalConfig,
    /// Slack / email notification configuration
    pub notifications: NotificationConfig,
    /// Rate limiting for the exchange-rate proxy
    pub rate_limit: RateLimitConfig,
    /// API key for exchangerate-api.com
    pub exchange_rate_api_key: Secret<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_VPS_HOST.to_string(),
            port: DEFAULT_VPS_PORT,
            database_url: String::default(),
            use_x_forwarded_for: false,
            use_forwarded: false,
            dlocal: DlocalConfig::default(),
            notifications: NotificationConfig::default(),
            rate_limit: RateLimitConfig::default(),
            exchange_rate_api_key: Secret::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("VPS_HOST").ok().unwrap_or_else(|| DEFAULT_VPS_HOST.into());
        let port = env::var("VPS_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for VPS_PORT. {e} Using the default, {DEFAULT_VPS_PORT}, instead."
                    );
                    DEFAULT_VPS_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_VPS_PORT);
        let database_url = env::var("VPS_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ VPS_DATABASE_URL is not set. Please set it to the URL for the Vixis database.");
            String::default()
        });
        let use_x_forwarded_for = parse_boolean_flag(env::var("VPS_USE_X_FORWARDED_FOR").ok(), false);
        let use_forwarded = parse_boolean_flag(env::var("VPS_USE_FORWARDED").ok(), false);
        let dlocal = DlocalConfig::from_env_or_default();
        let notifications = NotificationConfig::from_env_or_default();
        let rate_limit = RateLimitConfig::from_env_or_default();
        let exchange_rate_api_key = Secret::new(env::var("VPS_EXCHANGE_RATE_API_KEY").ok().unwrap_or_default());
        Self {
            host,
            port,
            database_url,
            use_x_forwarded_for,
            use_forwarded,
            dlocal,
            notifications,
            rate_limit,
            exchange_rate_api_key,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct DlocalConfig {
    /// The dLocal API login (`X-Login` header on outbound calls, first element of the
    /// signature message on inbound webhooks).
    pub x_login: String,
    /// The dLocal transaction key (`X-Trans-Key` header on outbound calls).
    pub x_trans_key: Secret<String>,
    /// The shared HMAC secret for both inbound webhook verification and outbound signing.
    pub secret_key: Secret<String>,
    /// If true, payments are created against the dLocal sandbox endpoint.
    pub sandbox: bool,
    /// The webhook URL dLocal should deliver payment-status notifications to.
    pub notification_url: Option<String>,
    /// If false, inbound webhook signatures are not verified. Local development only.
    pub signature_checks: bool,
}

impl DlocalConfig {
    pub fn from_env_or_default() -> Self {
        let x_login = env::var("VPS_DLOCAL_X_LOGIN").ok().unwrap_or_default();
        if x_login.is_empty() {
            warn!("🪛️ VPS_DLOCAL_X_LOGIN is not set. dLocal integration will not work.");
        }
        let x_trans_key = Secret::new(env::var("VPS_DLOCAL_X_TRANS_KEY").ok().unwrap_or_default());
        let secret_key = Secret::new(env::var("VPS_DLOCAL_SECRET_KEY").ok().unwrap_or_default());
        let sandbox = parse_boolean_flag(env::var("VPS_DLOCAL_SANDBOX").ok(), false);
        let notification_url = env::var("VPS_DLOCAL_NOTIFICATION_URL").ok().filter(|s| !s.is_empty());
        let signature_checks = parse_boolean_flag(env::var("VPS_DLOCAL_SIGNATURE_CHECKS").ok(), true);
        if !signature_checks {
            warn!(
                "🪛️ ** VPS_DLOCAL_SIGNATURE_CHECKS is disabled. Webhook signatures will NOT be verified. Never run \
                 production like this. **"
            );
        }
        Self { x_login, x_trans_key, secret_key, sandbox, notification_url, signature_checks }
    }

    pub fn api_url(&self) -> &'static str {
        if self.sandbox {
            DLOCAL_SANDBOX_URL
        } else {
            DLOCAL_LIVE_URL
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct NotificationConfig {
    /// Slack incoming-webhook URL. When absent, Slack notifications are disabled.
    pub slack_webhook_url: Option<Secret<String>>,
    /// Resend API key. When absent, confirmation emails are disabled.
    pub resend_api_key: Option<Secret<String>>,
    /// The From address on confirmation emails.
    pub email_from: String,
}

impl NotificationConfig {
    pub fn from_env_or_default() -> Self {
        let slack_webhook_url = env::var("VPS_SLACK_WEBHOOK_URL").ok().filter(|s| !s.is_empty()).map(Secret::new);
        if slack_webhook_url.is_none() {
            info!("🪛️ VPS_SLACK_WEBHOOK_URL is not set. Slack notifications are disabled.");
        }
        let resend_api_key = env::var("VPS_RESEND_API_KEY").ok().filter(|s| !s.is_empty()).map(Secret::new);
        if resend_api_key.is_none() {
            info!("🪛️ VPS_RESEND_API_KEY is not set. Confirmation emails are disabled.");
        }
        let email_from =
            env::var("VPS_EMAIL_FROM").ok().unwrap_or_else(|| "Vixis Studio <billing@vixis.example>".into());
        Self { slack_webhook_url, resend_api_key, email_from }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self { max_requests: DEFAULT_RATE_LIMIT_MAX, window: DEFAULT_RATE_LIMIT_WINDOW }
    }
}

impl RateLimitConfig {
    pub fn from_env_or_default() -> Self {
        let max_requests = env::var("VPS_RATE_LIMIT_MAX")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(DEFAULT_RATE_LIMIT_MAX);
        let window = env::var("VPS_RATE_LIMIT_WINDOW_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_RATE_LIMIT_WINDOW);
        Self { max_requests, window }
    }
}
