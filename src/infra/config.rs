use std::net::SocketAddr;

use axum::http::HeaderValue;
use secrecy::SecretString;

pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub cors_origin: HeaderValue,
    pub razorpay_key_id: String,
    pub razorpay_key_secret: SecretString,
    pub razorpay_webhook_secret: SecretString,
    /// Upper bound on any single call to the payment processor.
    pub processor_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let bind_addr: SocketAddr = get_env_default("BIND_ADDR", "127.0.0.1:3001".parse().unwrap());
        let database_url: String = get_env("DATABASE_URL");
        let cors_origin: HeaderValue =
            get_env_default("CORS_ORIGIN", String::from("http://localhost:3000"))
                .parse()
                .expect("CORS_ORIGIN must be a valid header value");
        let razorpay_key_id: String = get_env("RAZORPAY_KEY_ID");
        let razorpay_key_secret: SecretString =
            SecretString::new(get_env::<String>("RAZORPAY_KEY_SECRET").into());
        let razorpay_webhook_secret: SecretString =
            SecretString::new(get_env::<String>("RAZORPAY_WEBHOOK_SECRET").into());
        let processor_timeout_secs: u64 = get_env_default("PROCESSOR_TIMEOUT_SECS", 10);

        Self {
            bind_addr,
            database_url,
            cors_origin,
            razorpay_key_id,
            razorpay_key_secret,
            razorpay_webhook_secret,
            processor_timeout_secs,
        }
    }
}

fn get_env<T: std::str::FromStr>(name: &str) -> T {
    let value = std::env::var(name).unwrap_or_else(|_| panic!("{} must be set", name));
    value
        .parse()
        .unwrap_or_else(|_| panic!("{} has an invalid value", name))
}

fn get_env_default<T: std::str::FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .unwrap_or_else(|_| panic!("{} has an invalid value", name)),
        Err(_) => default,
    }
}
