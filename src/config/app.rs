use crate::config::{get_env, try_get_env};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tracing::warn;

pub const NAME_HOST: &str = "HOST";
pub const NAME_PORT: &str = "PORT";
pub const NAME_ORIGIN: &str = "WEBSITE_URL";

const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
const PUBLIC_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
const DEFAULT_PORT: u16 = 3001;
const DEFAULT_ORIGIN: &str = "http://127.0.0.1:3000";

#[derive(Deserialize)]
pub struct ApplicationSettingsModel {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub origin: Option<String>,
}

impl ApplicationSettingsModel {
    pub fn to_settings(self) -> ApplicationSettings {
        let host = match self.host.as_deref().map(str::parse::<IpAddr>) {
            Some(Ok(host)) => host,
            Some(Err(e)) => {
                warn!("Invalid host ({e}), using {DEFAULT_HOST}");
                DEFAULT_HOST
            }
            None => {
                warn!("Using default host");
                DEFAULT_HOST
            }
        };
        let port = self.port.unwrap_or_else(|| {
            warn!("Using default port");
            DEFAULT_PORT
        });

        ApplicationSettings::new(
            SocketAddr::new(host, port),
            self.origin.unwrap_or_else(|| DEFAULT_ORIGIN.to_string()),
        )
    }
}

#[derive(Clone, Debug)]
pub struct ApplicationSettings {
    pub addr: SocketAddr,
    /// Address of the web client allowed to hold the session cookie.
    pub origin: String,
}

impl ApplicationSettings {
    pub fn new(addr: SocketAddr, origin: String) -> Self {
        Self { addr, origin }
    }

    /// Binds every interface unless `HOST` says otherwise.
    pub fn from_env() -> Self {
        let host = try_get_env(NAME_HOST)
            .and_then(|host| host.parse::<IpAddr>().ok())
            .unwrap_or(PUBLIC_HOST);
        let port = get_env(NAME_PORT).parse::<u16>().unwrap_or_else(|e| {
            warn!("Invalid {NAME_PORT} ({e}), using {DEFAULT_PORT}");
            DEFAULT_PORT
        });
        Self {
            addr: SocketAddr::new(host, port),
            origin: get_env(NAME_ORIGIN),
        }
    }
}

impl Default for ApplicationSettings {
    fn default() -> Self {
        Self::new(
            SocketAddr::new(DEFAULT_HOST, DEFAULT_PORT),
            DEFAULT_ORIGIN.to_string(),
        )
    }
}

#[cfg(test)]
mod app_settings_tests {
    use super::*;

    fn model(host: Option<&str>, port: Option<u16>) -> ApplicationSettingsModel {
        ApplicationSettingsModel {
            host: host.map(str::to_string),
            port,
            origin: None,
        }
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let settings = model(None, None).to_settings();
        assert_eq!(settings.addr, ApplicationSettings::default().addr);
        assert_eq!(settings.origin, DEFAULT_ORIGIN);
    }

    #[test]
    fn ipv6_host_is_accepted() {
        let settings = model(Some("::1"), Some(8080)).to_settings();
        assert_eq!(settings.addr.to_string(), "[::1]:8080");
    }

    #[test]
    fn invalid_host_is_replaced() {
        let settings = model(Some("localhost:3000"), Some(8080)).to_settings();
        assert_eq!(settings.addr.ip(), DEFAULT_HOST);
    }
}
