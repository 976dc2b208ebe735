use std::{env, net::SocketAddr};

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";
pub const DEFAULT_STATIC_DIR: &str = "./resources/www/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebConfig {
    pub bind_address: String,
    pub static_dir: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_owned(),
            static_dir: DEFAULT_STATIC_DIR.to_owned(),
        }
    }
}

impl WebConfig {
    /// Reads `BIND_ADDRESS` and `STATIC_DIR`, falling back to the defaults
    /// for unset or unusable values.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let bind_address = match env::var("BIND_ADDRESS") {
            Ok(address) if address.parse::<SocketAddr>().is_ok() => address,
            Ok(address) => {
                log::warn!(
                    "ignoring invalid BIND_ADDRESS '{}', using {}",
                    address,
                    defaults.bind_address
                );
                defaults.bind_address
            }
            Err(_) => defaults.bind_address,
        };
        let static_dir = env::var("STATIC_DIR")
            .ok()
            .filter(|dir| !dir.trim().is_empty())
            .unwrap_or(defaults.static_dir);
        Self {
            bind_address,
            static_dir,
        }
    }

    pub fn not_found_page(&self) -> String {
        format!("{}/error404.html", self.static_dir.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = WebConfig::default();
        assert_eq!(config.bind_address, "0.0.0.0:8080");
        assert_eq!(config.not_found_page(), "./resources/www/error404.html");
    }
}
