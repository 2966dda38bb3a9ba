use std::net::SocketAddr;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, String> {
        match std::env::var("BIND_ADDR") {
            Ok(addr) => addr
                .parse()
                .map(|bind_addr| Self { bind_addr })
                .map_err(|e| format!("Invalid BIND_ADDR '{}': {}", addr, e)),
            Err(_) => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bind_addr() {
        assert_eq!(ServerConfig::default().bind_addr.to_string(), "0.0.0.0:3000");
    }
}
