use crate::env::string_or;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub metrics_addr: String,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let port = string_or("PORT", "8000");
        Self {
            bind_addr: format!("0.0.0.0:{}", port),
            metrics_addr: string_or("METRICS_ADDR", "0.0.0.0:9090"),
        }
    }
}
