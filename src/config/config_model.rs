#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub server: Server,
    pub database: Database,
    pub flow: FlowConfig,
}

#[derive(Debug, Clone)]
pub struct Server {
    pub port: u16,
    pub body_limit: u64,
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct AuthSecret {
    pub jwt_secret: String,
}

/// Gateway credentials and callback URLs. Built once at startup; a missing
/// value is a fatal configuration error, never a per-request one.
#[derive(Debug, Clone)]
pub struct FlowConfig {
    pub base_url: String,
    pub api_key: String,
    pub secret_key: String,
    pub confirmation_url: String,
    pub return_url: String,
}
