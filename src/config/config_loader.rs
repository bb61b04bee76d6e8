use anyhow::{Ok, Result};

use super::config_model::{AuthSecret, Database, DotEnvyConfig, FlowConfig, Server};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let server = Server {
        port: std::env::var("SERVER_PORT")
            .expect("SERVER_PORT is invalid")
            .parse()?,
        body_limit: std::env::var("SERVER_BODY_LIMIT")
            .expect("SERVER_BODY_LIMIT is invalid")
            .parse()?,
        timeout: std::env::var("SERVER_TIMEOUT")
            .expect("SERVER_TIMEOUT is invalid")
            .parse()?,
    };

    let database = Database {
        url: std::env::var("DATABASE_URL").expect("DATABASE_URL is invalid"),
    };

    let flow = FlowConfig {
        base_url: std::env::var("FLOW_BASE_URL").expect("FLOW_BASE_URL is invalid"),
        api_key: std::env::var("FLOW_API_KEY").expect("FLOW_API_KEY is invalid"),
        secret_key: std::env::var("FLOW_SECRET_KEY").expect("FLOW_SECRET_KEY is invalid"),
        confirmation_url: std::env::var("FLOW_CONFIRMATION_URL")
            .expect("FLOW_CONFIRMATION_URL is invalid"),
        return_url: std::env::var("FLOW_RETURN_URL").expect("FLOW_RETURN_URL is invalid"),
    };

    Ok(DotEnvyConfig {
        server,
        database,
        flow,
    })
}

pub fn get_auth_secret() -> Result<AuthSecret> {
    dotenvy::dotenv().ok();

    Ok(AuthSecret {
        jwt_secret: std::env::var("JWT_SECRET").expect("JWT_SECRET is invalid"),
    })
}
