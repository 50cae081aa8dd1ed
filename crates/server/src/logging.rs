use crate::config::ServerConfig;

pub fn setup_logging(config: &ServerConfig) {
    common::setup_logging(config.environment.clone());
}
