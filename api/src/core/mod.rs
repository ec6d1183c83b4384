pub mod app_state;
pub mod http;
pub mod model_slot;
pub mod server_config;
