pub mod config;
pub mod corr_color;
pub mod corr_matrix;
pub mod data_fetch;
pub mod error;
pub mod http_client;
pub mod locator;
pub mod player_rounds;
pub mod provider;
pub mod state;
