pub mod config;

pub use config::MinilsConfig;
