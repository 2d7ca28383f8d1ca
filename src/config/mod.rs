//! Configuration management.

mod settings;

pub use settings::{
    AnalyticsProviderConfig, Config, OracleConfig, SeoProviderConfig, ServerConfig,
};
