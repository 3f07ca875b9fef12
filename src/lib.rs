pub mod aggregate;
pub mod breakdown;
pub mod config;
pub mod districts;
pub mod events;
pub mod fetch;
pub mod http_cache;
pub mod http_client;
pub mod parser;
pub mod ranking;
pub mod regions;
pub mod report;
pub mod standings;
