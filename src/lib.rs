pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod server;
pub mod storage;

// Domain data shapes shared across layers
pub mod domain;
pub mod gazetteer;
pub mod membership;
