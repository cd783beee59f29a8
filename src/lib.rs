pub mod config;
pub mod constants;
pub mod error;
pub mod fetch;
pub mod flatten;
pub mod load;
pub mod logging;
pub mod normalize;
pub mod pipeline;
pub mod reconcile;
pub mod table;
pub mod types;
pub mod validate;
