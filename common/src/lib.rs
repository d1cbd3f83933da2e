// Common library for the jury table numbering service: models, table number
// sequence, numbering operations and the store they run against

pub mod bootstrap;
pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod numbering;
pub mod sequence;
pub mod telemetry;
