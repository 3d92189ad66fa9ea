pub mod config_cmd;
pub mod logging;
pub mod output;
pub mod record_cmd;
pub mod renderer;
pub mod summary_cmd;
