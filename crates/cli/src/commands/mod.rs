pub mod chat;
pub mod config_cmd;
pub mod onboard;
pub mod serve;
pub mod status;
