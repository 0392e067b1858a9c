pub(crate) mod commands;
pub(crate) mod config;
pub(crate) mod connectors;
pub(crate) mod registration;
