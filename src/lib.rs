//! NeuroShell - keyword-driven command shell over system facilities

pub mod command;
pub mod core;
pub mod intent;
pub mod services;
pub mod ui;
