//! Terminal glue shared by `mondoctl` and `bankterm`.

pub mod args;
pub mod commands;
pub mod history;
pub mod prompt;
pub mod render;
