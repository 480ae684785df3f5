//! Interactive viewer for `du -ak` disk usage reports

pub mod logging;
pub mod render;
pub mod report;
pub mod settings;
pub mod tree;
pub mod ui;
pub mod viewport;
