pub mod clipboard;
pub mod fs;
pub mod logging;
