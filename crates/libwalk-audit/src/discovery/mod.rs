//! Process discovery via `/proc`.

pub mod maps;
pub mod processes;

pub use maps::{library_paths, parse_line, parse_maps};
pub use processes::{ProcfsSource, DEFAULT_PROC_ROOT};
