//! Workspace layer: a copy-on-write overlay addressed by
//! base commit plus workspace id.

mod overlay;

pub use overlay::{
    delete_file, diff, effective_directory, file_exists, list_directory, move_file, read_file,
    status, write_file,
};
