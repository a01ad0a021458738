//! Maps an include-path string plus the path of the including file to
//! a filesystem path, so `using` directives can be resolved without
//! the driver knowing anything about search paths or packaging.

use std::path::{Path, PathBuf};

pub trait UsingResolver {
    /// `include_path` is the quoted string following `using`;
    /// `including_file` is the absolute path of the file that
    /// contains the directive (or `None` for a top-level
    /// `process_description` call with no backing file).
    fn resolve(
        &self,
        include_path: &str,
        including_file: Option<&Path>,
    ) -> std::io::Result<PathBuf>;
}
