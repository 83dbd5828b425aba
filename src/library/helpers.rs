//! Various small helper functions

use std::error::Error;
use std::path::Path;

/// Reads a config file by name from the given directory
pub fn load_config(directory: &Path, name: &str) -> Result<String, std::io::Error> {
    std::fs::read_to_string(directory.join(name))
}

/// Renders an error together with its whole source chain on a single line
///
/// Errors in this crate carry a short message and delegate the details to their source.
/// Logging only the top-most error would hide the actual cause, e.g. the status returned by the API server.
pub fn error_chain(error: &(dyn Error + 'static)) -> String {
    let mut causes = vec![error.to_string()];
    let mut source = error.source();

    while let Some(cause) = source {
        causes.push(cause.to_string());
        source = cause.source();
    }

    causes.join(": ")
}
