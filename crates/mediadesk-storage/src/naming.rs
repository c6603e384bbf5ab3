//! Stored-filename generation for new assets.

use chrono::Utc;
use rand::Rng;
use rand::distributions::Alphanumeric;

/// Length of the random token portion of a stored name.
const TOKEN_LEN: usize = 12;

/// Extension used when the original name carries none.
const FALLBACK_EXT: &str = "bin";

/// Generate a collision-resistant stored file name for a new asset,
/// preserving the original extension: `<utc-timestamp>-<token>.<ext>`.
///
/// Replace never calls this: a replaced asset keeps the stored name it was
/// created with, because published pages address it by path.
pub fn generate_stored_name(original_name: &str) -> String {
    let ext = file_extension(original_name).unwrap_or_else(|| FALLBACK_EXT.to_string());
    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect();

    format!(
        "{}-{}.{}",
        Utc::now().format("%Y%m%d%H%M%S"),
        token.to_lowercase(),
        ext
    )
}

/// The lowercase extension of a file name, if it has one.
pub fn file_extension(name: &str) -> Option<String> {
    std::path::Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}
