//! Central configuration constants for endpoints, on-disk layout and limits.

/// Remote catalog listing every published add-on per version bucket.
pub const DEFAULT_CATALOG_URL: &str = "https://dl.labymod.net/addons.json";

/// Jar download endpoint. `{uuid}` is replaced with the add-on uuid.
pub const DEFAULT_DOWNLOAD_URL_TEMPLATE: &str = "https://dl.labymod.net/latest/?file={uuid}&a=1";

/// Icon endpoint. `{uuid}` is replaced with the add-on uuid.
pub const DEFAULT_ICON_URL_TEMPLATE: &str = "https://dl.labymod.net/latest/addons/{uuid}/icon.png";

/// Placeholder substituted in the URL templates.
pub const UUID_PLACEHOLDER: &str = "{uuid}";

/// Default base data directory, relative to the working directory.
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Archive document, relative to the data directory.
pub const ARCHIVE_FILENAME: &str = "archive.json";

/// Directory holding per add-on artifacts, relative to the data directory.
pub const ADDONS_DIRNAME: &str = "addons";

/// Prefix of each version bucket directory (`mc1.8`, `mc1.12`, ...).
pub const BUCKET_DIR_PREFIX: &str = "mc";

/// File name of the downloaded icon.
pub const ICON_FILENAME: &str = "icon.png";

/// Attempts per artifact before the download is reported as failed.
pub const DOWNLOAD_ATTEMPTS: u32 = 3;

/// Pause between download attempts, in milliseconds.
pub const DOWNLOAD_RETRY_DELAY_MS: u64 = 500;

/// TCP connect timeout for every request, in seconds.
pub const HTTP_CONNECT_TIMEOUT_SECS: u64 = 15;

/// Overall request timeout, in seconds. Generous so large jars can stream.
pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 300;

pub const USER_AGENT: &str = concat!("addonarc/", env!("CARGO_PKG_VERSION"));

/// Clamps a user supplied attempt count into a usable range.
pub fn clamp_attempts(v: u32) -> u32 {
    v.clamp(1, 10)
}
