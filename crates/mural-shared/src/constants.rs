/// Application name
pub const APP_NAME: &str = "Mural";

/// Record paths in the structured data store
pub const USERS_PATH: &str = "users";
pub const REVIEWS_PATH: &str = "reviews";
pub const VIDEO_RECORD_PATH: &str = "content/video";
pub const GALLERY_PATH: &str = "content/gallery";

/// Blob paths
pub const PROFILE_PHOTOS_DIR: &str = "profilePhotos";
pub const GALLERY_BLOB_DIR: &str = "gallery";
/// Every video upload lands here, replacing the previous one.
pub const VIDEO_BLOB_PATH: &str = "videos/journal-video";

/// Review rating bounds (inclusive)
pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// Local preference keys
pub const PREF_THEME_COLOR: &str = "themeColor";
pub const PREF_FONT_FAMILY: &str = "fontFamily";
pub const PREF_RAINBOW_MODE: &str = "rainbowMode";

/// Preference defaults restored by a settings reset
pub const DEFAULT_THEME_COLOR: &str = "#007aff";
pub const DEFAULT_FONT_FAMILY: &str =
    "-apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif";
pub const DEFAULT_RAINBOW_MODE: bool = false;

/// CSS custom properties driven by the settings panel
pub const CSS_PRIMARY_COLOR: &str = "--primary-color";
pub const CSS_FONT_FAMILY: &str = "--font-family";

/// Toast timing in milliseconds
pub const TOAST_DISPLAY_MS: u64 = 3_000;
pub const TOAST_EXIT_MS: u64 = 300;

/// Default maximum blob size in bytes (50 MiB)
pub const MAX_BLOB_SIZE: usize = 50 * 1024 * 1024;

/// Minimum password length accepted by the reference auth backend
pub const MIN_PASSWORD_LEN: usize = 6;
