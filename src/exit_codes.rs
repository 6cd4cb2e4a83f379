/// Exit codes for shinylive-filter
///
/// Document hosts only look at success or failure, but the split lets scripts
/// tell a broken setup from a broken build.
/// Success - Document filtered and written
pub const SUCCESS: i32 = 0;

/// Build failed - A tool, the conversion script, the document, or reading and
/// writing the document failed
pub const BUILD_FAILED: i32 = 1;

/// Configuration error - Bad config file or unknown language
pub const CONFIG_ERROR: i32 = 2;

/// Helper functions for consistent exit behavior
pub mod exit {
    use super::{BUILD_FAILED, CONFIG_ERROR, SUCCESS};

    /// Exit with success code (0)
    pub fn success() -> ! {
        std::process::exit(SUCCESS);
    }

    /// Exit with build failed code (1)
    pub fn build_failed() -> ! {
        std::process::exit(BUILD_FAILED);
    }

    /// Exit with configuration error code (2)
    pub fn config_error() -> ! {
        std::process::exit(CONFIG_ERROR);
    }
}
