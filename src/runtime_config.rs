//! Environment variable configuration for the coroutine runtime.
//!
//! ## `SELFDOC_STACK_SIZE`
//!
//! Sets the stack size for coroutine handlers. Accepts decimal (`16384`) or
//! hexadecimal (`0x4000`) values; default `0x4000` (16 KB). Total memory is
//! stack size times concurrent coroutines, so tune it to handler depth
//! rather than leaving a comfortable-looking large value in place.
//!
//! ```rust
//! use selfdoc::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! println!("Stack size: {} bytes", config.stack_size);
//! ```

use std::env;

const DEFAULT_STACK_SIZE: usize = 0x4000;

/// Runtime configuration loaded from environment variables.
///
/// Load this at startup using [`RuntimeConfig::from_env()`] to configure
/// the coroutine runtime behavior.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeConfig {
    /// Stack size for coroutines in bytes (default: 16 KB / 0x4000)
    pub stack_size: usize,
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let stack_size = match env::var("SELFDOC_STACK_SIZE") {
            Ok(val) => {
                if let Some(hex) = val.strip_prefix("0x") {
                    usize::from_str_radix(hex, 16).unwrap_or(DEFAULT_STACK_SIZE)
                } else {
                    val.parse().unwrap_or(DEFAULT_STACK_SIZE)
                }
            }
            Err(_) => DEFAULT_STACK_SIZE,
        };
        RuntimeConfig { stack_size }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test so the env var is only ever touched sequentially.
    #[test]
    fn test_stack_size_parsing() {
        env::remove_var("SELFDOC_STACK_SIZE");
        assert_eq!(RuntimeConfig::from_env().stack_size, DEFAULT_STACK_SIZE);

        env::set_var("SELFDOC_STACK_SIZE", "32768");
        assert_eq!(RuntimeConfig::from_env().stack_size, 32768);

        env::set_var("SELFDOC_STACK_SIZE", "0x8000");
        assert_eq!(RuntimeConfig::from_env().stack_size, 0x8000);

        env::set_var("SELFDOC_STACK_SIZE", "not-a-number");
        assert_eq!(RuntimeConfig::from_env().stack_size, DEFAULT_STACK_SIZE);

        env::remove_var("SELFDOC_STACK_SIZE");
    }
}
