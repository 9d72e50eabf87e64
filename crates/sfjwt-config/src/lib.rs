//! Configuration for sfjwt.
//!
//! TOML files are layered: the user config directory first, then a
//! project-local `sfjwt.toml`. Each section present in a later file replaces
//! the whole section from earlier ones. Command-line flags are applied on top
//! by the binary.

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    ConfigSource, LoadedConfig, load_config, load_config_file, load_config_with_options,
    log_dir, xdg_config_dir, xdg_config_path,
};
pub use error::{ConfigError, Result};
pub use types::*;
