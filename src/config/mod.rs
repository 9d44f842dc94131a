//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse, deserialize, sanitize rule domains)
//!     → validation.rs (semantic checks)
//!     → RedirectConfig (validated, immutable)
//!     → loader::compile_rules → RuleStore snapshot
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → server swaps the rule store snapshot
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{compile_rules, load_config, parse_config, ConfigError};
pub use schema::{
    AccessLogConfig, AccessLogSinkKind, AdminConfig, ListenerConfig, LogFormat,
    ObservabilityConfig, RedirectConfig, RuleConfig, TimeoutConfig, TlsConfig,
};
pub use validation::ValidationError;
