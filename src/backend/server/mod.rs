//! Server Module
//!
//! This module contains the code that initializes and configures the Axum
//! HTTP server.
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs          - Module exports and documentation
//! ├── state.rs        - AppState and FromRef implementations
//! ├── config.rs       - Configuration loading and store selection
//! └── init.rs         - State initialization and app creation
//! ```
//!
//! # Initialization Flow
//!
//! 1. **Configuration Loading**: defaults, optional TOML file, environment
//! 2. **Store Opening**: PostgreSQL (with migrations) or in-memory
//! 3. **State Creation**: sessions, password hasher, media, presence
//! 4. **Router Creation**: routes, CORS, body limit, static uploads
//!
//! # Example
//!
//! ```rust,no_run
//! use gogo::backend::server::{config::ServerConfig, create_app, init_state};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::load()?;
//! let app = create_app(init_state(config).await?);
//! # Ok(())
//! # }
//! ```

/// Application state management
pub mod state;

/// Server configuration loading
pub mod config;

/// Server initialization
pub mod init;

pub use config::{load_store, ConfigError, ServerConfig};
pub use init::{create_app, init_state, InitError};
pub use state::AppState;
