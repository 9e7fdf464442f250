//! Authentication Module
//!
//! This module handles registration, login, session tokens and the admin
//! bootstrap.
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs          - Module exports and documentation
//! ├── password.rs     - bcrypt hashing with a configurable cost
//! ├── sessions.rs     - JWT issue/verify and the session cookie
//! ├── bootstrap.rs    - Idempotent first-admin creation
//! └── handlers/       - HTTP handlers
//!     ├── types.rs    - Request/response types
//!     ├── signup.rs   - User registration
//!     ├── login.rs    - Login and logout
//!     └── me.rs       - Current user
//! ```
//!
//! # Authentication Flow
//!
//! 1. **Signup**: username, email and password are validated, the password
//!    is hashed, the user is stored with role `user`
//! 2. **Login**: credentials are verified, a token is returned in the body
//!    and set as the `accessToken` cookie
//! 3. **Protected routes**: `middleware::auth` accepts either the bearer
//!    header or the cookie
//!
//! # Security
//!
//! - Passwords are hashed using bcrypt before storage
//! - Tokens are stateless HS256 JWTs with a configurable lifetime
//! - Invalid credentials return one generic 401 message

pub mod bootstrap;
pub mod handlers;
pub mod password;
pub mod sessions;

pub use bootstrap::{ensure_admin, BootstrapOutcome};
pub use handlers::{get_me, login, logout, signup};
pub use password::PasswordHasher;
pub use sessions::{Claims, SessionManager, ACCESS_TOKEN_COOKIE};
