//! Authentication HTTP handlers
//!
//! - `signup` - POST /users/signup
//! - `login` / `logout` - POST /users/login, POST /users/logout
//! - `get_me` - GET /auth/me

pub mod login;
pub mod me;
pub mod signup;
pub mod types;

pub use login::{authenticate, login, logout};
pub use me::get_me;
pub use signup::{register, signup};
pub use types::{AccountSummary, AuthResponse, LoginRequest, SignupRequest};
