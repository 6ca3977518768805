//! Session state: login status, profile kind, onboarding completion and
//! the cached identity of the device user.

pub mod service;
pub mod state;

pub use service::SessionService;
pub use state::{LoadPhase, SessionState, UserIdentity, UserType};
