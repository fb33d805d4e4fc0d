pub mod session;
pub mod wizard;

pub use session::{AuthState, SessionStore};
pub use wizard::{PasswordResetWizard, ResetStep};
