//! Services module
//!
//! Business logic services that coordinate between the UI layer and the
//! repository. User-scoped calls take the logged-in `Session`.

pub mod accounts;
pub mod credentials;
pub mod diary;
pub mod session;
pub mod validation;
pub mod water;
pub mod weight;

pub use accounts::{AccountDraft, AccountService, AccountUpdate};
pub use credentials::KeyringKeyStore;
pub use diary::{DiaryDay, DiaryService};
pub use session::{AppPreferences, Session, SessionStore};
pub use water::WaterService;
pub use weight::WeightService;
