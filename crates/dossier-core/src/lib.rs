//! Agent registry core: the record model, the SQLite-backed store, and the
//! codename generator.

mod agent;
pub mod codename;
mod error;
mod store;
mod traits;

pub use agent::{
    AccessLevel, Agent, AgentFields, AgentFilter, AgentForm, UnknownAccessLevel,
    MAX_CODENAME_LEN, MAX_CONTACT_NUMBER_LEN, MAX_EMAIL_LEN,
};
pub use codename::CodenameGenerator;
pub use error::{FieldError, FieldIssue, StoreError, ValidationError};
pub use store::AgentStore;
pub use traits::CodenameRegistry;
