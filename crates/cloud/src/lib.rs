//! Clients for the hosted backend: the identity provider, object storage,
//! and the in-process [`AuthContext`] of signed-in users.

pub mod error;
pub mod identity;
pub mod session;
pub mod storage;

pub use error::CloudError;
pub use identity::{IdentityClient, Session, SessionUser, SignUpResult};
pub use session::{AuthChange, AuthContext, AuthSubscription};
pub use storage::{BackendStorage, ObjectStore};
