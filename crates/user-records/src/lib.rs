//! User records: CRUD over a document store, signup and login through a
//! trusted credential service, and record intake over hybrid-encrypted
//! envelopes.

pub mod config;
pub mod credentials;
pub mod error;
pub mod media;
pub mod normalize;
pub mod service;
pub mod store;
pub mod transport;
pub mod types;
pub mod validation;

pub use config::Config;
pub use credentials::CredentialService;
pub use error::UserError;
pub use media::{MediaStore, MemoryMediaStore};
pub use normalize::normalize_input;
pub use service::UserService;
pub use store::{DocumentStore, MemoryStore};
pub use transport::{EnvelopeTransport, LoopbackTransport};
pub use types::{
    Account, LoginRequest, Session, SignupRequest, StatusUpdate, Upload, User, UserInput,
    ACCOUNTS, USERS,
};
pub use validation::{validate_login, validate_signup, validate_status, validate_user};
