//! Certificate domain: records, validation, errors and session roles.

pub mod certificate;
pub mod error;
pub mod session;
pub mod validation;

pub use certificate::{ActivityEntry, ActivityKind, CertificateRecord, IssueReceipt, Submission};
pub use error::CertError;
pub use session::{Role, Session, SessionStore};
