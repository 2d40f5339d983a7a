pub mod app;
pub mod client;
pub mod crypto;
pub mod domain;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::{AuthService, CertificateService};
pub use client::{connect, CertificateApi, ClientError, LocalClient, MemoryClient, RemoteClient};
pub use domain::{CertError, CertificateRecord, IssueReceipt, Role, Session, SessionStore, Submission};
pub use infra::Config;
pub use storage::RecordStore;
