pub mod auth_service;
pub mod certificate_service;

pub use auth_service::AuthService;
pub use certificate_service::CertificateService;
