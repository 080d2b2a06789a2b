pub mod certificates;
pub mod query;
pub mod seed_loader;

pub use certificates::CertificateService;
