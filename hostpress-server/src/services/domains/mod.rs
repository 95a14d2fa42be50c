pub mod domain_params;
pub mod domains_hooks;
pub mod domains_service;
pub mod domains_shared;

pub use domain_params::DomainParams;
pub use domains_service::DomainsService;
