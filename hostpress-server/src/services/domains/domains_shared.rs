use std::sync::Arc;

use hostpress_core::{ServiceCapabilities, ServiceHandle, ServiceMethodKind};
use hostpress_store::{Domain, NewDomain};

use super::domains_hooks::{AdminLocalOnly, ValidateNewDomain};
use super::DomainParams;

pub fn capabilities() -> ServiceCapabilities {
    ServiceCapabilities::from_methods(vec![
        ServiceMethodKind::Find,
        ServiceMethodKind::Create,
        ServiceMethodKind::Remove,
    ])
}

pub fn register_hooks(
    domains: ServiceHandle<Domain, NewDomain, DomainParams>,
) -> ServiceHandle<Domain, NewDomain, DomainParams> {
    domains.hooks(|h| {
        crate::hooks::log_calls(h);

        // gate first, then validation
        h.before_create(Arc::new(AdminLocalOnly));
        h.before_create(Arc::new(ValidateNewDomain));
        h.before_remove(Arc::new(AdminLocalOnly));
    })
}
