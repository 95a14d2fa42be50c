use hostpress_core::ServiceHandle;

/// Router state for one mounted service.
pub struct HostpressAxumState<R, D, P>
where
    R: Send + 'static,
    D: Send + 'static,
    P: Send + Sync + Clone + 'static,
{
    pub service: ServiceHandle<R, D, P>,
}

impl<R, D, P> Clone for HostpressAxumState<R, D, P>
where
    R: Send + 'static,
    D: Send + 'static,
    P: Send + Sync + Clone + 'static,
{
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
        }
    }
}

impl<R, D, P> HostpressAxumState<R, D, P>
where
    R: Send + 'static,
    D: Send + 'static,
    P: Send + Sync + Clone + 'static,
{
    pub fn new(service: ServiceHandle<R, D, P>) -> Self {
        Self { service }
    }
}
