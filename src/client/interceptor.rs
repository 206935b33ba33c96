use crate::client::request::RequestDescriptor;
use crate::client::response::RawResponse;
use crate::error::ApiError;

/// Pre-dispatch hook; runs before every call leaves the client.
pub trait RequestInterceptor: Send + Sync {
    fn name(&self) -> &'static str;

    fn on_request(&self, request: &mut RequestDescriptor);
}

/// Post-dispatch hook; runs after a response (or transport failure) and
/// before the caller sees the result.
pub trait ResponseInterceptor: Send + Sync {
    fn name(&self) -> &'static str;

    fn on_success(&self, _request: &RequestDescriptor, _response: &mut RawResponse) {}

    fn on_failure(&self, _request: &RequestDescriptor, _error: &ApiError) {}
}

/// Interceptors in registration order. Fixed once the client is built.
#[derive(Default)]
pub struct InterceptorChain {
    request: Vec<Box<dyn RequestInterceptor>>,
    response: Vec<Box<dyn ResponseInterceptor>>,
}

impl InterceptorChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_request(&mut self, interceptor: Box<dyn RequestInterceptor>) {
        tracing::debug!("Registered request interceptor '{}'", interceptor.name());
        self.request.push(interceptor);
    }

    pub fn register_response(&mut self, interceptor: Box<dyn ResponseInterceptor>) {
        tracing::debug!("Registered response interceptor '{}'", interceptor.name());
        self.response.push(interceptor);
    }

    pub fn request_names(&self) -> Vec<&'static str> {
        self.request.iter().map(|i| i.name()).collect()
    }

    pub fn response_names(&self) -> Vec<&'static str> {
        self.response.iter().map(|i| i.name()).collect()
    }

    pub(crate) fn apply_request(&self, request: &mut RequestDescriptor) {
        for interceptor in &self.request {
            interceptor.on_request(request);
        }
    }

    pub(crate) fn apply_success(&self, request: &RequestDescriptor, response: &mut RawResponse) {
        for interceptor in &self.response {
            interceptor.on_success(request, response);
        }
    }

    pub(crate) fn apply_failure(&self, request: &RequestDescriptor, error: &ApiError) {
        for interceptor in &self.response {
            interceptor.on_failure(request, error);
        }
    }
}
