use std::future::Future;

use crate::error::{ApiError, ApiResult};

/// Try `candidates` in order, returning the first result that is not a
/// "try the next one" failure.
///
/// A success or any failure rejected by `try_next` ends the search. When
/// every candidate is skipped the call fails with
/// [`ApiError::RouteMismatch`] naming `operation` and the paths tried,
/// never with the last skipped failure.
pub async fn first_that_works<T, F, Fut, P>(
    operation: &str,
    candidates: &[&str],
    mut attempt: F,
    try_next: P,
) -> ApiResult<T>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = ApiResult<T>>,
    P: Fn(&ApiError) -> bool,
{
    let mut tried = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        match attempt(candidate.to_string()).await {
            Ok(value) => return Ok(value),
            Err(e) if try_next(&e) => {
                tracing::debug!("{}: {} skipped ({})", operation, candidate, e);
                tried.push(candidate.to_string());
            }
            Err(e) => return Err(e),
        }
    }
    Err(ApiError::route_mismatch(operation, tried))
}

/// Default skip predicate: the route is not mounted (404/405).
pub fn is_routing_failure(error: &ApiError) -> bool {
    error.is_route_mismatch()
}
