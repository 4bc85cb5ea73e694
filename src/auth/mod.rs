//! Caller authentication
//!
//! Every engine operation is authorized against the identity of its caller.
//! Over HTTP that identity is the `sub` claim of a signed bearer token.

mod jwt;
mod middleware;

pub use jwt::{Claims, TokenKeys};
pub use middleware::caller_middleware;

use crate::voting::Identity;

/// Authenticated caller, inserted into request extensions by [`caller_middleware`]
#[derive(Debug, Clone)]
pub struct Caller(pub Identity);

impl Caller {
    pub fn identity(&self) -> &Identity {
        &self.0
    }
}
