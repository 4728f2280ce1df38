use async_trait::async_trait;
use std::future::Future;

use crate::errors::HandlerError;
use crate::protocol::UserInfo;
use crate::server::request::Request;

/// Resolves the user behind a bearer token
#[async_trait]
pub trait UserInfoProvider: Send + Sync + 'static {
    async fn user_info(&self, request: &Request) -> Result<UserInfo, HandlerError>;
}

/// Adapter turning a closure into a [`UserInfoProvider`]
///
/// The closure receives an owned copy of the request so the returned future
/// does not borrow from it.
pub struct UserInfoFn<F>(pub F);

#[async_trait]
impl<F, Fut> UserInfoProvider for UserInfoFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<UserInfo, HandlerError>> + Send + 'static,
{
    async fn user_info(&self, request: &Request) -> Result<UserInfo, HandlerError> {
        (self.0)(request.clone()).await
    }
}
