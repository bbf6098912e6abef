//! The gateway port: one call operation per protocol generation.
//!
//! A gateway performs the round trip to the control panel, applies
//! [`crate::RESPONSE_SIZE_LIMIT`], decodes the matching envelope, runs it
//! through the unifier, and hands back the opaque payload together with any
//! informational messages as a [`CallOutput`]. Implementations
//! normally finish with [`crate::decode_response`] so every transport agrees
//! on those semantics.
//!
//! Implementations hold their own transport state. This layer imposes no
//! ordering between concurrent calls.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{Args, CallOutput, FunctionName, GatewayError, ModuleName};

/// Transport capability for the three protocol generations.
#[async_trait]
pub trait ApiGateway: Send + Sync {
    /// Calls a UAPI function and returns its `data` payload and messages.
    async fn uapi(
        &self,
        module: &ModuleName,
        function: &FunctionName,
        args: &Args,
    ) -> Result<CallOutput, GatewayError>;

    /// Calls an API2 function and returns its `data` payload.
    async fn api2(
        &self,
        module: &ModuleName,
        function: &FunctionName,
        args: &Args,
    ) -> Result<CallOutput, GatewayError>;

    /// Calls an API1 function with positional arguments.
    ///
    /// Each argument is either `name=value` or a bare `name`; see
    /// [`crate::encode_positional`]. The payload is the `data.result` string
    /// as a JSON string value.
    async fn api1(
        &self,
        module: &ModuleName,
        function: &FunctionName,
        args: &[String],
    ) -> Result<CallOutput, GatewayError>;

    /// Releases transport resources.
    ///
    /// Must succeed when called again after a previous close, and when no
    /// resources were ever acquired.
    async fn close(&self) -> Result<(), GatewayError>;
}

#[async_trait]
impl<G: ApiGateway + ?Sized> ApiGateway for Arc<G> {
    async fn uapi(
        &self,
        module: &ModuleName,
        function: &FunctionName,
        args: &Args,
    ) -> Result<CallOutput, GatewayError> {
        (**self).uapi(module, function, args).await
    }

    async fn api2(
        &self,
        module: &ModuleName,
        function: &FunctionName,
        args: &Args,
    ) -> Result<CallOutput, GatewayError> {
        (**self).api2(module, function, args).await
    }

    async fn api1(
        &self,
        module: &ModuleName,
        function: &FunctionName,
        args: &[String],
    ) -> Result<CallOutput, GatewayError> {
        (**self).api1(module, function, args).await
    }

    async fn close(&self) -> Result<(), GatewayError> {
        (**self).close().await
    }
}

#[async_trait]
impl<G: ApiGateway + ?Sized> ApiGateway for Box<G> {
    async fn uapi(
        &self,
        module: &ModuleName,
        function: &FunctionName,
        args: &Args,
    ) -> Result<CallOutput, GatewayError> {
        (**self).uapi(module, function, args).await
    }

    async fn api2(
        &self,
        module: &ModuleName,
        function: &FunctionName,
        args: &Args,
    ) -> Result<CallOutput, GatewayError> {
        (**self).api2(module, function, args).await
    }

    async fn api1(
        &self,
        module: &ModuleName,
        function: &FunctionName,
        args: &[String],
    ) -> Result<CallOutput, GatewayError> {
        (**self).api1(module, function, args).await
    }

    async fn close(&self) -> Result<(), GatewayError> {
        (**self).close().await
    }
}
