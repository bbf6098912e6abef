//! The [`Api`] facade: one entry type bound to one gateway.
//!
//! The facade holds no protocol logic. It validates call names, forwards to
//! the gateway, and decodes the returned payload into the caller's type.
//! UAPI calls can also hand back the informational messages through
//! [`Api::uapi_with_messages`].

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, debug_span, Instrument};

use crate::{
    ApiGateway, Args, CallOutput, FunctionName, GatewayError, ModuleName, ProtocolGeneration,
};

/// A decoded payload together with the messages the server attached to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Response<T> {
    /// The payload decoded into the caller's type.
    pub data: T,
    /// Informational messages joined with `\n`, if the server sent any.
    pub messages: Option<String>,
}

/// Uniform call surface over an [`ApiGateway`].
pub struct Api {
    gateway: Option<Box<dyn ApiGateway>>,
}

impl Api {
    /// Binds the facade to a gateway.
    pub fn new<G: ApiGateway + 'static>(gateway: G) -> Self {
        Self {
            gateway: Some(Box::new(gateway)),
        }
    }

    /// A facade with no gateway. Calls fail with [`GatewayError::Closed`];
    /// [`Api::close`] succeeds.
    pub fn detached() -> Self {
        Self { gateway: None }
    }

    /// Returns the bound gateway, if any.
    pub fn gateway(&self) -> Option<&dyn ApiGateway> {
        self.gateway.as_deref()
    }

    /// Calls a UAPI function and decodes its payload into `T`.
    ///
    /// Messages are dropped; use [`Api::uapi_with_messages`] to keep them.
    pub async fn uapi<T: DeserializeOwned>(
        &self,
        module: &str,
        function: &str,
        args: &Args,
    ) -> Result<T, GatewayError> {
        self.uapi_with_messages(module, function, args)
            .await
            .map(|response| response.data)
    }

    /// Calls a UAPI function and returns the decoded payload with its messages.
    ///
    /// On a remote failure the messages travel inside the error; see
    /// [`GatewayError::remote_messages`].
    pub async fn uapi_with_messages<T: DeserializeOwned>(
        &self,
        module: &str,
        function: &str,
        args: &Args,
    ) -> Result<Response<T>, GatewayError> {
        let (module, function) = call_target(module, function)?;
        let gateway = self.bound()?;
        let span = call_span(ProtocolGeneration::Uapi, &module, &function);
        let CallOutput { payload, messages } = gateway
            .uapi(&module, &function, args)
            .instrument(span)
            .await?;
        Ok(Response {
            data: decode_payload(payload)?,
            messages,
        })
    }

    /// Calls an API2 function and decodes its payload into `T`.
    pub async fn api2<T: DeserializeOwned>(
        &self,
        module: &str,
        function: &str,
        args: &Args,
    ) -> Result<T, GatewayError> {
        let (module, function) = call_target(module, function)?;
        let gateway = self.bound()?;
        let span = call_span(ProtocolGeneration::Api2, &module, &function);
        let output = gateway
            .api2(&module, &function, args)
            .instrument(span)
            .await?;
        decode_payload(output.payload)
    }

    /// Calls an API1 function with positional arguments and decodes the
    /// `data.result` string into `T` (usually `String`).
    pub async fn api1<T, S>(
        &self,
        module: &str,
        function: &str,
        args: &[S],
    ) -> Result<T, GatewayError>
    where
        T: DeserializeOwned,
        S: AsRef<str>,
    {
        let (module, function) = call_target(module, function)?;
        let gateway = self.bound()?;
        let args: Vec<String> = args.iter().map(|a| a.as_ref().to_owned()).collect();
        let span = call_span(ProtocolGeneration::Api1, &module, &function);
        let output = gateway
            .api1(&module, &function, &args)
            .instrument(span)
            .await?;
        decode_payload(output.payload)
    }

    /// Releases the gateway. Succeeds trivially when there is none.
    pub async fn close(&self) -> Result<(), GatewayError> {
        match &self.gateway {
            Some(gateway) => gateway.close().await,
            None => Ok(()),
        }
    }

    fn bound(&self) -> Result<&dyn ApiGateway, GatewayError> {
        self.gateway().ok_or(GatewayError::Closed)
    }
}

impl std::fmt::Debug for Api {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Api")
            .field("gateway", &self.gateway.is_some())
            .finish()
    }
}

fn call_target(module: &str, function: &str) -> Result<(ModuleName, FunctionName), GatewayError> {
    let module = ModuleName::new(module).ok_or_else(|| GatewayError::InvalidCall {
        message: "module name is empty".to_owned(),
    })?;
    let function = FunctionName::new(function).ok_or_else(|| GatewayError::InvalidCall {
        message: format!("function name is empty (module {module})"),
    })?;
    Ok((module, function))
}

fn call_span(
    generation: ProtocolGeneration,
    module: &ModuleName,
    function: &FunctionName,
) -> tracing::Span {
    debug_span!(
        "panel_call",
        %generation,
        module = module.as_str(),
        function = function.as_str()
    )
}

fn decode_payload<T: DeserializeOwned>(payload: Value) -> Result<T, GatewayError> {
    serde_json::from_value(payload).map_err(|err| {
        debug!(error = %err, "payload did not match the requested type");
        GatewayError::from(err)
    })
}
