// self
use crate::{_prelude::*, obs::OperationKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedOperation<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedOperation<F> = F;

/// A span builder used around client operations.
#[derive(Clone, Debug)]
pub struct OperationSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OperationSpan {
	/// Creates a new span tagged with the provided operation kind + stage.
	pub fn new(kind: OperationKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("tiku_client.operation", operation = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedOperation<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a `warn` event describing a failed operation (when tracing is enabled).
pub fn log_failure(kind: OperationKind, error: &dyn Display) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(operation = kind.as_str(), error = %error, "operation failed");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, error);
	}
}

/// Emits a `debug` event for notable non-failure transitions (when tracing is enabled).
pub fn log_event(kind: OperationKind, message: &'static str) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(operation = kind.as_str(), message);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, message);
	}
}

/// Emits an `info` event when the host is asked to authenticate again (when tracing is enabled).
pub fn log_reauth(reason: &'static str, path: &str) {
	#[cfg(feature = "tracing")]
	{
		tracing::info!(reason, path, "re-authentication required");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (reason, path);
	}
}
