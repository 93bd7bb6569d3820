// self
use crate::obs::{OperationKind, OperationOutcome};

/// Records an operation outcome via the global metrics recorder (when enabled).
pub fn record_outcome(kind: OperationKind, outcome: OperationOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"tiku_client_operation_total",
			"operation" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}
