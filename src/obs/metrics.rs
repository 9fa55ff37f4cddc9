// self
use crate::obs::{FlowKind, FlowOutcome};

/// Counts one step of a browser flow in `auth_gateway_flow_total`.
///
/// Login, callback, and logout each record an `attempt` on entry and then either `success` or
/// `failure`. A callback that leaves the browser anonymous counts as a failure even though the
/// browser still gets a redirect. Without the `metrics` feature this compiles to nothing.
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"auth_gateway_flow_total",
			"flow" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	let _ = (kind, outcome);
}
