// self
use crate::{_prelude::*, obs::FlowKind};

/// Future type produced by [`FlowSpan::instrument`]; resolves to a tracing-aware
/// wrapper when the `tracing` feature is enabled and to the bare future otherwise.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// Span handle covering one authenticator operation.
///
/// Always carries the flow kind and call site so `Debug` output stays useful
/// even when the `tracing` feature is off.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	kind: FlowKind,
	stage: &'static str,
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Opens a span for the given flow kind at the named call site.
	pub fn new(kind: FlowKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		let span = tracing::info_span!("reddit_oauth.flow", flow = kind.as_str(), stage);

		Self {
			kind,
			stage,
			#[cfg(feature = "tracing")]
			span,
		}
	}

	/// The flow kind this span covers.
	pub fn kind(&self) -> FlowKind {
		self.kind
	}

	/// The call site this span was opened at.
	pub fn stage(&self) -> &'static str {
		self.stage
	}

	/// Enters the span for a synchronous section; the returned guard must not be
	/// held across an `.await` point.
	pub fn entered(self) -> FlowSpanGuard {
		#[cfg(feature = "tracing")]
		{
			FlowSpanGuard { _guard: self.span.entered() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			FlowSpanGuard {}
		}
	}

	/// Attaches the span to an async section instead of holding a guard.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
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

/// RAII guard returned by [`FlowSpan::entered`].
pub struct FlowSpanGuard {
	#[cfg(feature = "tracing")]
	_guard: tracing::span::EnteredSpan,
}
impl Debug for FlowSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("FlowSpanGuard(..)")
	}
}
