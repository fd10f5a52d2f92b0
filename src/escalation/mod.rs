pub mod advisory;
pub mod pipeline;

pub use advisory::{Advice, AdviceSource, AdvisoryClient};
pub use pipeline::{EscalationContext, EscalationOutcome, EscalationPipeline};
