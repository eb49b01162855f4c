//! Link health checking: structural extraction plus concurrent HEAD probes.

mod extract;
mod probe;

pub use extract::{extract_link_targets, probe_targets};
pub use probe::{LinkChecker, LinkFailure, LinkStatus};
