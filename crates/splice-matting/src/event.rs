//! Lifecycle notifications

use std::fmt;

/// Something the controller did that a viewer may want to redraw for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MattingEvent {
    /// A correction stroke was accepted and its refinement started
    CorrectionApplied,
    /// The whole rough object is being pasted without refinement
    FullObjectTransfer,
    /// The pasted object was moved to a new offset
    ObjectRepositioned,
    /// A refinement finished and the composite is up to date
    RefinementSettled,
}

impl fmt::Display for MattingEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MattingEvent::CorrectionApplied => "correction applied",
            MattingEvent::FullObjectTransfer => "full object transfer",
            MattingEvent::ObjectRepositioned => "object repositioned",
            MattingEvent::RefinementSettled => "refinement settled",
        };
        f.write_str(name)
    }
}
