//! Production stage state machine.
//!
//! | from        | allowed actions          |
//! |-------------|--------------------------|
//! | pending     | start                    |
//! | started     | pause, resume, complete  |
//! | in_progress | pause, complete          |
//! | paused      | resume, complete         |
//! | completed   |                          |
//! | cancelled   |                          |

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use crate::errors::ServiceError;

use super::ProductionStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr, EnumString, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StageStatus {
    Pending,
    Started,
    InProgress,
    Paused,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr, EnumString, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StageAction {
    Start,
    Pause,
    Resume,
    Complete,
}

impl StageAction {
    pub fn target(self) -> StageStatus {
        match self {
            StageAction::Start => StageStatus::Started,
            StageAction::Pause => StageStatus::Paused,
            StageAction::Resume => StageStatus::InProgress,
            StageAction::Complete => StageStatus::Completed,
        }
    }

    /// Event type written to the stage log.
    pub fn log_event(self) -> &'static str {
        match self {
            StageAction::Start => "started",
            StageAction::Pause => "paused",
            StageAction::Resume => "resumed",
            StageAction::Complete => "completed",
        }
    }
}

impl StageStatus {
    pub fn allowed_actions(self) -> &'static [StageAction] {
        match self {
            StageStatus::Pending => &[StageAction::Start],
            StageStatus::Started => &[StageAction::Pause, StageAction::Resume, StageAction::Complete],
            StageStatus::InProgress => &[StageAction::Pause, StageAction::Complete],
            StageStatus::Paused => &[StageAction::Resume, StageAction::Complete],
            StageStatus::Completed | StageStatus::Cancelled => &[],
        }
    }

    /// Resolves the status after `action`, or rejects the transition.
    pub fn apply(self, action: StageAction) -> Result<StageStatus, ServiceError> {
        if self.allowed_actions().contains(&action) {
            Ok(action.target())
        } else {
            Err(ServiceError::InvalidOperation(format!(
                "Action {} is not allowed in status {}",
                action, self
            )))
        }
    }
}

/// Production status after a stage starts or completes.
///
/// All stages completed finishes the work order; otherwise a freshly
/// `started` order moves to `in_progress`. Returns `None` when nothing changes.
pub fn production_status_after(
    current: ProductionStatus,
    total_stages: usize,
    completed_stages: usize,
) -> Option<ProductionStatus> {
    if total_stages > 0 && total_stages == completed_stages {
        Some(ProductionStatus::Completed)
    } else if current == ProductionStatus::Started {
        Some(ProductionStatus::InProgress)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;

    #[rstest]
    #[case(StageStatus::Pending, StageAction::Start, StageStatus::Started)]
    #[case(StageStatus::Started, StageAction::Pause, StageStatus::Paused)]
    #[case(StageStatus::Started, StageAction::Resume, StageStatus::InProgress)]
    #[case(StageStatus::Started, StageAction::Complete, StageStatus::Completed)]
    #[case(StageStatus::InProgress, StageAction::Pause, StageStatus::Paused)]
    #[case(StageStatus::Paused, StageAction::Resume, StageStatus::InProgress)]
    #[case(StageStatus::Paused, StageAction::Complete, StageStatus::Completed)]
    fn allowed_transitions(#[case] from: StageStatus, #[case] action: StageAction, #[case] to: StageStatus) {
        assert_eq!(from.apply(action).unwrap(), to);
    }

    #[rstest]
    #[case(StageStatus::Pending, StageAction::Complete)]
    #[case(StageStatus::Pending, StageAction::Pause)]
    #[case(StageStatus::InProgress, StageAction::Start)]
    #[case(StageStatus::InProgress, StageAction::Resume)]
    #[case(StageStatus::Paused, StageAction::Pause)]
    #[case(StageStatus::Completed, StageAction::Start)]
    #[case(StageStatus::Cancelled, StageAction::Resume)]
    fn rejected_transitions(#[case] from: StageStatus, #[case] action: StageAction) {
        assert_matches!(from.apply(action), Err(ServiceError::InvalidOperation(_)));
    }

    #[test]
    fn log_events_are_past_tense() {
        assert_eq!(StageAction::Resume.log_event(), "resumed");
        assert_eq!(StageAction::Pause.log_event(), "paused");
    }

    #[test]
    fn production_follows_stages() {
        assert_eq!(
            production_status_after(ProductionStatus::InProgress, 3, 3),
            Some(ProductionStatus::Completed)
        );
        assert_eq!(
            production_status_after(ProductionStatus::Started, 3, 1),
            Some(ProductionStatus::InProgress)
        );
        assert_eq!(production_status_after(ProductionStatus::InProgress, 3, 1), None);
        assert_eq!(
            production_status_after(ProductionStatus::Started, 0, 0),
            Some(ProductionStatus::InProgress)
        );
    }
}
