//! Manual/autonomous arbitration.

use tracing::info;

use crate::command::{ControlMode, Direction, RobotCommand};
use crate::link::Link;
use crate::mapper::InputMapper;
use crate::metrics::EngineMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeSwitch {
    /// Target equals the current mode; nothing was sent.
    Unchanged,
    Switched {
        from: ControlMode,
        to: ControlMode,
        /// Directive that was held and stopped by the switch.
        released: Option<Direction>,
    },
    Inactive,
}

#[derive(Debug, Default)]
pub struct ModeController {
    mode: ControlMode,
}

impl ModeController {
    #[must_use]
    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    /// Optimistic: the local mode changes before the robot is told, and a
    /// failed notification does not roll it back.
    pub fn switch_mode(
        &mut self,
        target: ControlMode,
        mapper: &mut InputMapper,
        link: &mut dyn Link,
        metrics: &mut EngineMetrics,
    ) -> ModeSwitch {
        if target == self.mode {
            return ModeSwitch::Unchanged;
        }
        let from = self.mode;
        let released = if target == ControlMode::Manual {
            None
        } else {
            mapper.release(link, metrics)
        };
        self.mode = target;
        metrics.commands_issued += 1;
        link.send_command(RobotCommand::Mode(target));
        info!(%from, to = %target, "control mode switched");
        ModeSwitch::Switched {
            from,
            to: target,
            released,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::testing::RecordingLink;
    use std::time::Duration;

    #[test]
    fn switching_to_current_mode_sends_nothing() {
        let mut modes = ModeController::default();
        let mut mapper = InputMapper::new(Duration::from_millis(100));
        let mut link = RecordingLink::default();
        let mut metrics = EngineMetrics::default();
        assert_eq!(
            modes.switch_mode(ControlMode::Manual, &mut mapper, &mut link, &mut metrics),
            ModeSwitch::Unchanged
        );
        assert!(link.commands.is_empty());
        assert_eq!(metrics.commands_issued, 0);
    }

    #[test]
    fn round_trip_notifies_robot_each_time() {
        let mut modes = ModeController::default();
        let mut mapper = InputMapper::new(Duration::from_millis(100));
        let mut link = RecordingLink::default();
        let mut metrics = EngineMetrics::default();
        modes.switch_mode(ControlMode::Autonomous, &mut mapper, &mut link, &mut metrics);
        assert_eq!(modes.mode(), ControlMode::Autonomous);
        let back = modes.switch_mode(ControlMode::Manual, &mut mapper, &mut link, &mut metrics);
        assert_eq!(
            back,
            ModeSwitch::Switched {
                from: ControlMode::Autonomous,
                to: ControlMode::Manual,
                released: None,
            }
        );
        assert_eq!(
            link.commands,
            vec![
                RobotCommand::Mode(ControlMode::Autonomous),
                RobotCommand::Mode(ControlMode::Manual),
            ]
        );
    }
}
