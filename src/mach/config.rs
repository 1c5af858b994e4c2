/// Which events take an automatic savepoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavepointPolicy {
    pub on_message: bool,
    pub on_selection: bool,
    pub on_scene_start: bool,
}

impl Default for SavepointPolicy {
    fn default() -> SavepointPolicy {
        SavepointPolicy {
            on_message: true,
            on_selection: true,
            on_scene_start: true,
        }
    }
}

/// Events reported by the presentation layer that may take a savepoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Message,
    Selection,
    SceneStart,
}

impl SavepointPolicy {
    pub fn allows(&self, trigger: Trigger) -> bool {
        match trigger {
            Trigger::Message => self.on_message,
            Trigger::Selection => self.on_selection,
            Trigger::SceneStart => self.on_scene_start,
        }
    }
}

/// ## Machine configuration

#[derive(Debug, Clone, PartialEq)]
pub struct MachineConfig {
    pub max_call_depth: usize,
    pub savepoint_policy: SavepointPolicy,
}

impl Default for MachineConfig {
    fn default() -> MachineConfig {
        MachineConfig {
            max_call_depth: u16::max_value() as usize,
            savepoint_policy: SavepointPolicy::default(),
        }
    }
}

impl MachineConfig {
    pub fn with_max_call_depth(self, max_call_depth: usize) -> MachineConfig {
        MachineConfig {
            max_call_depth,
            ..self
        }
    }

    pub fn with_savepoint_policy(self, savepoint_policy: SavepointPolicy) -> MachineConfig {
        MachineConfig {
            savepoint_policy,
            ..self
        }
    }
}
