use super::Stack;
use crate::error;
use crate::mem::{Address, Error, Scene};
use serde::{Deserialize, Serialize};

type Result<T> = std::result::Result<T, Error>;

/// ## Call stack frame
///
/// `Gosub` returns within the current scene; `Farcall` returns to
/// another scene. A return must match the kind of the top frame.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frame {
    Gosub { pc: Address },
    Farcall { scene: Scene, pc: Address },
}

/// ## Execution state
///
/// Program counter, current scene, halt flag, the store register and
/// the call stack.

#[derive(Debug, Clone)]
pub struct ExecutionState {
    scene: Scene,
    pc: Address,
    halted: bool,
    store: i32,
    frames: Stack<Frame>,
}

impl ExecutionState {
    pub fn new(max_call_depth: usize) -> ExecutionState {
        ExecutionState {
            scene: 0,
            pc: 0,
            halted: false,
            store: 0,
            frames: Stack::new(max_call_depth),
        }
    }

    pub fn reset(&mut self) {
        self.scene = 0;
        self.pc = 0;
        self.halted = false;
        self.store = 0;
        self.frames.clear();
    }

    pub fn halt(&mut self) {
        self.halted = true;
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn scene(&self) -> Scene {
        self.scene
    }

    pub fn pc(&self) -> Address {
        self.pc
    }

    pub fn set_pc(&mut self, pc: Address) {
        self.pc = pc;
    }

    pub fn jump(&mut self, scene: Scene, pc: Address) {
        self.scene = scene;
        self.pc = pc;
    }

    pub fn store(&self) -> i32 {
        self.store
    }

    pub fn set_store(&mut self, value: i32) {
        self.store = value;
    }

    pub fn frames(&self) -> &[Frame] {
        self.frames.as_slice()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Restores a resume point and call stack captured earlier.
    pub fn restore(&mut self, scene: Scene, pc: Address, frames: Vec<Frame>) -> Result<()> {
        self.frames.replace(frames)?;
        self.scene = scene;
        self.pc = pc;
        self.halted = false;
        self.store = 0;
        Ok(())
    }

    pub fn push_subroutine_frame(&mut self, return_pc: Address) -> Result<()> {
        self.frames.push(Frame::Gosub { pc: return_pc })
    }

    pub fn push_far_frame(&mut self, return_scene: Scene, return_pc: Address) -> Result<()> {
        self.frames.push(Frame::Farcall {
            scene: return_scene,
            pc: return_pc,
        })
    }

    pub fn pop_subroutine_frame(&mut self) -> Result<Address> {
        match self.frames.pop_if(|f| matches!(f, Frame::Gosub { .. })) {
            Some(Frame::Gosub { pc }) => Ok(pc),
            _ => Err(self.mismatch("RETURN WITHOUT GOSUB")),
        }
    }

    pub fn pop_far_frame(&mut self) -> Result<(Scene, Address)> {
        match self.frames.pop_if(|f| matches!(f, Frame::Farcall { .. })) {
            Some(Frame::Farcall { scene, pc }) => Ok((scene, pc)),
            _ => Err(self.mismatch("RETURN WITHOUT FARCALL")),
        }
    }

    fn mismatch(&self, message: &str) -> Error {
        let message = match self.frames.last() {
            None => format!("{}; STACK EMPTY", message),
            Some(top) => format!("{}; TOP IS {:?}", message, top),
        };
        error!(CallStackMismatch, Some((self.scene, self.pc)); &message)
    }

    /// Calls `target` in the current scene, returning to the current pc.
    pub fn gosub(&mut self, target: Address) -> Result<()> {
        self.push_subroutine_frame(self.pc)?;
        self.pc = target;
        Ok(())
    }

    /// Calls into another scene, returning to the current scene and pc.
    pub fn farcall(&mut self, scene: Scene, pc: Address) -> Result<()> {
        self.push_far_frame(self.scene, self.pc)?;
        self.jump(scene, pc);
        Ok(())
    }

    pub fn return_from_gosub(&mut self) -> Result<()> {
        self.pc = self.pop_subroutine_frame()?;
        Ok(())
    }

    pub fn return_from_farcall(&mut self) -> Result<()> {
        let (scene, pc) = self.pop_far_frame()?;
        self.jump(scene, pc);
        Ok(())
    }
}
