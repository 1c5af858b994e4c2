use super::{
    Arg, ExecutionState, MachineConfig, Module, Savepoint, SavepointManager, Trigger,
};
use crate::error;
use crate::mem::{
    Address, Error, GlobalMemory, IntBank, IntMemRef, LocalMemory, Memory, Scene, StrBank,
};
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::{debug, info};

type Result<T> = std::result::Result<T, Error>;

/// ## Virtual machine context
///
/// Owns memory, execution state, the committed savepoint and the
/// attached opcode modules. Collaborators (bytecode dispatch,
/// presentation, persistence) work through this value; nothing here is
/// reachable through global state.

pub struct Machine {
    config: MachineConfig,
    memory: Memory,
    state: ExecutionState,
    savepoint: SavepointManager,
    modules: BTreeMap<(u8, u8), Rc<dyn Module>>,
    title: String,
}

impl Default for Machine {
    fn default() -> Machine {
        Machine::new(MachineConfig::default())
    }
}

impl Machine {
    pub fn new(config: MachineConfig) -> Machine {
        Machine {
            state: ExecutionState::new(config.max_call_depth),
            config,
            memory: Memory::new(),
            savepoint: SavepointManager::new(),
            modules: BTreeMap::new(),
            title: String::new(),
        }
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    pub fn state(&self) -> &ExecutionState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ExecutionState {
        &mut self.state
    }

    fn location(&self) -> Option<(Scene, Address)> {
        Some((self.state.scene(), self.state.pc()))
    }

    // *** Modules

    pub fn attach_module(&mut self, module: Box<dyn Module>) -> Result<()> {
        let key = (module.module_type(), module.module_id());
        if let Some(existing) = self.modules.get(&key) {
            return Err(error!(DoubleInitialization; &format!(
                "MODULE {} ALREADY ATTACHED AT {}:{}",
                existing.name(),
                key.0,
                key.1
            )));
        }
        info!(name = module.name(), module_type = key.0, module_id = key.1, "module attached");
        self.modules.insert(key, Rc::from(module));
        Ok(())
    }

    pub fn module_name(&self, module_type: u8, module_id: u8) -> Option<&str> {
        self.modules.get(&(module_type, module_id)).map(|m| m.name())
    }

    /// Runs one opcode of an attached module. A value the opcode returns
    /// lands in the store register.
    pub fn call(
        &mut self,
        module_type: u8,
        module_id: u8,
        opcode: u16,
        overload: u8,
        args: &[Arg],
    ) -> Result<()> {
        let module = match self.modules.get(&(module_type, module_id)) {
            Some(module) => Rc::clone(module),
            None => {
                return Err(error!(UnknownOpcode, self.location(); &format!(
                    "NO MODULE AT {}:{}",
                    module_type, module_id
                )))
            }
        };
        if let Some(value) = module.dispatch(self, opcode, overload, args)? {
            self.state.set_store(value);
        }
        Ok(())
    }

    // *** Memory

    pub fn int_value(&self, mem_ref: &IntMemRef) -> Result<i32> {
        self.memory.int_value(mem_ref)
    }

    pub fn set_int_value(&mut self, mem_ref: &IntMemRef, value: i32) -> Result<()> {
        self.memory.set_int_value(mem_ref, value)
    }

    pub fn string_value(&self, bank: StrBank, index: usize) -> Result<&str> {
        self.memory.string_value(bank, index)
    }

    pub fn set_string_value(&mut self, bank: StrBank, index: usize, value: &str) -> Result<()> {
        self.memory.set_string_value(bank, index, value)
    }

    pub fn name(&self, index: usize) -> Result<&str> {
        self.memory.names().name(index)
    }

    pub fn local_name(&self, index: usize) -> Result<&str> {
        self.memory.names().local_name(index)
    }

    /// Marks a kidoku point of the current scene as read.
    pub fn record_kidoku(&mut self, offset: usize) -> Result<()> {
        self.memory.record_kidoku(self.state.scene(), offset)
    }

    pub fn has_been_read(&self, offset: usize) -> bool {
        self.memory.has_been_read(self.state.scene(), offset)
    }

    // *** Execution state

    pub fn halt(&mut self) {
        self.state.halt();
    }

    pub fn halted(&self) -> bool {
        self.state.is_halted()
    }

    pub fn store_register(&self) -> i32 {
        self.state.store()
    }

    pub fn set_store_register(&mut self, value: i32) {
        self.state.set_store(value);
    }

    pub fn jump(&mut self, scene: Scene, pc: Address) {
        self.state.jump(scene, pc);
    }

    pub fn gosub(&mut self, target: Address) -> Result<()> {
        self.state.gosub(target)
    }

    /// Stores integer and string parameters in banks L and K, then
    /// calls `target`.
    pub fn gosub_with(&mut self, target: Address, ints: &[i32], strings: &[&str]) -> Result<()> {
        if ints.len() > IntBank::L.capacity() || strings.len() > StrBank::K.capacity() {
            return Err(error!(IndexOutOfRange, self.location(); "TOO MANY PARAMETERS"));
        }
        self.state.gosub(target)?;
        for (i, value) in ints.iter().enumerate() {
            self.memory
                .set_int_value(&IntMemRef::new(IntBank::L, i), *value)?;
        }
        for (i, value) in strings.iter().enumerate() {
            self.memory.set_string_value(StrBank::K, i, value)?;
        }
        Ok(())
    }

    pub fn farcall(&mut self, scene: Scene, pc: Address) -> Result<()> {
        self.state.farcall(scene, pc)
    }

    pub fn return_from_gosub(&mut self) -> Result<()> {
        self.state.return_from_gosub()
    }

    pub fn return_from_farcall(&mut self) -> Result<()> {
        self.state.return_from_farcall()
    }

    // *** Savepoints

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Title captured by the next savepoint.
    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    pub fn mark_savepoint(&mut self) {
        self.savepoint
            .mark(self.memory.local(), &self.state, &self.title);
    }

    /// Marks a savepoint when the configured policy asks for one.
    pub fn on_savepoint_trigger(&mut self, trigger: Trigger) -> bool {
        if self.config.savepoint_policy.allows(trigger) {
            self.mark_savepoint();
            true
        } else {
            false
        }
    }

    pub fn savepoint(&self) -> &Savepoint {
        self.savepoint.committed()
    }

    /// Replaces global memory wholesale. Used by loading.
    pub fn restore_global(&mut self, global: GlobalMemory) {
        self.memory.replace_global(global);
    }

    /// Makes `savepoint` both the committed and the live state.
    pub fn restore_savepoint(&mut self, savepoint: Savepoint) -> Result<()> {
        self.state
            .restore(savepoint.scene, savepoint.pc, savepoint.frames.clone())?;
        self.memory.replace_local(savepoint.local.clone());
        self.title = savepoint.title.clone();
        self.savepoint.restore(savepoint);
        debug!(
            scene = self.state.scene(),
            pc = self.state.pc(),
            "savepoint restored"
        );
        Ok(())
    }

    // *** Sessions

    /// Clears execution state and both live and committed local memory.
    pub fn reset(&mut self) {
        self.state.reset();
        self.memory.reset_local();
        self.savepoint.reset();
        self.title.clear();
        info!("machine reset");
    }

    /// `reset` plus global memory, names and kidoku.
    pub fn new_session(&mut self) {
        self.reset();
        self.memory.clear_global();
        info!("new session");
    }

    pub fn local_memory(&self) -> &LocalMemory {
        self.memory.local()
    }
}
