use netsync_shared::{Opcode, OPCODE_COUNT};

use super::{DispatchError, ExecutionContext};

/// Opcode-indexed table holding at most one handler per opcode
pub(crate) struct HandlerTable<H> {
    context: ExecutionContext,
    entries: [Option<H>; OPCODE_COUNT],
}

impl<H> HandlerTable<H> {
    pub fn new(context: ExecutionContext) -> Self {
        Self {
            context,
            entries: std::array::from_fn(|_| None),
        }
    }

    pub fn insert(&mut self, opcode: Opcode, handler: H) -> Result<(), DispatchError> {
        let slot = &mut self.entries[opcode.index()];
        if slot.is_some() {
            return Err(DispatchError::DuplicateHandler {
                opcode,
                context: self.context,
            });
        }
        *slot = Some(handler);
        Ok(())
    }

    pub fn remove(&mut self, opcode: Opcode) -> Option<H> {
        self.entries[opcode.index()].take()
    }

    pub fn get(&self, opcode: Opcode) -> Option<&H> {
        self.entries[opcode.index()].as_ref()
    }

    pub fn get_mut(&mut self, opcode: Opcode) -> Option<&mut H> {
        self.entries[opcode.index()].as_mut()
    }

    pub fn contains(&self, opcode: Opcode) -> bool {
        self.entries[opcode.index()].is_some()
    }
}
