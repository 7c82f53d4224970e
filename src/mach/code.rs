use super::{AsmError, Op, VmError};

/// ## Code segment
///
/// Random-access list of assembled ops. Supports appending and in-place
/// replacement but never insertion or removal: pass 2 must be able to
/// rewrite placeholders without shifting the indices labels point at.
#[derive(Debug, Default)]
pub struct CodeSegment {
    ops: Vec<Op>,
}

impl CodeSegment {
    pub fn new() -> CodeSegment {
        CodeSegment::default()
    }

    pub fn get(&self, pointer: usize) -> Result<&Op, VmError> {
        self.ops.get(pointer).ok_or(VmError::IpOutOfBounds)
    }

    pub fn add(&mut self, op: Op) {
        self.ops.push(op);
    }

    pub fn replace(&mut self, pointer: usize, op: Op) -> Result<(), AsmError> {
        match self.ops.get_mut(pointer) {
            Some(slot) => {
                *slot = op;
                Ok(())
            }
            None => Err(AsmError::ReplaceOutOfBounds(pointer)),
        }
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}
