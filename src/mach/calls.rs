use super::{Address, VmError};

const MAX_DEPTH: usize = 512;

/// Stack of saved instruction pointers for CALL/RETURN. Bounded so runaway
/// recursion surfaces as a clean runtime error.
#[derive(Debug, Default)]
pub struct CallStack {
    frames: Vec<Address>,
}

impl CallStack {
    pub fn new() -> CallStack {
        CallStack::default()
    }

    pub fn push(&mut self, pointer: Address) -> Result<(), VmError> {
        if self.frames.len() >= MAX_DEPTH {
            return Err(VmError::CallOverflow);
        }
        self.frames.push(pointer);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<Address, VmError> {
        self.frames.pop().ok_or(VmError::CallUnderflow)
    }
}
