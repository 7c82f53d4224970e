use super::{AsmError, Label};
use std::collections::HashMap;

/// Label table used by the assembler. Names are case-insensitive and may be
/// declared exactly once; the stored [`Label`] keeps the declared spelling.
#[derive(Debug, Default)]
pub struct JumpTable {
    labels: HashMap<String, Label>,
}

impl JumpTable {
    pub fn new() -> JumpTable {
        JumpTable::default()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.labels.contains_key(&name.to_ascii_uppercase())
    }

    pub fn get(&self, name: &str) -> Result<&Label, AsmError> {
        let key = name.to_ascii_uppercase();
        self.labels
            .get(&key)
            .ok_or(AsmError::UnknownSymbol(key))
    }

    pub fn add(&mut self, name: &str, label: Label) -> Result<(), AsmError> {
        let key = name.to_ascii_uppercase();
        if self.labels.contains_key(&key) {
            return Err(AsmError::DuplicateEntry(key));
        }
        self.labels.insert(key, label);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Result<Label, AsmError> {
        let key = name.to_ascii_uppercase();
        self.labels
            .remove(&key)
            .ok_or(AsmError::UnknownRemoval(key))
    }
}
