use super::Address;
use std::rc::Rc;

/// ## Runtime stack values
///
/// Everything a program can put on the data stack. Values carry their tag;
/// the typed pops in [`super::DataStack`] are the only place tags are
/// checked, so individual instructions never inspect them directly.

#[derive(Debug, Clone, PartialEq)]
pub enum Val {
    Bool(bool),
    Char(char),
    Int(i32),
    Float(f64),
    Label(Label),
}

/// A resolved label: the declared name and the code-segment index it marks.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    name: Rc<str>,
    pointer: Address,
}

impl Label {
    pub fn new(name: &str, pointer: Address) -> Label {
        Label {
            name: name.into(),
            pointer,
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn pointer(&self) -> Address {
        self.pointer
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}{{{}}}", self.name, self.pointer)
    }
}

impl Val {
    /// Rendering used by `TOSTRING` and the PUSH display name: chars are
    /// wrapped in single quotes, everything else prints naturally.
    pub fn quoted(&self) -> String {
        match self {
            Val::Char(c) => format!("'{}'", c),
            other => other.to_string(),
        }
    }
}

impl std::fmt::Display for Val {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Val::*;
        match self {
            Bool(b) => write!(f, "{}", b),
            Char(c) => write!(f, "{}", c),
            Int(n) => write!(f, "{}", n),
            Float(n) => write!(f, "{}", n),
            Label(l) => write!(f, "{}", l),
        }
    }
}
