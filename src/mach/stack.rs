use super::{Val, VmError};

type Result<T> = std::result::Result<T, VmError>;

const MAX_DEPTH: usize = 32768;

/// ## Data stack
///
/// Bounded stack of [`Val`] holding all program data. The top of stack is
/// the end of the vector. Stack ranges are a convention, not a type: a run
/// of values capped by an `Int` count on top. Every range consumer pops the
/// count first and re-checks the payload underneath it, which is the only
/// thing keeping ranges well-formed across JOIN, SPLIT, and arbitrary moves.
#[derive(Debug, Default)]
pub struct DataStack {
    items: Vec<Val>,
}

impl DataStack {
    pub fn new() -> DataStack {
        DataStack::default()
    }

    fn underflow_check(&self, needed: usize) -> Result<()> {
        if self.items.len() < needed {
            Err(VmError::Underflow)
        } else {
            Ok(())
        }
    }

    pub fn vec(&self) -> &Vec<Val> {
        &self.items
    }

    pub fn depth(&self) -> usize {
        self.items.len()
    }

    pub fn push(&mut self, val: Val) -> Result<()> {
        if self.items.len() >= MAX_DEPTH {
            return Err(VmError::Overflow);
        }
        self.items.push(val);
        Ok(())
    }

    /// Pushes each char of `range` in order, then the length.
    pub fn push_char_range(&mut self, range: &str) -> Result<()> {
        for c in range.chars() {
            self.push(Val::Char(c))?;
        }
        self.push(Val::Int(range.chars().count() as i32))
    }

    pub fn pop(&mut self) -> Result<Val> {
        self.items.pop().ok_or(VmError::Underflow)
    }

    pub fn pop_bool(&mut self) -> Result<bool> {
        match self.pop()? {
            Val::Bool(b) => Ok(b),
            _ => Err(VmError::WrongType("BOOL")),
        }
    }

    pub fn pop_char(&mut self) -> Result<char> {
        match self.pop()? {
            Val::Char(c) => Ok(c),
            _ => Err(VmError::WrongType("CHAR")),
        }
    }

    pub fn pop_int(&mut self) -> Result<i32> {
        match self.pop()? {
            Val::Int(i) => Ok(i),
            _ => Err(VmError::WrongType("INT")),
        }
    }

    pub fn pop_float(&mut self) -> Result<f64> {
        match self.pop()? {
            Val::Float(f) => Ok(f),
            _ => Err(VmError::WrongType("FLOAT")),
        }
    }

    pub fn pop_label(&mut self) -> Result<super::Label> {
        match self.pop()? {
            Val::Label(l) => Ok(l),
            _ => Err(VmError::WrongType("LABEL")),
        }
    }

    /// Pops an `Int` count (must be >= 1), then that many chars, returning
    /// them in original left-to-right order.
    pub fn pop_char_range(&mut self) -> Result<String> {
        let size = self.pop_int()?;
        if size < 1 {
            return Err(VmError::RangeEmpty);
        }
        let mut chars = Vec::with_capacity(size as usize);
        for _ in 0..size {
            chars.push(self.pop_char()?);
        }
        Ok(chars.into_iter().rev().collect())
    }

    pub fn dup(&mut self) -> Result<()> {
        self.underflow_check(1)?;
        let top = self.items[self.items.len() - 1].clone();
        self.push(top)
    }

    pub fn swap(&mut self) -> Result<()> {
        self.underflow_check(2)?;
        let len = self.items.len();
        self.items.swap(len - 1, len - 2);
        Ok(())
    }

    /// Rotates the top `count` items. Clockwise moves the top item down to
    /// position `count`; counterclockwise lifts the item at position `count`
    /// to the top.
    pub fn rotate(&mut self, count: usize, clockwise: bool) -> Result<()> {
        if count == 0 {
            return Err(VmError::RotateZero);
        }
        self.underflow_check(count)?;
        let len = self.items.len();
        if clockwise {
            let top = self.items.pop().ok_or(VmError::Underflow)?;
            self.items.insert(len - count, top);
        } else {
            let nth = self.items[len - count].clone();
            self.items.push(nth);
            self.items.remove(len - count);
        }
        Ok(())
    }

    /// Pushes a copy of the item `index` from the top (1 = top).
    pub fn pick(&mut self, index: i32) -> Result<()> {
        if index < 1 {
            return Err(VmError::PickIndex);
        }
        self.underflow_check(index as usize)?;
        let val = self.items[self.items.len() - index as usize].clone();
        self.push(val)
    }

    /// Replaces the item `index` from the top (1 = top) with `val`.
    pub fn put(&mut self, val: Val, index: i32) -> Result<()> {
        if index < 1 {
            return Err(VmError::PutIndex);
        }
        self.underflow_check(index as usize)?;
        let len = self.items.len();
        self.items[len - index as usize] = val;
        Ok(())
    }

    /// Joins the two topmost stack ranges into one by removing the inner
    /// count. Either range may be empty. For char ranges this is string
    /// concatenation.
    pub fn join(&mut self) -> Result<()> {
        let size1 = self.pop_int()?;
        if size1 < 0 {
            return Err(VmError::RangeNegative);
        }
        self.underflow_check(size1 as usize + 1)?;
        let inner = self.items.len() - 1 - size1 as usize;
        let size2 = match self.items[inner] {
            Val::Int(i) => i,
            _ => return Err(VmError::WrongType("INT")),
        };
        if size2 < 0 {
            return Err(VmError::RangeNegative);
        }
        self.underflow_check(size1 as usize + size2 as usize + 1)?;
        self.items.remove(inner);
        self.push(Val::Int(size1 + size2))
    }

    /// Splits the topmost range at `index`, leaving two consecutive ranges
    /// of `index` (deeper) and `size - index` (on top) items.
    pub fn split(&mut self, index: i32) -> Result<()> {
        let size = self.pop_int()?;
        if size < 1 {
            return Err(VmError::SplitEmpty);
        }
        self.underflow_check(size as usize)?;
        if index < 0 || index >= size {
            return Err(VmError::SplitIndex(size - 1));
        }
        let size_right = size - index;
        let at = self.items.len() - size_right as usize;
        self.items.insert(at, Val::Int(index));
        self.push(Val::Int(size_right))
    }
}

/// Bottom-to-top rendering for the stack-trace debugger. Whitespace chars
/// print as their instruction names so the trace stays one line per tick.
impl std::fmt::Display for DataStack {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "( ")?;
        for (index, val) in self.items.iter().enumerate() {
            match val {
                Val::Char(' ') => write!(f, "SPACE")?,
                Val::Char('\t') => write!(f, "TAB")?,
                Val::Char('\n') => write!(f, "NEWLINE")?,
                Val::Char(c) => write!(f, "'{}'", c)?,
                other => write!(f, "{}", other)?,
            }
            if index + 1 < self.items.len() {
                write!(f, ", ")?;
            }
        }
        write!(f, " )")
    }
}
