/*!
## Assembler module

Two-pass assembly of whitespace-separated source into a code segment.

Pass 1 walks the token stream greedily: comments and string-literal lines
consume the rest of their line, literal constants become synthesised PUSH
ops, `@Name` declares a label at the current segment size, `BEGIN` pins the
entry point, known mnemonics become ops, known label names become label
pushes, and anything left becomes a placeholder. Pass 2 rewrites every
placeholder in place once all labels are known, so forward references cost
nothing and the segment indices never shift.

*/

use crate::mach::{
    Address, AsmError, CodeSegment, Hci, JumpTable, Label, Op, Opcode, Val, LOG_EVENT, LOG_INFO,
};

/// The finished product of a successful assembly.
#[derive(Debug)]
pub struct Assembly {
    pub code: CodeSegment,
    pub entry: Address,
}

pub fn assemble(source: &str, io: &mut dyn Hci) -> Result<Assembly, AsmError> {
    let mut code = CodeSegment::new();
    let mut jump_table = JumpTable::new();
    let mut entry: Option<Address> = None;
    let mut scanner = Scanner::new(source);

    io.log("Begin source file parse. Pass 1 of 2.\n", LOG_INFO);
    while let Some(token) = scanner.peek() {
        if token.starts_with(';') {
            let line = scanner.take_line();
            io.log(&format!("Ignored comment: {}\n", line.trim()), LOG_INFO);
            continue;
        }
        if token.starts_with("\"\"") {
            let line = scanner.take_line();
            io.log(
                &format!("Parsed string as PUSH character range: {}\n", line),
                LOG_INFO,
            );
            let chars: Vec<char> = line.chars().skip(2).collect();
            if !chars.is_empty() {
                for &c in &chars {
                    code.add(match c {
                        ' ' => Op::Code(Opcode::Space),
                        '\t' => Op::Code(Opcode::Tab),
                        _ => Op::Literal(Val::Char(c)),
                    });
                }
                code.add(Op::Literal(Val::Int(chars.len() as i32)));
            }
            continue;
        }

        let token = scanner.next_token().expect("peeked token");
        if token.eq_ignore_ascii_case("true") || token.eq_ignore_ascii_case("false") {
            io.log(
                &format!("Parsed token as PUSH boolean literal: {}\n", token),
                LOG_INFO,
            );
            code.add(Op::Literal(Val::Bool(token.eq_ignore_ascii_case("true"))));
        } else if let Ok(i) = token.parse::<i32>() {
            io.log(
                &format!("Parsed token as PUSH integer literal: {}\n", token),
                LOG_INFO,
            );
            code.add(Op::Literal(Val::Int(i)));
        } else if let Some(i) = parse_hex(token) {
            io.log(
                &format!("Parsed token as PUSH integer[hex] literal: {}\n", token),
                LOG_INFO,
            );
            code.add(Op::Literal(Val::Int(i)));
        } else if let Ok(f) = token.parse::<f64>() {
            io.log(
                &format!("Parsed token as PUSH float literal: {}\n", token),
                LOG_INFO,
            );
            code.add(Op::Literal(Val::Float(f)));
        } else if let Some(c) = parse_char(token) {
            io.log(
                &format!("Parsed token as PUSH character literal: {}\n", token),
                LOG_INFO,
            );
            code.add(Op::Literal(Val::Char(c)));
        } else if let Some(name) = label_declaration(token) {
            io.log(
                &format!("Parsed token as DECLARE label: {}\n", token),
                LOG_INFO,
            );
            if is_reserved(name) || Opcode::exists(name) {
                return Err(AsmError::NameDisallowed(name.to_string()));
            }
            if jump_table.exists(name) {
                return Err(AsmError::DuplicateLabel(name.to_string()));
            }
            jump_table.add(name, Label::new(name, code.len()))?;
        } else if token.eq_ignore_ascii_case("BEGIN") {
            io.log(
                &format!("Parsed token as ENTRY POINT: {}\n", token),
                LOG_INFO,
            );
            if entry.is_some() {
                return Err(AsmError::DuplicateBegin);
            }
            entry = Some(code.len());
        } else if let Some(op) = Opcode::lookup(token) {
            io.log(
                &format!("Parsed token as INSTRUCTION: {}\n", token),
                LOG_INFO,
            );
            code.add(Op::Code(op));
        } else if jump_table.exists(token) {
            io.log(
                &format!("Parsed token as PUSH label reference: {}\n", token),
                LOG_INFO,
            );
            let label = jump_table.get(token)?.clone();
            code.add(Op::Literal(Val::Label(label)));
        } else {
            io.log(
                &format!("Marked token for second pass: {}\n", token),
                LOG_INFO,
            );
            code.add(Op::Placeholder(token.into()));
        }
    }

    let entry = match entry {
        Some(e) if e < code.len() => e,
        _ => return Err(AsmError::BadBegin),
    };

    io.log("Source file parse. Pass 2 of 2.\n", LOG_INFO);
    for index in 0..code.len() {
        let name = match code.get(index) {
            Ok(Op::Placeholder(name)) => name.clone(),
            _ => continue,
        };
        io.log(&format!("Resolving label reference: {}\n", name), LOG_INFO);
        let label = jump_table.get(&name)?.clone();
        code.replace(index, Op::Literal(Val::Label(label)))?;
    }

    io.log("Assembly completed successfully.\n", LOG_EVENT);
    Ok(Assembly { code, entry })
}

fn is_reserved(name: &str) -> bool {
    name.eq_ignore_ascii_case("begin")
        || name.eq_ignore_ascii_case("true")
        || name.eq_ignore_ascii_case("false")
}

/// `(0x)?[0-9A-Fa-f]{1,8}` parsed as unsigned base-16.
fn parse_hex(token: &str) -> Option<i32> {
    let digits = token.strip_prefix("0x").unwrap_or(token);
    if digits.is_empty() || digits.len() > 8 {
        return None;
    }
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(digits, 16).ok().map(|i| i as i32)
}

/// `'x'` with exactly one character between the quotes. A space can never
/// appear here since tokens cannot contain whitespace; programs use the
/// SPACE, TAB, and NEWLINE instructions for those.
fn parse_char(token: &str) -> Option<char> {
    let mut chars = token.chars();
    match (chars.next(), chars.next(), chars.next(), chars.next()) {
        (Some('\''), Some(c), Some('\''), None) => Some(c),
        _ => None,
    }
}

/// `@` followed by `[A-Za-z_][A-Za-z0-9_]*`; returns the bare name.
fn label_declaration(token: &str) -> Option<&str> {
    let name = token.strip_prefix('@')?;
    let mut chars = name.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() && first != '_' {
        return None;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    Some(name)
}

/// Whitespace-delimited token cursor over the source text. Line-oriented
/// forms (comments and string literals) slice from the pending token through
/// the end of its line.
struct Scanner<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(source: &'a str) -> Scanner<'a> {
        Scanner { source, pos: 0 }
    }

    fn token_bounds(&self) -> Option<(usize, usize)> {
        let bytes = self.source.as_bytes();
        let mut start = self.pos;
        while start < bytes.len() && bytes[start].is_ascii_whitespace() {
            start += 1;
        }
        if start >= bytes.len() {
            return None;
        }
        let mut end = start;
        while end < bytes.len() && !bytes[end].is_ascii_whitespace() {
            end += 1;
        }
        Some((start, end))
    }

    fn peek(&self) -> Option<&'a str> {
        self.token_bounds()
            .map(|(start, end)| &self.source[start..end])
    }

    fn next_token(&mut self) -> Option<&'a str> {
        let (start, end) = self.token_bounds()?;
        self.pos = end;
        Some(&self.source[start..end])
    }

    /// Consumes from the start of the pending token through the end of that
    /// line, newline included; returns the consumed text without it.
    fn take_line(&mut self) -> &'a str {
        let start = match self.token_bounds() {
            Some((start, _)) => start,
            None => {
                self.pos = self.source.len();
                return "";
            }
        };
        let end = self.source[start..]
            .find('\n')
            .map(|i| start + i)
            .unwrap_or(self.source.len());
        self.pos = (end + 1).min(self.source.len());
        let line = &self.source[start..end];
        line.strip_suffix('\r').unwrap_or(line)
    }
}
