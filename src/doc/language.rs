/*!
## Language Reference

### Source form

Programs are streams of whitespace-separated tokens. Layout carries no
meaning except for the two line-oriented forms:

```text
; everything after a semicolon token is a comment to end of line
""everything after the two quotes is pushed as a character range
```

The string shorthand pushes one char per character (spaces and tabs become
the `SPACE` and `TAB` instructions) followed by the length, producing a
*character range*: the machine's string convention of `c1 .. cn n` on the
stack. All string-consuming instructions pop the count first.

### Literals

| Form | Pushes |
|------|--------|
| `true` / `false` | BOOL (case-insensitive) |
| `42`, `-7` | INT (32-bit, two's complement) |
| `0x1F`, `cafe` | INT parsed as unsigned hexadecimal (1-8 digits) |
| `2.5`, `1e-3` | FLOAT (IEEE 754 double) |
| `'x'` | CHAR (use `SPACE`/`TAB`/`NEWLINE` for whitespace) |

### Labels and control

`@Here` declares `Here` as the current position; a later (or earlier) bare
`Here` pushes it as a LABEL value for `JUMP`, `CJUMP`, and `CALL`. Label
names are case-insensitive, may be declared once, and may not collide with
an instruction mnemonic or the reserved words `BEGIN`, `TRUE`, `FALSE`.
Exactly one `BEGIN` marks the entry point.

```text
; countdown from 5
BEGIN
5
@Loop
DUP PRINT SPACE PRINT
1 ISUB
DUP 0 IGREATER
Loop CJUMP
NEWLINE PRINT
0 EXIT
```

### Instruction set

Stack effects use `( before -- after )`, top of stack on the right.

- **Stack**: `POP` `POPN` `DUP` `DUPN` `SWAP` `ROTATE` `PICK` `PUT` `DEPTH`
  `JOIN` `SPLIT`
- **Control**: `EXIT` `ABORT` `JUMP` `CJUMP` `CALL` `RETURN` `SLEEP`
  `EXECUTE` — `EXECUTE ( c1..cn n -- exit )` assembles the popped string as
  a fresh program and runs it on the shared data stack, up to 16 levels
  deep.
- **Virtual disk**: `MOUNT` `UNMOUNT` `VDINFO` `VDPOS` `SECTOR` `SEEK`
  `READB` `READC` `READI` `READF` `READSTR` `WRITEB` `WRITEC` `WRITEI`
  `WRITEF` `WRITESTR` — a fixed-size byte tape backed by a file, big-endian
  typed access at a seekable cursor.
- **I/O**: `PRINT` `ERROR` `LOG` `PRINTSTR` `ERRORSTR` `LOGSTR` `GETLINE`
  `DEBUG` `NEWLINE` `TAB` `SPACE` `LOGWARNING` `LOGEVENT` `LOGINFO`
  `LOGVERBOSE`
- **Conversion**: `BTOI` `BTOF` `ITOB` `ITOF` `FTOB` `FTOI` `STRTOB`
  `STRTOI` `STRTOF` `HEXTOI` `ITOHEX` `TOSTRING` `CTOIR` `IRTOC` `TOUPPER`
  `TOLOWER`
- **Logic**: `AND` `OR` `XOR` `NOT`
- **Bitwise**: `BITAND` `BITOR` `BITXOR` `SHIFTL` `SHIFTR`
- **Comparison**: `ISBOOL` `ISCHAR` `ISINT` `ISFLOAT` `STRISBOOL` `STRISINT`
  `STRISHEX` `STRISFLOAT` and the typed relational family `CEQUALS` …
  `FLESSEQ`
- **Math**: `IADD` `ISUB` `IMULT` `IDIV` `IPOW` `ISQRT` `IABS` `FADD` `FSUB`
  `FMULT` `FDIV` `FPOW` `FSQRT` `FABS` `MOD` `RAND` `FRAND` `ROUND` `FLOOR`
  `CEIL` `LOG10` `NEXP` `NLOG` `PI` `SIN` `COS` `TAN` `ASIN` `ACOS` `ATAN`
  `TODEG` `TORAD`
- **Time**: `GETTIME ( -- h m s )`, `GETDATE ( -- y m d )`

### Errors

Assembly problems (duplicate labels, unknown symbols, a missing `BEGIN`)
stop the machine before it starts, prefixed `VMA FATAL:`. Runtime problems
(stack underflow, type mismatches, division by zero, disk faults) halt it
mid-flight, prefixed `VM FATAL:` and naming the instruction that failed.
`ABORT` raises a runtime error with a message of your choosing; `EXIT` is
the only clean way out.

*/
