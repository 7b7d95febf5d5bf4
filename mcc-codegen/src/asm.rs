//! x86 Assembly Instruction Definitions
//!
//! This module defines the register model and the subset of 32-bit x86
//! instructions and MASM directives the generator emits. Every line of
//! generated text is produced by the `Display` impls below.

use std::fmt;

/// 32-bit register set plus the 8-bit low byte of EAX used by `setcc`
///
/// - EAX: accumulator, holds the value of every expression
/// - EBX: secondary, receives the saved left operand
/// - ECX, EDX: scratch for division
/// - EBP, ESP: frame and stack pointers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reg {
    Eax, Ebx, Ecx, Edx,
    Ebp, Esp,
    Al,
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reg::Eax => write!(f, "eax"),
            Reg::Ebx => write!(f, "ebx"),
            Reg::Ecx => write!(f, "ecx"),
            Reg::Edx => write!(f, "edx"),
            Reg::Ebp => write!(f, "ebp"),
            Reg::Esp => write!(f, "esp"),
            Reg::Al => write!(f, "al"),
        }
    }
}

/// Instruction operand
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Reg(Reg),
    Imm(i32),
    /// EBP-relative stack slot
    Frame(i32),
    /// Global symbol by name
    Global(String),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Reg(reg) => write!(f, "{}", reg),
            Operand::Imm(value) => write!(f, "{}", value),
            Operand::Frame(offset) if *offset < 0 => write!(f, "[ebp-{}]", offset.unsigned_abs()),
            Operand::Frame(offset) => write!(f, "[ebp+{}]", offset),
            Operand::Global(name) => write!(f, "{}", name),
        }
    }
}

impl From<Reg> for Operand {
    fn from(reg: Reg) -> Self {
        Operand::Reg(reg)
    }
}

/// Flag conditions for `setcc` and `jcc`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    E, Ne,
    L, Le, G, Ge,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::E => write!(f, "e"),
            Condition::Ne => write!(f, "ne"),
            Condition::L => write!(f, "l"),
            Condition::Le => write!(f, "le"),
            Condition::G => write!(f, "g"),
            Condition::Ge => write!(f, "ge"),
        }
    }
}

/// Assembly lines: instructions, labels and MASM directives
#[derive(Debug, Clone, PartialEq)]
pub enum AsmInst {
    // Data movement
    Mov(Operand, Operand),        // dst = src
    Movzx(Reg, Reg),              // dst = zero-extended src
    Push(Operand),
    Pop(Reg),

    // Arithmetic
    Add(Reg, Operand),            // dst += src
    Sub(Reg, Operand),            // dst -= src
    Imul(Reg, Reg),               // dst *= src
    Idiv(Reg),                    // edx:eax / src
    Cdq,                          // sign-extend eax into edx
    Neg(Reg),

    // Logical
    And(Reg, Reg),
    Or(Reg, Reg),
    Not(Reg),

    // Compare and branch
    Cmp(Operand, Operand),
    Set(Condition, Reg),
    Jmp(String),
    Jcc(Condition, String),
    Call(String),
    Ret,

    // Pseudo
    Label(String),
    Comment(String),

    // MASM directives
    Proc(String),
    Endp(String),
    Dword(String, Option<i32>),   // global variable, `?` when uninitialised
    Proto(String, usize),         // external prototype with DWORD parameters
    Directive(String),
    End(String),
}

impl fmt::Display for AsmInst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Data movement
            AsmInst::Mov(dst, src) => write!(f, "mov {}, {}", dst, src),
            AsmInst::Movzx(dst, src) => write!(f, "movzx {}, {}", dst, src),
            AsmInst::Push(src) => write!(f, "push {}", src),
            AsmInst::Pop(dst) => write!(f, "pop {}", dst),

            // Arithmetic
            AsmInst::Add(dst, src) => write!(f, "add {}, {}", dst, src),
            AsmInst::Sub(dst, src) => write!(f, "sub {}, {}", dst, src),
            AsmInst::Imul(dst, src) => write!(f, "imul {}, {}", dst, src),
            AsmInst::Idiv(src) => write!(f, "idiv {}", src),
            AsmInst::Cdq => write!(f, "cdq"),
            AsmInst::Neg(reg) => write!(f, "neg {}", reg),

            // Logical
            AsmInst::And(dst, src) => write!(f, "and {}, {}", dst, src),
            AsmInst::Or(dst, src) => write!(f, "or {}, {}", dst, src),
            AsmInst::Not(reg) => write!(f, "not {}", reg),

            // Compare and branch
            AsmInst::Cmp(a, b) => write!(f, "cmp {}, {}", a, b),
            AsmInst::Set(cond, reg) => write!(f, "set{} {}", cond, reg),
            AsmInst::Jmp(label) => write!(f, "jmp {}", label),
            AsmInst::Jcc(cond, label) => write!(f, "j{} {}", cond, label),
            AsmInst::Call(name) => write!(f, "call {}", name),
            AsmInst::Ret => write!(f, "ret"),

            // Pseudo
            AsmInst::Label(label) => write!(f, "{}:", label),
            AsmInst::Comment(text) => write!(f, "; {}", text),

            // Directives
            AsmInst::Proc(name) => write!(f, "{} PROC", name),
            AsmInst::Endp(name) => write!(f, "{} ENDP", name),
            AsmInst::Dword(name, Some(value)) => write!(f, "{} DWORD {}", name, value),
            AsmInst::Dword(name, None) => write!(f, "{} DWORD ?", name),
            AsmInst::Proto(name, 0) => write!(f, "{} PROTO", name),
            AsmInst::Proto(name, arity) => {
                let params = vec![":DWORD"; *arity].join(", ");
                write!(f, "{} PROTO {}", name, params)
            }
            AsmInst::Directive(text) => write!(f, "{}", text),
            AsmInst::End(entry) => write!(f, "END {}", entry),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_display() {
        assert_eq!(format!("{}", Reg::Eax), "eax");
        assert_eq!(format!("{}", Reg::Esp), "esp");
        assert_eq!(format!("{}", Reg::Al), "al");
    }

    #[test]
    fn test_frame_operand_display() {
        assert_eq!(Operand::Frame(-4).to_string(), "[ebp-4]");
        assert_eq!(Operand::Frame(8).to_string(), "[ebp+8]");
        assert_eq!(Operand::Global("g".into()).to_string(), "g");
    }

    #[test]
    fn test_instruction_display() {
        assert_eq!(AsmInst::Mov(Reg::Eax.into(), Operand::Imm(42)).to_string(), "mov eax, 42");
        assert_eq!(AsmInst::Mov(Operand::Frame(-8), Reg::Eax.into()).to_string(), "mov [ebp-8], eax");
        assert_eq!(AsmInst::Sub(Reg::Esp, Operand::Imm(12)).to_string(), "sub esp, 12");
        assert_eq!(AsmInst::Set(Condition::Le, Reg::Al).to_string(), "setle al");
        assert_eq!(AsmInst::Jcc(Condition::E, "IF_3_else".into()).to_string(), "je IF_3_else");
        assert_eq!(AsmInst::Label("WHILE_4_loop".into()).to_string(), "WHILE_4_loop:");
        assert_eq!(AsmInst::Comment("local x at [ebp-4]".into()).to_string(), "; local x at [ebp-4]");
    }

    #[test]
    fn test_directive_display() {
        assert_eq!(AsmInst::Proc("main".into()).to_string(), "main PROC");
        assert_eq!(AsmInst::Endp("main".into()).to_string(), "main ENDP");
        assert_eq!(AsmInst::Dword("g".into(), Some(5)).to_string(), "g DWORD 5");
        assert_eq!(AsmInst::Dword("h".into(), None).to_string(), "h DWORD ?");
        assert_eq!(AsmInst::Proto("f".into(), 2).to_string(), "f PROTO :DWORD, :DWORD");
        assert_eq!(AsmInst::Proto("tick".into(), 0).to_string(), "tick PROTO");
        assert_eq!(AsmInst::End("main".into()).to_string(), "END main");
    }
}
