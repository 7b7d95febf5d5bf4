//! Assembly of emission nodes into text
//!
//! Each composite lays out its own lines (directives, prologue, labels,
//! jumps) around its contexts, appending the already assembled children
//! in context order.

use super::{AsmBuffer, EmitBody, EmitContext, EmitId, EmitKind, EmitTree};
use crate::asm::{AsmInst, Condition, Operand, Reg};
use mcc_common::CompilerError;

impl EmitTree {
    /// Assemble node `id` and everything below it into one buffer
    pub fn assemble(&self, id: EmitId) -> Result<AsmBuffer, CompilerError> {
        let node = self.node(id)?;
        let mut out = AsmBuffer::new(self.style, node.base);

        match (&node.body, node.kind) {
            (EmitBody::Leaf(buffer), _) => return Ok(buffer.clone()),
            (EmitBody::File { .. }, _) => self.assemble_file(id, &mut out)?,
            (EmitBody::Function { frame, .. }, _) => {
                out.add_inst(&AsmInst::Proc(frame.name().to_string()));
                out.enter_scope();
                out.add_inst(&AsmInst::Push(Reg::Ebp.into()));
                out.add_inst(&AsmInst::Mov(Reg::Ebp.into(), Reg::Esp.into()));
                if frame.local_bytes() > 0 {
                    out.add_inst(&AsmInst::Sub(Reg::Esp, Operand::Imm(frame.local_bytes())));
                }
                self.append_context(id, EmitContext::FunctionHeader, &mut out)?;
                self.append_context(id, EmitContext::FunctionBody, &mut out)?;
                out.add_inst(&AsmInst::Label(frame.exit_label()));
                out.add_inst(&AsmInst::Mov(Reg::Esp.into(), Reg::Ebp.into()));
                out.add_inst(&AsmInst::Pop(Reg::Ebp));
                out.add_inst(&AsmInst::Ret);
                out.leave_scope(&node.name)?;
                out.add_inst(&AsmInst::Endp(frame.name().to_string()));
            }
            (EmitBody::Block { .. }, EmitKind::If) => {
                let else_label = self.label(id, "else")?;
                let end_label = self.label(id, "endif")?;
                self.append_context(id, EmitContext::IfCondition, &mut out)?;
                out.add_inst(&AsmInst::Cmp(Reg::Eax.into(), Operand::Imm(0)));
                out.add_inst(&AsmInst::Jcc(Condition::E, else_label.clone()));
                self.append_context(id, EmitContext::IfThen, &mut out)?;
                out.add_inst(&AsmInst::Jmp(end_label.clone()));
                out.add_inst(&AsmInst::Label(else_label));
                self.append_context(id, EmitContext::IfElse, &mut out)?;
                out.add_inst(&AsmInst::Label(end_label));
            }
            (EmitBody::Block { .. }, EmitKind::While) => {
                let loop_label = self.label(id, "loop")?;
                let end_label = self.label(id, "end")?;
                out.add_inst(&AsmInst::Label(loop_label.clone()));
                self.append_context(id, EmitContext::WhileCondition, &mut out)?;
                out.add_inst(&AsmInst::Cmp(Reg::Eax.into(), Operand::Imm(0)));
                out.add_inst(&AsmInst::Jcc(Condition::E, end_label.clone()));
                self.append_context(id, EmitContext::WhileBody, &mut out)?;
                out.add_inst(&AsmInst::Jmp(loop_label));
                out.add_inst(&AsmInst::Label(end_label));
            }
            (EmitBody::Block { .. }, EmitKind::Compound) => {
                self.append_context(id, EmitContext::CompoundBody, &mut out)?;
            }
            (EmitBody::Block { .. }, kind) => {
                return Err(CompilerError::internal(format!(
                    "{} is not a block kind",
                    kind.label()
                )))
            }
        }

        Ok(out)
    }

    fn assemble_file(&self, id: EmitId, out: &mut AsmBuffer) -> Result<(), CompilerError> {
        let options = &self.options;
        out.add_inst(&AsmInst::Directive(options.processor.clone()));
        out.add_inst(&AsmInst::Directive(format!(".model {}", options.memory_model)));
        out.add_inst(&AsmInst::Directive(format!(".stack {}", options.stack_size)));
        out.add_inst(&AsmInst::Directive(".data".to_string()));
        self.append_context(id, EmitContext::FileData, out)?;
        out.add_inst(&AsmInst::Directive(".code".to_string()));
        self.append_context(id, EmitContext::FileCode, out)?;
        out.add_inst(&AsmInst::End(options.entry_point.clone()));
        Ok(())
    }

    fn append_context(&self, id: EmitId, context: EmitContext, out: &mut AsmBuffer) -> Result<(), CompilerError> {
        for child in self.children(id, context)? {
            let assembled = self.assemble(*child)?;
            out.append_assembled(&assembled);
        }
        Ok(())
    }
}
