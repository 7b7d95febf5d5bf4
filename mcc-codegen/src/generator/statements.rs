//! Statements and control flow

use super::{required, CodeGenerator, GenResult, Scope};
use crate::asm::AsmInst;
use crate::emit::{EmitContext, EmitKind};
use log::trace;
use mcc_common::CompilerError;
use mcc_frontend::{slots, NodeRef};

impl CodeGenerator {
    pub(super) fn gen_block(&mut self, node: NodeRef<'_>, scope: &Scope) -> GenResult {
        let compound = self.tree.create(EmitKind::Compound, scope.parent)?;
        self.tree.enter_scope(compound)?;

        let inner = scope.under(compound);
        for statement in node.children_in(slots::BLOCK_BODY) {
            let code = statement.accept(self, &inner)?;
            self.tree.add_child(compound, EmitContext::CompoundBody, code)?;
        }

        self.tree.leave_scope(compound)?;
        Ok(compound)
    }

    /// Labels and jumps are laid out when the node is assembled
    pub(super) fn gen_if(&mut self, node: NodeRef<'_>, scope: &Scope) -> GenResult {
        required(node, slots::IF_CONDITION, "condition")?;
        let if_id = self.tree.create(EmitKind::If, scope.parent)?;
        trace!("{} for if at {}", self.tree.name(if_id)?, node.location());

        let inner = scope.under(if_id);
        let parts = [
            (slots::IF_CONDITION, EmitContext::IfCondition),
            (slots::IF_THEN, EmitContext::IfThen),
            (slots::IF_ELSE, EmitContext::IfElse),
        ];
        for (slot, context) in parts {
            for child in node.children_in(slot) {
                let code = child.accept(self, &inner)?;
                self.tree.add_child(if_id, context, code)?;
            }
        }
        Ok(if_id)
    }

    pub(super) fn gen_while(&mut self, node: NodeRef<'_>, scope: &Scope) -> GenResult {
        required(node, slots::WHILE_CONDITION, "condition")?;
        let while_id = self.tree.create(EmitKind::While, scope.parent)?;
        trace!("{} for while at {}", self.tree.name(while_id)?, node.location());

        let inner = Scope {
            loop_end: Some(self.tree.label(while_id, "end")?),
            ..scope.under(while_id)
        };
        let parts = [
            (slots::WHILE_CONDITION, EmitContext::WhileCondition),
            (slots::WHILE_BODY, EmitContext::WhileBody),
        ];
        for (slot, context) in parts {
            for child in node.children_in(slot) {
                let code = child.accept(self, &inner)?;
                self.tree.add_child(while_id, context, code)?;
            }
        }
        Ok(while_id)
    }

    /// Leave the value in EAX and jump to the function's epilogue
    pub(super) fn gen_return(&mut self, node: NodeRef<'_>, scope: &Scope) -> GenResult {
        let function = self.require_function(scope, node, "return")?;
        let leaf = self.tree.create(EmitKind::Return, scope.parent)?;
        if let Some(value) = node.child(slots::RETURN_EXPR) {
            let code = value.accept(self, scope)?;
            self.tree.absorb(leaf, code)?;
        }
        let exit = self.tree.frame(function)?.exit_label();
        self.tree.add_inst(leaf, AsmInst::Jmp(exit))?;
        Ok(leaf)
    }

    pub(super) fn gen_break(&mut self, node: NodeRef<'_>, scope: &Scope) -> GenResult {
        let end = scope.loop_end.clone().ok_or_else(|| {
            CompilerError::codegen_error("break outside of a loop", node.location().clone())
        })?;
        let leaf = self.tree.create(EmitKind::None, scope.parent)?;
        self.tree.add_inst(leaf, AsmInst::Jmp(end))?;
        Ok(leaf)
    }
}
