//! Expressions
//!
//! Every expression leaves its value in EAX. Binary operators save the
//! left value on the stack while the right one is computed, then pop it
//! into EBX.

use super::{identifier_name, required, CodeGenerator, GenResult, Scope};
use crate::asm::{AsmInst, Condition, Operand, Reg};
use crate::emit::{EmitId, EmitKind};
use crate::symbols::SLOT_SIZE;
use mcc_common::CompilerError;
use mcc_frontend::{slots, BinaryOp, NodeKind, NodeRef, UnaryOp};

impl CodeGenerator {
    pub(super) fn gen_binary(&mut self, node: NodeRef<'_>, scope: &Scope) -> GenResult {
        let NodeKind::BinaryExpression { op } = node.kind() else {
            return Err(CompilerError::internal("binary visit on another kind"));
        };
        let left = required(node, slots::BINARY_LEFT, "left operand")?;
        let right = required(node, slots::BINARY_RIGHT, "right operand")?;

        let leaf = self.tree.create(EmitKind::Expression, scope.parent)?;
        self.emit_operand(leaf, left, scope)?;
        self.tree.add_inst(leaf, AsmInst::Push(Reg::Eax.into()))?;
        self.emit_operand(leaf, right, scope)?;
        self.tree.add_inst(leaf, AsmInst::Pop(Reg::Ebx))?;

        for inst in binary_sequence(*op) {
            self.tree.add_inst(leaf, inst)?;
        }
        Ok(leaf)
    }

    pub(super) fn gen_unary(&mut self, node: NodeRef<'_>, scope: &Scope) -> GenResult {
        let NodeKind::UnaryExpression { op } = node.kind() else {
            return Err(CompilerError::internal("unary visit on another kind"));
        };
        let operand = required(node, slots::UNARY_OPERAND, "operand")?;

        let leaf = self.tree.create(EmitKind::Expression, scope.parent)?;
        self.emit_operand(leaf, operand, scope)?;
        match op {
            UnaryOp::Minus => self.tree.add_inst(leaf, AsmInst::Neg(Reg::Eax))?,
            UnaryOp::LogicalNot => self.tree.add_inst(leaf, AsmInst::Not(Reg::Eax))?,
            UnaryOp::Plus => {}
        }
        Ok(leaf)
    }

    /// Evaluate the value, then store EAX where the target name resolves
    pub(super) fn gen_assignment(&mut self, node: NodeRef<'_>, scope: &Scope) -> GenResult {
        let target = required(node, slots::ASSIGN_TARGET, "target")?;
        let value = required(node, slots::ASSIGN_VALUE, "value")?;
        let name = identifier_name(target)?;

        let leaf = self.tree.create(EmitKind::Assignment, scope.parent)?;
        self.emit_operand(leaf, value, scope)?;
        let location = self.resolve(scope, name)?;
        self.tree.add_inst(leaf, AsmInst::Mov(location.operand(), Reg::Eax.into()))?;
        Ok(leaf)
    }

    /// Arguments are pushed last to first, the caller pops them after the call
    pub(super) fn gen_call(&mut self, node: NodeRef<'_>, scope: &Scope) -> GenResult {
        let NodeKind::FunctionCallExpression { name } = node.kind() else {
            return Err(CompilerError::internal("call visit on another kind"));
        };
        let args: Vec<NodeRef<'_>> = node
            .children_in(slots::CALL_ARGS)
            .flat_map(|list| list.children_in(slots::ARGS_LIST))
            .collect();

        let leaf = self.tree.create(EmitKind::Expression, scope.parent)?;
        for arg in args.iter().rev() {
            self.emit_operand(leaf, *arg, scope)?;
            self.tree.add_inst(leaf, AsmInst::Push(Reg::Eax.into()))?;
        }
        self.tree.add_inst(leaf, AsmInst::Call(name.clone()))?;
        if !args.is_empty() {
            let bytes = args.len() as i32 * SLOT_SIZE;
            self.tree.add_inst(leaf, AsmInst::Add(Reg::Esp, Operand::Imm(bytes)))?;
        }
        Ok(leaf)
    }

    pub(super) fn gen_number(&mut self, node: NodeRef<'_>, scope: &Scope) -> GenResult {
        let NodeKind::NumberLiteral { value } = node.kind() else {
            return Err(CompilerError::internal("number visit on another kind"));
        };
        let leaf = self.tree.create(EmitKind::Expression, scope.parent)?;
        self.tree.add_inst(leaf, AsmInst::Mov(Reg::Eax.into(), Operand::Imm(*value)))?;
        Ok(leaf)
    }

    pub(super) fn gen_identifier(&mut self, node: NodeRef<'_>, scope: &Scope) -> GenResult {
        let name = identifier_name(node)?;
        let location = self.resolve(scope, name)?;
        let leaf = self.tree.create(EmitKind::Expression, scope.parent)?;
        self.tree.add_inst(leaf, AsmInst::Mov(Reg::Eax.into(), location.operand()))?;
        Ok(leaf)
    }

    /// Generate `operand` and fold its code into `leaf`
    fn emit_operand(&mut self, leaf: EmitId, operand: NodeRef<'_>, scope: &Scope) -> Result<(), CompilerError> {
        let code = operand.accept(self, scope)?;
        self.tree.absorb(leaf, code)
    }
}

/// Combine EBX (left) with EAX (right) into EAX
fn binary_sequence(op: BinaryOp) -> Vec<AsmInst> {
    // put left in EAX and right in ECX for the operand-order sensitive ones
    let swap = || {
        vec![
            AsmInst::Mov(Reg::Ecx.into(), Reg::Eax.into()),
            AsmInst::Mov(Reg::Eax.into(), Reg::Ebx.into()),
        ]
    };
    let compare = |cond| {
        vec![
            AsmInst::Cmp(Reg::Ebx.into(), Reg::Eax.into()),
            AsmInst::Set(cond, Reg::Al),
            AsmInst::Movzx(Reg::Eax, Reg::Al),
        ]
    };

    match op {
        BinaryOp::Add => vec![AsmInst::Add(Reg::Eax, Reg::Ebx.into())],
        BinaryOp::Sub => {
            let mut seq = swap();
            seq.push(AsmInst::Sub(Reg::Eax, Reg::Ecx.into()));
            seq
        }
        BinaryOp::Mul => {
            let mut seq = swap();
            seq.push(AsmInst::Imul(Reg::Eax, Reg::Ecx));
            seq
        }
        BinaryOp::Div => {
            let mut seq = swap();
            seq.push(AsmInst::Cdq);
            seq.push(AsmInst::Idiv(Reg::Ecx));
            seq
        }
        BinaryOp::Less => compare(Condition::L),
        BinaryOp::LessEqual => compare(Condition::Le),
        BinaryOp::Greater => compare(Condition::G),
        BinaryOp::GreaterEqual => compare(Condition::Ge),
        BinaryOp::Equal => compare(Condition::E),
        BinaryOp::NotEqual => compare(Condition::Ne),
        BinaryOp::LogicalAnd => vec![AsmInst::And(Reg::Eax, Reg::Ebx)],
        BinaryOp::LogicalOr => vec![AsmInst::Or(Reg::Eax, Reg::Ebx)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(seq: Vec<AsmInst>) -> Vec<String> {
        seq.iter().map(|i| i.to_string()).collect()
    }

    #[test]
    fn test_subtraction_restores_left_operand() {
        assert_eq!(
            text(binary_sequence(BinaryOp::Sub)),
            vec!["mov ecx, eax", "mov eax, ebx", "sub eax, ecx"]
        );
    }

    #[test]
    fn test_division_sign_extends() {
        assert_eq!(
            text(binary_sequence(BinaryOp::Div)),
            vec!["mov ecx, eax", "mov eax, ebx", "cdq", "idiv ecx"]
        );
    }

    #[test]
    fn test_comparisons_compare_left_against_right() {
        assert_eq!(
            text(binary_sequence(BinaryOp::GreaterEqual)),
            vec!["cmp ebx, eax", "setge al", "movzx eax, al"]
        );
        assert_eq!(text(binary_sequence(BinaryOp::NotEqual))[1], "setne al");
    }

    #[test]
    fn test_logical_ops_are_bitwise() {
        assert_eq!(text(binary_sequence(BinaryOp::LogicalAnd)), vec!["and eax, ebx"]);
        assert_eq!(text(binary_sequence(BinaryOp::LogicalOr)), vec!["or eax, ebx"]);
    }
}
