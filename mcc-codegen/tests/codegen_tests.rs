//! End to end tests: parse tree in, assembly text out

mod common;

use common::*;
use mcc_codegen::{CodegenOptions, EmitContext, IndentStyle, LineEnding};
use mcc_common::CompilerError;
use pretty_assertions::assert_eq;
use std::collections::HashSet;

/// Label stem `WHILE_<n>` of the first while loop in `asm`
fn first_while(asm: &str) -> String {
    lines(asm)
        .into_iter()
        .find(|l| l.starts_with("WHILE_") && l.ends_with("_loop:"))
        .map(|l| l.trim_end_matches("_loop:").to_string())
        .expect("a while loop label")
}

#[test]
fn test_global_plus_literal_full_output() {
    // int g = 5; int main() { return g + 1; }
    let tree = unit(vec![
        global("g", Some(num(5))),
        function("main", &[], block(vec![ret(binary(ident("g"), "+", num(1)))])),
    ]);

    let expected = ".386\n\
                    .model flat, stdcall\n\
                    .stack 4096\n\
                    .data\n\
                    g DWORD 5\n\
                    .code\n\
                    main PROC\n\
                    \tpush ebp\n\
                    \tmov ebp, esp\n\
                    \t\tmov eax, g\n\
                    \t\tpush eax\n\
                    \t\tmov eax, 1\n\
                    \t\tpop ebx\n\
                    \t\tadd eax, ebx\n\
                    \t\tjmp main_exit\n\
                    \tmain_exit:\n\
                    \tmov esp, ebp\n\
                    \tpop ebp\n\
                    \tret\n\
                    main ENDP\n\
                    END main\n";
    assert_eq!(compile(&tree), expected);
}

#[test]
fn test_parameters_and_subtraction() {
    // int f(int a, int b) { return a - b; }
    let tree = unit(vec![function(
        "f",
        &["a", "b"],
        block(vec![ret(binary(ident("a"), "-", ident("b")))]),
    )]);
    let asm = compile(&tree);

    assert!(asm.contains("\t; param a at [ebp+8]\n\t; param b at [ebp+12]\n"));
    assert_eq!(
        section(&asm, "mov eax, [ebp+8]", "jmp f_exit"),
        vec![
            "mov eax, [ebp+8]",
            "push eax",
            "mov eax, [ebp+12]",
            "pop ebx",
            "mov ecx, eax",
            "mov eax, ebx",
            "sub eax, ecx",
            "jmp f_exit",
        ]
    );
    // no locals, no frame allocation
    assert!(!asm.contains("sub esp"));
}

#[test]
fn test_while_loop_layout() {
    // int main() { int i = 0; while (i < 3) { i = i + 1; } return i; }
    let tree = unit(vec![function(
        "main",
        &[],
        block(vec![
            local("i", Some(num(0))),
            while_loop(
                binary(ident("i"), "<", num(3)),
                block(vec![stmt(assign("i", binary(ident("i"), "+", num(1))))]),
            ),
            ret(ident("i")),
        ]),
    )]);
    let asm = compile(&tree);
    let w = first_while(&asm);

    assert!(asm.contains("\tsub esp, 4\n"));
    assert_eq!(
        section(&asm, "mov eax, 0", "mov [ebp-4], eax"),
        vec!["mov eax, 0", "mov [ebp-4], eax"]
    );

    let loop_label = format!("{}_loop:", w);
    let end_label = format!("{}_end:", w);
    let je = format!("je {}_end", w);
    let jmp = format!("jmp {}_loop", w);
    assert_eq!(
        section(&asm, &loop_label, &end_label),
        vec![
            loop_label.as_str(),
            "mov eax, [ebp-4]",
            "push eax",
            "mov eax, 3",
            "pop ebx",
            "cmp ebx, eax",
            "setl al",
            "movzx eax, al",
            "cmp eax, 0",
            je.as_str(),
            "mov eax, [ebp-4]",
            "push eax",
            "mov eax, 1",
            "pop ebx",
            "add eax, ebx",
            "mov [ebp-4], eax",
            jmp.as_str(),
            end_label.as_str(),
        ]
    );

    // the return follows the loop
    let all = lines(&asm);
    let end_at = all.iter().position(|l| *l == end_label).unwrap();
    assert_eq!(&all[end_at + 1..end_at + 3], &["mov eax, [ebp-4]", "jmp main_exit"]);
}

#[test]
fn test_frame_offsets() {
    // int f(int a, int b) { int x; int y; return a; }
    let tree = unit(vec![function(
        "f",
        &["a", "b"],
        block(vec![local("x", None), local("y", None), ret(ident("a"))]),
    )]);
    let emitted = emission_tree(&tree);
    let function = emitted.children(emitted.file(), EmitContext::FileCode).unwrap()[0];
    let frame = emitted.frame(function).unwrap();

    assert_eq!(frame.name(), "f");
    assert_eq!(frame.param_offset("a"), Some(8));
    assert_eq!(frame.param_offset("b"), Some(12));
    assert_eq!(frame.local_offset("x"), Some(-4));
    assert_eq!(frame.local_offset("y"), Some(-8));
    assert_eq!(frame.param_count(), 2);
    assert_eq!(frame.local_bytes(), 8);

    let asm = emitted.emit().unwrap();
    assert!(asm.contains("\tsub esp, 8\n"));
    assert!(asm.contains("; local y at [ebp-8]"));
}

#[test]
fn test_global_declared_twice_is_emitted_once() {
    let tree = unit(vec![
        global("g", Some(num(5))),
        global("g", Some(num(7))),
        global("h", None),
        function("main", &[], block(vec![ret(ident("g"))])),
    ]);
    let asm = compile(&tree);

    assert_eq!(asm.matches("g DWORD").count(), 1);
    assert!(asm.contains("g DWORD 5\n"));
    assert!(asm.contains("h DWORD ?\n"));
}

#[test]
fn test_negative_global_initializer() {
    let tree = unit(vec![global("g", Some(unary("-", num(3))))]);
    assert!(compile(&tree).contains("g DWORD -3\n"));

    let tree = unit(vec![global("low", Some(unary("-", num(2147483648))))]);
    assert!(compile(&tree).contains("low DWORD -2147483648\n"));
}

#[test]
fn test_non_constant_global_initializer_fails() {
    let tree = unit(vec![global("g", Some(num(1))), global("h", Some(ident("g")))]);
    let err = compile_with(&tree, &CodegenOptions::default()).unwrap_err();
    assert!(matches!(err, CompilerError::Codegen { .. }), "got {:?}", err);
}

#[test]
fn test_labels_are_unique() {
    let cond = || binary(ident("a"), ">", num(0));
    let tree = unit(vec![function(
        "main",
        &["a"],
        block(vec![
            if_else(cond(), block(vec![ret(num(1))]), Some(block(vec![ret(num(2))]))),
            if_else(cond(), block(vec![stmt(assign("a", num(0)))]), None),
            while_loop(cond(), block(vec![stmt(assign("a", binary(ident("a"), "-", num(1))))])),
            ret(num(0)),
        ]),
    )]);
    let asm = compile(&tree);

    let labels: Vec<&str> = lines(&asm).into_iter().filter(|l| l.ends_with(':')).collect();
    let unique: HashSet<&str> = labels.iter().copied().collect();
    assert_eq!(labels.len(), unique.len(), "duplicate labels in {:?}", labels);
    // two ifs with two labels each, one while with two, one exit label
    assert_eq!(labels.len(), 7);

    // every jump target is defined
    for line in lines(&asm) {
        if let Some(target) = line.strip_prefix("jmp ").or_else(|| line.strip_prefix("je ")) {
            assert!(unique.contains(format!("{}:", target).as_str()), "undefined label {}", target);
        }
    }
}

#[test]
fn test_if_else_branches() {
    // int main() { if (1) { return 1; } else { return 2; } }
    let tree = unit(vec![function(
        "main",
        &[],
        block(vec![if_else(num(1), block(vec![ret(num(1))]), Some(block(vec![ret(num(2))])))]),
    )]);
    let asm = compile(&tree);
    let all = lines(&asm);
    let je = all.iter().position(|l| l.starts_with("je IF_")).unwrap();
    let stem = all[je].trim_start_matches("je ").trim_end_matches("_else");

    assert_eq!(
        &all[je - 2..],
        &[
            "mov eax, 1".to_string(),
            "cmp eax, 0".to_string(),
            format!("je {}_else", stem),
            "mov eax, 1".to_string(),
            "jmp main_exit".to_string(),
            format!("jmp {}_endif", stem),
            format!("{}_else:", stem),
            "mov eax, 2".to_string(),
            "jmp main_exit".to_string(),
            format!("{}_endif:", stem),
            "main_exit:".to_string(),
            "mov esp, ebp".to_string(),
            "pop ebp".to_string(),
            "ret".to_string(),
            "main ENDP".to_string(),
            "END main".to_string(),
        ][..]
    );
}

#[test]
fn test_local_shadows_parameter() {
    // int f(int x) { int x = 1; return x; }
    let tree = unit(vec![function(
        "f",
        &["x"],
        block(vec![local("x", Some(num(1))), ret(ident("x"))]),
    )]);
    let asm = compile(&tree);

    assert_eq!(
        section(&asm, "mov eax, 1", "jmp f_exit"),
        vec!["mov eax, 1", "mov [ebp-4], eax", "mov eax, [ebp-4]", "jmp f_exit"]
    );
    assert!(!asm.contains("mov eax, [ebp+8]"));
}

#[test]
fn test_local_initializer_reads_shadowed_parameter() {
    // int f(int x) { int x = x + 1; return x; }
    let tree = unit(vec![function(
        "f",
        &["x"],
        block(vec![local("x", Some(binary(ident("x"), "+", num(1)))), ret(ident("x"))]),
    )]);
    let asm = compile(&tree);

    assert_eq!(
        section(&asm, "mov eax, [ebp+8]", "jmp f_exit"),
        vec![
            "mov eax, [ebp+8]",
            "push eax",
            "mov eax, 1",
            "pop ebx",
            "add eax, ebx",
            "mov [ebp-4], eax",
            "mov eax, [ebp-4]",
            "jmp f_exit",
        ]
    );
}

#[test]
fn test_local_initializer_sees_earlier_locals() {
    // int main() { int a = 2; int b = a * 3; return b; }
    let tree = unit(vec![function(
        "main",
        &[],
        block(vec![
            local("a", Some(num(2))),
            local("b", Some(binary(ident("a"), "*", num(3)))),
            ret(ident("b")),
        ]),
    )]);
    let asm = compile(&tree);

    assert!(asm.contains("\tsub esp, 8\n"));
    assert_eq!(
        section(&asm, "mov eax, 2", "jmp main_exit"),
        vec![
            "mov eax, 2",
            "mov [ebp-4], eax",
            "mov eax, [ebp-4]",
            "push eax",
            "mov eax, 3",
            "pop ebx",
            "mov ecx, eax",
            "mov eax, ebx",
            "imul eax, ecx",
            "mov [ebp-8], eax",
            "mov eax, [ebp-8]",
            "jmp main_exit",
        ]
    );
}

#[test]
fn test_break_jumps_to_loop_end() {
    // int main() { while (1) { break; } return 0; }
    let tree = unit(vec![function(
        "main",
        &[],
        block(vec![while_loop(num(1), block(vec![brk()])), ret(num(0))]),
    )]);
    let asm = compile(&tree);
    let w = first_while(&asm);
    let je = format!("je {}_end", w);
    let brk = format!("jmp {}_end", w);
    let jmp = format!("jmp {}_loop", w);

    assert_eq!(
        section(&asm, &je, &jmp),
        vec![je.as_str(), brk.as_str(), jmp.as_str()]
    );
}

#[test]
fn test_break_outside_loop_fails() {
    let tree = unit(vec![function("main", &[], block(vec![brk()]))]);
    let err = compile_with(&tree, &CodegenOptions::default()).unwrap_err();
    assert!(matches!(err, CompilerError::Codegen { .. }));
}

#[test]
fn test_call_pushes_arguments_right_to_left() {
    // int add(int a, int b); int main() { return add(1, 2); }
    let tree = unit(vec![
        prototype("add", &["a", "b"]),
        function("main", &[], block(vec![ret(call("add", vec![num(1), num(2)]))])),
    ]);
    let asm = compile(&tree);

    assert!(asm.contains(".data\nadd PROTO :DWORD, :DWORD\n.code\n"));
    assert_eq!(
        section(&asm, "mov eax, 2", "jmp main_exit"),
        vec![
            "mov eax, 2",
            "push eax",
            "mov eax, 1",
            "push eax",
            "call add",
            "add esp, 8",
            "jmp main_exit",
        ]
    );
}

#[test]
fn test_call_without_arguments_needs_no_cleanup() {
    let tree = unit(vec![
        function("tick", &[], block(vec![ret(num(0))])),
        function("main", &[], block(vec![stmt(call("tick", vec![])), ret(num(0))])),
    ]);
    let asm = compile(&tree);

    assert!(asm.contains("\t\tcall tick\n"));
    assert!(!asm.contains("add esp"));
}

#[test]
fn test_prototype_after_definition_is_skipped() {
    let tree = unit(vec![
        function("f", &["a"], block(vec![ret(ident("a"))])),
        prototype("f", &["a"]),
        prototype("g", &[]),
        prototype("g", &[]),
    ]);
    let asm = compile(&tree);

    assert!(!asm.contains("f PROTO"));
    assert_eq!(asm.matches("g PROTO").count(), 1);
}

#[test]
fn test_assignment_to_global_inside_function() {
    let tree = unit(vec![
        global("count", None),
        function("main", &[], block(vec![stmt(assign("count", num(3))), ret(ident("count"))])),
    ]);
    assert_eq!(
        section(&compile(&tree), "mov eax, 3", "jmp main_exit"),
        vec!["mov eax, 3", "mov count, eax", "mov eax, count", "jmp main_exit"]
    );
}

#[test]
fn test_crlf_line_endings() {
    let tree = unit(vec![function("main", &[], block(vec![ret(num(0))]))]);
    let options = CodegenOptions {
        line_ending: LineEnding::CrLf,
        ..CodegenOptions::default()
    };
    let asm = compile_with(&tree, &options).unwrap();

    assert!(asm.ends_with("END main\r\n"));
    assert_eq!(asm.matches('\n').count(), asm.matches("\r\n").count());
}

#[test]
fn test_space_indentation_and_file_options() {
    let tree = unit(vec![function("start", &[], block(vec![ret(num(0))]))]);
    let options = CodegenOptions {
        indent: IndentStyle::Spaces(2),
        entry_point: "start".to_string(),
        stack_size: 8192,
        ..CodegenOptions::default()
    };
    let asm = compile_with(&tree, &options).unwrap();

    assert!(asm.contains(".stack 8192\n"));
    assert!(asm.contains("\n  push ebp\n"));
    assert!(asm.contains("\n    mov eax, 0\n"));
    assert!(!asm.contains('\t'));
    assert!(asm.ends_with("END start\n"));
}

#[test]
fn test_malformed_tree_is_reported_before_codegen() {
    let tree = unit(vec![function("main", &[], block(vec![ret(binary(num(1), "%", num(2)))]))]);
    let err = compile_with(&tree, &CodegenOptions::default()).unwrap_err();
    assert!(matches!(err, CompilerError::MalformedInput { .. }), "got {:?}", err);
}
