use jblocks_rs_core::block::{append_to_chain, Block, BlockKind, Workspace};
use jblocks_rs_core::codegen::{generate_block, generate_program};
use jblocks_rs_core::import::{import_into, import_source};

fn body_chain(block: &Block) -> Vec<&Block> {
    match block.body() {
        Some(first) => first.siblings().collect(),
        None => Vec::new(),
    }
}

fn statement_code(block: &Block) -> &str {
    match &block.kind {
        BlockKind::Statement { code } => code,
        other => panic!("expected statement, got {:?}", other),
    }
}

fn header_text(block: &Block) -> &str {
    match &block.kind {
        BlockKind::Header { header, .. } => header,
        other => panic!("expected header, got {:?}", other),
    }
}

#[test]
fn imports_conditional_with_two_statements() {
    let (workspace, warnings) = import_source("if (x > 0) {\n  move(1);\n  turn(2);\n}");
    assert!(warnings.is_empty());

    let top = workspace.top_blocks();
    assert_eq!(top.len(), 1);
    assert!(top[0].is_hat());

    let body = body_chain(&top[0]);
    assert_eq!(body.len(), 1);
    assert_eq!(header_text(body[0]), "if (x > 0)");

    let inner = body_chain(body[0]);
    assert_eq!(inner.len(), 2);
    assert_eq!(statement_code(inner[0]), "move(1)");
    assert_eq!(statement_code(inner[1]), "turn(2)");
}

#[test]
fn generates_conditional_back_to_source() {
    let (workspace, _) = import_source("if (x > 0) {\n  move(1);\n  turn(2);\n}");
    assert_eq!(
        generate_program(&workspace),
        "if (x > 0) {\nmove(1);\nturn(2);\n}\n"
    );
}

#[test]
fn imports_nested_conditionals_with_matched_boundaries() {
    let (workspace, warnings) = import_source("if (a) {\nif (b) {\nx();\n}\n}");
    assert!(warnings.is_empty());

    let body = body_chain(&workspace.top_blocks()[0]);
    assert_eq!(body.len(), 1);
    assert_eq!(header_text(body[0]), "if (a)");

    let outer = body_chain(body[0]);
    assert_eq!(outer.len(), 1);
    assert_eq!(header_text(outer[0]), "if (b)");

    let inner = body_chain(outer[0]);
    assert_eq!(inner.len(), 1);
    assert_eq!(statement_code(inner[0]), "x()");
}

#[test]
fn statements_after_a_nested_scope_stay_in_the_outer_scope() {
    let (workspace, _) = import_source("while (true) {\nstep();\n}\ndone();");
    let body = body_chain(&workspace.top_blocks()[0]);
    assert_eq!(body.len(), 2);
    assert_eq!(header_text(body[0]), "while (true)");
    assert_eq!(statement_code(body[1]), "done()");
}

#[test]
fn terminator_stripping_is_idempotent() {
    let (with, _) = import_source("move(1);");
    let (without, _) = import_source("move(1)");
    assert_eq!(with, without);

    let body = body_chain(&with.top_blocks()[0]);
    assert_eq!(statement_code(body[0]), "move(1)");
}

#[test]
fn blank_lines_emit_no_blocks() {
    let (workspace, warnings) = import_source("\n\nmove(1);\n\n\nturn(2);\n\n");
    assert!(warnings.is_empty());
    let body = body_chain(&workspace.top_blocks()[0]);
    assert_eq!(body.len(), 2);
}

#[test]
fn crlf_line_endings_are_normalized() {
    let (crlf, _) = import_source("if (a) {\r\nx();\r\n}\r\n");
    let (lf, _) = import_source("if (a) {\nx();\n}\n");
    assert_eq!(crlf, lf);
}

#[test]
fn empty_statement_generates_no_stray_terminator() {
    assert_eq!(generate_block(&Block::statement("")), "");

    let mut hat = Block::hat();
    if let Some(body) = hat.body_slot_mut() {
        append_to_chain(body, Block::statement(""));
        append_to_chain(body, Block::statement("move(1)"));
    }
    assert_eq!(generate_block(&hat), "move(1);\n");
}

#[test]
fn empty_hat_generates_empty_text() {
    assert_eq!(generate_block(&Block::hat()), "");

    let mut workspace = Workspace::new();
    workspace.push_top_block(Block::hat());
    assert_eq!(generate_program(&workspace), "");
}

#[test]
fn header_with_empty_body_round_trips() {
    let (workspace, _) = import_source("if (a) {\n}");
    let body = body_chain(&workspace.top_blocks()[0]);
    assert_eq!(body.len(), 1);
    assert!(body_chain(body[0]).is_empty());
    assert_eq!(generate_program(&workspace), "if (a) {\n}\n");
}

#[test]
fn clearing_the_workspace_destroys_all_blocks() {
    let (mut workspace, _) = import_source("if (a) {\nx();\n}");
    assert!(!workspace.is_empty());
    assert_eq!(workspace.block_count(), 3);

    workspace.clear();
    assert!(workspace.is_empty());
    assert_eq!(workspace.block_count(), 0);
    assert_eq!(generate_program(&workspace), "");
}

#[test]
fn dead_blocks_never_appear_in_generated_output() {
    let mut workspace = Workspace::new();
    let mut hat = Block::hat();
    if let Some(body) = hat.body_slot_mut() {
        append_to_chain(body, Block::statement("alive()"));
    }
    workspace.push_top_block(hat);
    // A top-level chain with no hat is reachable by nothing.
    workspace.push_top_block(Block::statement("dead()"));

    let out = generate_program(&workspace);
    assert_eq!(out, "alive();\n");
    assert!(!out.contains("dead"));
}

#[test]
fn stray_top_level_close_recovers_with_warning() {
    let (workspace, warnings) = import_source("}\nmove(1);");
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].line, 1);

    let body = body_chain(&workspace.top_blocks()[0]);
    assert_eq!(body.len(), 1);
    assert_eq!(statement_code(body[0]), "move(1)");
}

#[test]
fn unbalanced_open_imports_best_effort_with_warning() {
    let (workspace, warnings) = import_source("if (a) {\nmove(1);");
    assert_eq!(warnings.len(), 1);

    let body = body_chain(&workspace.top_blocks()[0]);
    assert_eq!(body.len(), 1);
    assert_eq!(header_text(body[0]), "if (a)");
    let inner = body_chain(body[0]);
    assert_eq!(inner.len(), 1);
    assert_eq!(statement_code(inner[0]), "move(1)");
}

#[test]
fn import_into_attaches_to_an_existing_container() {
    let mut container = Block::header("while (running)");
    let warnings = import_into(&mut container, "step();\nif (done) {\nstop();\n}");
    assert!(warnings.is_empty());

    let body = body_chain(&container);
    assert_eq!(body.len(), 2);
    assert_eq!(statement_code(body[0]), "step()");
    assert_eq!(header_text(body[1]), "if (done)");
    assert_eq!(
        generate_block(&container),
        "while (running) {\nstep();\nif (done) {\nstop();\n}\n}\n"
    );
}

#[test]
fn import_of_generated_text_is_structurally_stable() {
    let source = "setup();\nif (keyDown(\"ArrowLeft\")) {\nwhile (x < 10) {\nstep();\n}\n} \nfinish();";
    let (first, _) = import_source(source);
    let regenerated = generate_program(&first);
    let (second, warnings) = import_source(&regenerated);
    assert!(warnings.is_empty());
    assert_eq!(first, second);
    // A second generation is byte-identical.
    assert_eq!(generate_program(&second), regenerated);
}
