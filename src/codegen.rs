use crate::block::{Block, BlockKind, Workspace};

pub fn generate_block(block: &Block) -> String {
    match &block.kind {
        BlockKind::Statement { code } => {
            if code.is_empty() {
                String::new()
            } else {
                format!("{};\n", code)
            }
        }
        BlockKind::Header { header, body } => {
            format!("{} {{\n{}}}\n", header, generate_chain(body.as_deref()))
        }
        BlockKind::Hat { body } => generate_chain(body.as_deref()),
    }
}

pub fn generate_chain(first: Option<&Block>) -> String {
    let mut out = String::new();
    if let Some(first) = first {
        for block in first.siblings() {
            out.push_str(&generate_block(block));
        }
    }
    out
}

// Only hat blocks are generation roots; top-level chains that are not hats
// are intentionally excluded.
pub fn generate_program(workspace: &Workspace) -> String {
    let mut out = String::new();
    for hat in workspace.hats() {
        out.push_str(&generate_block(hat));
    }
    out
}
