use crate::block::{append_to_chain, Block, BlockKind, Workspace};
use anyhow::{anyhow, bail, Context, Result};
use serde_json::{json, Map, Value};

pub const STATEMENT_TYPE: &str = "js_generic";
pub const HEADER_TYPE: &str = "js_cblock";
pub const HAT_TYPE: &str = "js_hat";

const LANGUAGE_VERSION: u64 = 0;

pub fn save_document(workspace: &Workspace) -> Value {
    let mut next_id = 1usize;
    let top: Vec<Value> = workspace
        .top_blocks()
        .iter()
        .map(|block| chain_to_value(block, &mut next_id))
        .collect();
    json!({
        "blocks": {
            "languageVersion": LANGUAGE_VERSION,
            "blocks": top,
        }
    })
}

pub fn document_to_string(workspace: &Workspace) -> Result<String> {
    Ok(serde_json::to_string_pretty(&save_document(workspace))?)
}

pub fn load_document(doc: &Value) -> Result<Workspace> {
    let top = doc
        .get("blocks")
        .and_then(|b| b.get("blocks"))
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("Invalid workspace document: missing 'blocks.blocks' array."))?;

    let mut workspace = Workspace::new();
    for node in top {
        let mut chain = None;
        chain_from_value(node, &mut chain)?;
        if let Some(block) = chain {
            workspace.push_top_block(*block);
        }
    }
    Ok(workspace)
}

pub fn load_document_str(text: &str) -> Result<Workspace> {
    let doc: Value =
        serde_json::from_str(text).context("Workspace document is not valid JSON.")?;
    load_document(&doc)
}

fn chain_to_value(block: &Block, next_id: &mut usize) -> Value {
    let mut node = Map::new();
    node.insert("id".to_string(), json!(format!("b{}", *next_id)));
    *next_id += 1;

    match &block.kind {
        BlockKind::Statement { code } => {
            node.insert("type".to_string(), json!(STATEMENT_TYPE));
            node.insert("fields".to_string(), json!({ "CODE": code }));
        }
        BlockKind::Header { header, body } => {
            node.insert("type".to_string(), json!(HEADER_TYPE));
            node.insert("fields".to_string(), json!({ "HEADER": header }));
            if let Some(body) = body {
                node.insert(
                    "inputs".to_string(),
                    json!({ "DO": { "block": chain_to_value(body, next_id) } }),
                );
            }
        }
        BlockKind::Hat { body } => {
            node.insert("type".to_string(), json!(HAT_TYPE));
            if let Some(body) = body {
                node.insert(
                    "inputs".to_string(),
                    json!({ "DO": { "block": chain_to_value(body, next_id) } }),
                );
            }
        }
    }

    if let Some(colour) = block.colour {
        node.insert("extraState".to_string(), json!({ "colour": colour }));
    }
    if let Some(next) = &block.next {
        node.insert(
            "next".to_string(),
            json!({ "block": chain_to_value(next, next_id) }),
        );
    }
    Value::Object(node)
}

fn chain_from_value(node: &Value, chain: &mut Option<Box<Block>>) -> Result<()> {
    let mut current = Some(node);
    while let Some(node) = current {
        let obj = node
            .as_object()
            .ok_or_else(|| anyhow!("Block node is not an object."))?;
        let block = block_from_object(obj)?;
        append_to_chain(chain, block);
        current = obj.get("next").and_then(|n| n.get("block"));
    }
    Ok(())
}

fn block_from_object(obj: &Map<String, Value>) -> Result<Block> {
    let typ = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("Block node is missing 'type'."))?;

    let mut block = match typ {
        STATEMENT_TYPE => Block::statement(field_string(obj, "CODE")?),
        HEADER_TYPE => Block::header(field_string(obj, "HEADER")?),
        HAT_TYPE => Block::hat(),
        other => bail!("Unknown block type '{}'.", other),
    };

    if let Some(body_node) = obj
        .get("inputs")
        .and_then(|i| i.get("DO"))
        .and_then(|d| d.get("block"))
    {
        match block.body_slot_mut() {
            Some(body) => chain_from_value(body_node, body)?,
            None => bail!("Block type '{}' cannot hold a body.", typ),
        }
    }

    if let Some(extra) = obj.get("extraState") {
        if let Some(colour) = extra.get("colour") {
            let hue = colour
                .as_u64()
                .filter(|h| *h <= 360)
                .ok_or_else(|| anyhow!("Invalid 'extraState.colour' value: {}.", colour))?;
            block.set_colour(hue as u16);
        }
    }
    Ok(block)
}

fn field_string(obj: &Map<String, Value>, name: &str) -> Result<String> {
    obj.get("fields")
        .and_then(Value::as_object)
        .and_then(|fields| fields.get(name))
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .ok_or_else(|| anyhow!("Block is missing string field '{}'.", name))
}
