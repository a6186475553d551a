use jblocks_rs_core::block::{append_to_chain, Block, Workspace, HEADER_COLOUR};
use jblocks_rs_core::codegen::generate_program;
use jblocks_rs_core::document::{load_document, load_document_str, save_document};
use jblocks_rs_core::import::import_source;
use serde_json::json;

fn sample_workspace() -> Workspace {
    let (workspace, warnings) =
        import_source("if (x > 0) {\n  move(1);\n  turn(2);\n}\nfinish();");
    assert!(warnings.is_empty());
    workspace
}

#[test]
fn document_round_trips_structure() {
    let workspace = sample_workspace();
    let doc = save_document(&workspace);
    let loaded = load_document(&doc).expect("valid document");
    assert_eq!(workspace, loaded);
}

#[test]
fn document_round_trips_through_text() {
    let workspace = sample_workspace();
    let text = serde_json::to_string_pretty(&save_document(&workspace)).unwrap();
    let loaded = load_document_str(&text).expect("valid document");
    assert_eq!(generate_program(&loaded), generate_program(&workspace));
}

#[test]
fn colour_override_survives_save_and_load() {
    let mut workspace = sample_workspace();
    workspace.top_blocks_mut()[0].set_colour(42);

    let doc = save_document(&workspace);
    let loaded = load_document(&doc).expect("valid document");
    assert_eq!(loaded.top_blocks()[0].colour, Some(42));
    assert_eq!(loaded.top_blocks()[0].effective_colour(), 42);
}

#[test]
fn absent_override_uses_kind_default() {
    let block = Block::header("if (a)");
    assert_eq!(block.colour, None);
    assert_eq!(block.effective_colour(), HEADER_COLOUR);

    let doc = save_document(&sample_workspace());
    let loaded = load_document(&doc).expect("valid document");
    assert!(loaded.top_blocks()[0].colour.is_none());
}

#[test]
fn reset_colour_reverts_to_kind_default() {
    let mut block = Block::header("if (a)");
    block.set_colour(17);
    assert_eq!(block.effective_colour(), 17);
    block.reset_colour();
    assert_eq!(block.effective_colour(), HEADER_COLOUR);
}

#[test]
fn colour_is_orthogonal_to_structure() {
    let mut plain = sample_workspace();
    let mut coloured = sample_workspace();
    coloured.top_blocks_mut()[0].set_colour(200);

    // Same generated text either way.
    assert_eq!(generate_program(&plain), generate_program(&coloured));

    plain.top_blocks_mut()[0].set_colour(200);
    assert_eq!(plain, coloured);
}

#[test]
fn load_ignores_unknown_keys() {
    let doc = json!({
        "blocks": {
            "languageVersion": 0,
            "blocks": [{
                "type": "js_generic",
                "id": "b1",
                "x": 120,
                "y": 80,
                "fields": { "CODE": "move(1)" }
            }]
        }
    });
    let loaded = load_document(&doc).expect("valid document");
    assert_eq!(loaded.top_blocks().len(), 1);
}

#[test]
fn load_rejects_invalid_json_text() {
    assert!(load_document_str("{not json").is_err());
}

#[test]
fn load_rejects_wrong_root_shape() {
    assert!(load_document(&json!({ "workspace": [] })).is_err());
    assert!(load_document(&json!({ "blocks": { "blocks": 3 } })).is_err());
}

#[test]
fn load_rejects_unknown_block_type() {
    let doc = json!({
        "blocks": { "languageVersion": 0, "blocks": [{ "type": "js_mystery" }] }
    });
    let err = load_document(&doc).unwrap_err();
    assert!(err.to_string().contains("js_mystery"));
}

#[test]
fn load_rejects_missing_statement_field() {
    let doc = json!({
        "blocks": { "languageVersion": 0, "blocks": [{ "type": "js_generic" }] }
    });
    assert!(load_document(&doc).is_err());
}

#[test]
fn load_rejects_body_on_statement_block() {
    let doc = json!({
        "blocks": {
            "languageVersion": 0,
            "blocks": [{
                "type": "js_generic",
                "fields": { "CODE": "move(1)" },
                "inputs": { "DO": { "block": { "type": "js_generic", "fields": { "CODE": "x()" } } } }
            }]
        }
    });
    assert!(load_document(&doc).is_err());
}

#[test]
fn load_rejects_out_of_range_colour() {
    let doc = json!({
        "blocks": {
            "languageVersion": 0,
            "blocks": [{
                "type": "js_hat",
                "extraState": { "colour": 720 }
            }]
        }
    });
    assert!(load_document(&doc).is_err());
}

#[test]
fn pipeline_strings_round_trip() {
    let source = "if (x > 0) {\nmove(1);\nturn(2);\n}\n";
    let (document, warnings) =
        jblocks_rs_core::import_source_to_document_string(source).expect("import");
    assert!(warnings.is_empty());
    let exported = jblocks_rs_core::export_document_string_to_source(&document).expect("export");
    assert_eq!(exported, source);
}

#[test]
fn sibling_order_is_preserved_through_the_document() {
    let mut workspace = Workspace::new();
    let mut hat = Block::hat();
    if let Some(body) = hat.body_slot_mut() {
        for i in 0..5 {
            append_to_chain(body, Block::statement(format!("step({})", i)));
        }
    }
    workspace.push_top_block(hat);

    let loaded = load_document(&save_document(&workspace)).expect("valid document");
    assert_eq!(
        generate_program(&loaded),
        "step(0);\nstep(1);\nstep(2);\nstep(3);\nstep(4);\n"
    );
}
