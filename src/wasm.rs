use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub fn import_source_to_document(source: &str) -> Result<String, JsValue> {
    crate::import_source_to_document_string(source)
        .map(|(document, _warnings)| document)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

#[wasm_bindgen]
pub fn export_document_to_source(document_json: &str) -> Result<String, JsValue> {
    crate::export_document_string_to_source(document_json)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
