//! Schema-graph layout for ER diagrams.
//!
//! Tables are grouped by foreign-key connectivity, groups are placed on a
//! grid and tables are arranged inside their group. The result is a flat list
//! of positioned group and table nodes plus foreign-key edges, ready for a
//! canvas renderer or the bundled SVG preview.

pub mod config;
pub mod layout;
pub mod measure;
pub mod provider;
pub mod schema;
pub mod session;
pub mod sql;
pub mod svg;

#[cfg(feature = "cli")]
pub mod cli;

use wasm_bindgen::prelude::*;

use config::LayoutConfig;
use layout::LayoutEngine;
use sql::Dialect;
use svg::SvgRenderer;

pub use layout::{Layout, compute_layout};
pub use schema::{ColumnDescriptor, ForeignKeyDescriptor, TableDescriptor};

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Lay out a JSON schema, returning `{ nodes, edges, warnings, width, height }`.
#[wasm_bindgen(js_name = "computeLayout")]
pub fn compute_layout_js(schema_json: &str, config_json: Option<String>) -> Result<JsValue, JsValue> {
    let schema = schema::from_json(schema_json).map_err(to_js_error)?;
    let config = match config_json.as_deref() {
        Some(json) => LayoutConfig::from_json(json).map_err(to_js_error)?,
        None => LayoutConfig::default(),
    };

    let layout = LayoutEngine::new(config).layout(&schema);
    let json = layout.to_json().map_err(to_js_error)?;
    js_sys::JSON::parse(&json)
}

/// Convert a SQL dump to a JSON schema.
#[wasm_bindgen(js_name = "sqlToSchema")]
pub fn sql_to_schema(sql: &str, dialect: Option<String>) -> Result<String, String> {
    let dialect = match dialect.as_deref() {
        Some(name) => name.parse::<Dialect>()?,
        None => Dialect::Auto,
    };
    let tables = sql::parse_sql(sql, dialect).map_err(|e| e.to_string())?;
    serde_json::to_string(&tables).map_err(|e| e.to_string())
}

/// Render a JSON schema to an SVG preview.
#[wasm_bindgen(js_name = "schemaToSvg")]
pub fn schema_to_svg(schema_json: &str) -> Result<String, String> {
    let schema = schema::from_json(schema_json).map_err(|e| e.to_string())?;
    let layout = compute_layout(&schema);
    Ok(SvgRenderer::default().render(&layout))
}

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}
