//! JSON renderer: the object model serialized as-is, for tooling.

use crate::render::Renderer;
use anyhow::{Context, Result};
use matdoc_syntax::Module;

pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, module: &Module) -> Result<String> {
        let mut out = serde_json::to_string_pretty(module)
            .with_context(|| format!("failed to serialize {}", module.name))?;
        out.push('\n');
        Ok(out)
    }

    fn file_extension(&self) -> &str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matdoc_syntax::{parse_module, ParseOptions};

    #[test]
    fn items_are_tagged_by_kind() {
        let parsed = parse_module("f", "function y = f(x)\nend\n", &ParseOptions::default()).unwrap();
        let out = JsonRenderer.render(&parsed.module).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["name"], "f");
        assert_eq!(value["items"][0]["kind"], "function");
        assert_eq!(value["items"][0]["signature"]["inputs"][0]["name"], "x");
        assert_eq!(value["items"][0]["signature"]["outputs"][0]["direction"], "output");
    }
}
