// Source map joining for bundled output - per-module maps shifted to their
// line offsets inside the bundle, optionally composed with a minifier map.

use crate::utils::Result;
use base64::{engine::general_purpose, Engine as _};
use sourcemap::{SourceMap, SourceMapBuilder};

pub struct SourceMapJoiner {
    builder: SourceMapBuilder,
}

impl SourceMapJoiner {
    pub fn new(file: Option<&str>) -> Self {
        Self {
            builder: SourceMapBuilder::new(file),
        }
    }

    /// Add the map of one module whose first generated line sits at
    /// `line_offset` in the joined output.
    pub fn add_module(
        &mut self,
        map_json: &str,
        line_offset: u32,
        source_name: &str,
        source_contents: &str,
    ) -> Result<()> {
        let map = SourceMap::from_slice(map_json.as_bytes())?;

        let src_id = self.builder.add_source(source_name);
        self.builder.set_source_contents(src_id, Some(source_contents));

        for token in map.tokens() {
            if token.get_source().is_none() {
                continue;
            }
            let name_id = token.get_name().map(|name| self.builder.add_name(name));
            self.builder.add_raw(
                token.get_dst_line() + line_offset,
                token.get_dst_col(),
                token.get_src_line(),
                token.get_src_col(),
                Some(src_id),
                name_id,
                false,
            );
        }

        Ok(())
    }

    pub fn finish(self) -> SourceMap {
        self.builder.into_sourcemap()
    }
}

/// Rebase `map` (bundle -> sources) onto code that was regenerated from the
/// bundle, given the regenerated code's map back to the bundle.
pub fn compose(mut map: SourceMap, regenerated_json: &str) -> Result<SourceMap> {
    let regenerated = SourceMap::from_slice(regenerated_json.as_bytes())?;
    map.adjust_mappings(&regenerated);
    Ok(map)
}

pub fn inline_comment(map: &SourceMap) -> Result<String> {
    let mut json = Vec::new();
    map.to_writer(&mut json)?;
    Ok(format!(
        "//# sourceMappingURL=data:application/json;base64,{}",
        general_purpose::STANDARD.encode(json)
    ))
}
