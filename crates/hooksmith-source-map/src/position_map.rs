//! Line-level maps from generated output back to DSL source.

use crate::vlq;
use serde::{Deserialize, Serialize};

/// One generated line correlated with one original line (both 1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineMapping {
    pub generated_line: u32,
    pub original_line: u32,
}

/// A sorted set of line mappings for one compiled unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionMap {
    /// Name of the generated file.
    file: String,
    /// Identifier of the DSL source the mappings point into.
    source: String,
    /// Sorted by generated line, at most one entry per generated line.
    mappings: Vec<LineMapping>,
}

/// The serialized Source Map v3 document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMapV3 {
    pub version: u8,
    pub file: String,
    pub sources: Vec<String>,
    pub names: Vec<String>,
    pub mappings: String,
}

impl PositionMap {
    pub fn builder(file: impl Into<String>, source: impl Into<String>) -> PositionMapBuilder {
        PositionMapBuilder::new(file, source)
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn mappings(&self) -> impl Iterator<Item = &LineMapping> {
        self.mappings.iter()
    }

    /// Original line recorded for a generated line, if any.
    pub fn original_line(&self, generated_line: u32) -> Option<u32> {
        self.mappings
            .binary_search_by_key(&generated_line, |m| m.generated_line)
            .ok()
            .map(|idx| self.mappings[idx].original_line)
    }

    /// First generated line that maps to `original_line`.
    pub fn generated_line(&self, original_line: u32) -> Option<u32> {
        self.mappings
            .iter()
            .find(|m| m.original_line == original_line)
            .map(|m| m.generated_line)
    }

    /// Encodes the mappings as a v3 `mappings` string.
    ///
    /// Every mapped generated line gets a single segment at column 0 pointing
    /// at column 0 of its original line; unmapped lines stay empty.
    pub fn encode_mappings(&self) -> String {
        let mut out = String::new();
        let Some(last) = self.mappings.last() else {
            return out;
        };

        let mut previous_original: i64 = 0;
        let mut first_segment = true;
        let mut iter = self.mappings.iter().peekable();

        for line in 1..=last.generated_line {
            if line > 1 {
                out.push(';');
            }
            if let Some(mapping) = iter.next_if(|m| m.generated_line == line) {
                let original = i64::from(mapping.original_line) - 1;
                let fields: [i64; 4] = if first_segment {
                    [0, 0, original, 0]
                } else {
                    [0, 0, original - previous_original, 0]
                };
                vlq::encode_segment(&fields, &mut out);
                previous_original = original;
                first_segment = false;
            }
        }

        out
    }

    pub fn to_v3(&self) -> SourceMapV3 {
        SourceMapV3 {
            version: 3,
            file: self.file.clone(),
            sources: vec![self.source.clone()],
            names: Vec::new(),
            mappings: self.encode_mappings(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.to_v3())
    }
}

/// Collects line mappings while output is being written.
#[derive(Debug, Default)]
pub struct PositionMapBuilder {
    file: String,
    source: String,
    mappings: Vec<LineMapping>,
}

impl PositionMapBuilder {
    pub fn new(file: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            source: source.into(),
            mappings: Vec::new(),
        }
    }

    /// Records that `generated_line` was produced from `original_line`.
    ///
    /// Zero line numbers are ignored.
    pub fn add_mapping(&mut self, generated_line: u32, original_line: u32) {
        if generated_line == 0 || original_line == 0 {
            return;
        }
        self.mappings.push(LineMapping {
            generated_line,
            original_line,
        });
    }

    /// Builds the map. When several mappings target the same generated line,
    /// the first one recorded wins.
    pub fn build(mut self) -> PositionMap {
        self.mappings.sort_by_key(|m| m.generated_line);
        self.mappings.dedup_by_key(|m| m.generated_line);
        PositionMap {
            file: self.file,
            source: self.source,
            mappings: self.mappings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_map() {
        let map = PositionMap::builder("Counter.tsx", "Counter.hks").build();
        assert!(map.is_empty());
        assert_eq!(map.encode_mappings(), "");
    }

    #[test]
    fn test_lookup_both_directions() {
        let mut builder = PositionMap::builder("Counter.tsx", "Counter.hks");
        builder.add_mapping(7, 1);
        builder.add_mapping(4, 2);
        let map = builder.build();

        assert_eq!(map.len(), 2);
        assert_eq!(map.original_line(4), Some(2));
        assert_eq!(map.original_line(7), Some(1));
        assert_eq!(map.original_line(5), None);
        assert_eq!(map.generated_line(1), Some(7));
    }

    #[test]
    fn test_first_mapping_for_a_line_wins() {
        let mut builder = PositionMap::builder("a.tsx", "a.hks");
        builder.add_mapping(3, 1);
        builder.add_mapping(3, 9);
        builder.add_mapping(0, 4);
        let map = builder.build();
        assert_eq!(map.len(), 1);
        assert_eq!(map.original_line(3), Some(1));
    }

    #[test]
    fn test_encode_mappings() {
        let mut builder = PositionMap::builder("a.tsx", "a.hks");
        builder.add_mapping(2, 1);
        builder.add_mapping(3, 4);
        builder.add_mapping(5, 2);
        let map = builder.build();
        // line 1 empty, line 2 -> 0, line 3 -> +3, line 4 empty, line 5 -> -2
        assert_eq!(map.encode_mappings(), ";AAAA;AAGA;;AAFA");
    }

    #[test]
    fn test_to_json() {
        let mut builder = PositionMap::builder("Counter.tsx", "Counter.hks");
        builder.add_mapping(1, 1);
        let json = builder.build().to_json().unwrap();
        assert_eq!(
            json,
            r#"{"version":3,"file":"Counter.tsx","sources":["Counter.hks"],"names":[],"mappings":"AAAA"}"#
        );
    }
}
