//! Symbol descriptor parser
//!
//! The index encodes one symbol per compact string:
//! `name:line:(signature):returnType:callee1,callee2,...`
//! The return type and call list are optional, and call entries may carry a
//! trailing colon which is stripped. Strings that do not match the grammar
//! degrade to a name-only descriptor instead of failing.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

fn descriptor_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?P<name>[^:]+):(?P<line>[0-9]+):\((?P<signature>[^)]*)\):(?P<ret>[^:]*)?:(?P<calls>.*)$",
        )
        .expect("descriptor grammar regex is valid")
    })
}

/// A parsed symbol descriptor.
///
/// Constructed on demand from raw index strings and never mutated. Parsing is
/// pure: identical input always yields identical output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolDescriptor {
    pub name: String,
    pub line: u32,
    pub signature: String,
    pub return_type: String,
    pub calls: Vec<String>,
    /// The original descriptor string, kept for textual heuristics
    pub raw: String,
}

impl SymbolDescriptor {
    /// Parse a raw descriptor string.
    ///
    /// Non-conforming input yields `{name: raw, raw}` with all optional
    /// fields empty; this function never fails.
    pub fn parse(raw: &str) -> Self {
        let Some(caps) = descriptor_regex().captures(raw) else {
            return Self {
                name: raw.to_string(),
                line: 0,
                signature: String::new(),
                return_type: String::new(),
                calls: Vec::new(),
                raw: raw.to_string(),
            };
        };

        let calls = caps
            .name("calls")
            .map(|m| m.as_str())
            .unwrap_or_default()
            .split(',')
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .map(|c| c.trim_end_matches(':').to_string())
            .collect();

        Self {
            name: caps["name"].to_string(),
            // Guaranteed digits by the grammar; clamp absurd values to 0.
            line: caps["line"].parse().unwrap_or(0),
            signature: caps["signature"].to_string(),
            return_type: caps.name("ret").map(|m| m.as_str()).unwrap_or("").to_string(),
            calls,
            raw: raw.to_string(),
        }
    }

    /// The symbol name portion of a raw descriptor, without full parsing.
    pub fn name_of(raw: &str) -> &str {
        raw.split(':').next().unwrap_or(raw)
    }
}
