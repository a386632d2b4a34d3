//! Recovery of code units from source text.
//!
//! The pass order is:
//! 1. class and mixin scopes (header match + brace counting to the close)
//! 2. standalone functions, skipping anything nested in a scope
//! 3. methods, by re-running the function header inside each scope
//! 4. getters and setters, attributed to the first scope containing them
//!
//! Units come back sorted by their position in the file.

use regex::Captures;
use std::fs;
use std::path::Path;

use super::config::SIGNATURE_WIDTH;
use super::exclusion::has_exclusion_marker;
use super::scan::{block_end, is_open_at, LineIndex};
use super::{CodeUnit, ParserConfig, ScopeKind, TypeScope, UnitKind};

/// Everything recovered from one source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceStructure {
    pub scopes: Vec<TypeScope>,
    pub units: Vec<CodeUnit>,
}

/// Extracts code units from source text.
pub struct StructureParser<'a> {
    config: &'a ParserConfig,
}

impl<'a> StructureParser<'a> {
    pub fn new(config: &'a ParserConfig) -> Self {
        Self { config }
    }

    /// Read and parse a source file.
    ///
    /// Read and UTF-8 decode failures are returned so the caller can record
    /// them; the caller treats the file as having no units.
    pub fn parse_file(&self, path: &Path) -> std::io::Result<SourceStructure> {
        let content = fs::read_to_string(path)?;
        Ok(self.parse(&content))
    }

    /// Extract all code units from source text.
    pub fn parse_units(&self, source: &str) -> Vec<CodeUnit> {
        self.parse(source).units
    }

    /// Extract scopes and code units from source text.
    pub fn parse(&self, source: &str) -> SourceStructure {
        let ctx = Context::new(source);
        let scopes = self.find_scopes(source);

        let mut found: Vec<(usize, CodeUnit)> = Vec::new();
        self.find_functions(&ctx, &scopes, &mut found);
        self.find_methods(&ctx, &scopes, &mut found);
        self.find_accessors(&ctx, &scopes, &mut found);

        // Stable: units sharing an offset keep pass order.
        found.sort_by_key(|(offset, _)| *offset);

        SourceStructure {
            scopes,
            units: found.into_iter().map(|(_, unit)| unit).collect(),
        }
    }

    /// Find class and mixin spans, ordered by start offset.
    fn find_scopes(&self, source: &str) -> Vec<TypeScope> {
        let mut scopes = Vec::new();

        let headers = [
            (&self.config.class_header, ScopeKind::Class),
            (&self.config.mixin_header, ScopeKind::Mixin),
        ];
        for (pattern, kind) in headers {
            for caps in pattern.captures_iter(source) {
                let name = &caps["name"];
                // `mixin class Foo` is picked up by the class header.
                if kind == ScopeKind::Mixin && name == "class" {
                    continue;
                }
                let start = caps.get(0).map(|m| m.start()).unwrap_or(0);
                scopes.push(TypeScope {
                    name: name.to_string(),
                    kind,
                    start_offset: start,
                    end_offset: block_end(source, start),
                });
            }
        }

        scopes.sort_by_key(|s| s.start_offset);
        scopes
    }

    fn find_functions(
        &self,
        ctx: &Context<'_>,
        scopes: &[TypeScope],
        found: &mut Vec<(usize, CodeUnit)>,
    ) {
        for caps in self.config.function_header.captures_iter(ctx.source) {
            let Some(at) = position_of(&caps, 0) else {
                continue;
            };
            if is_nested(ctx.source, scopes, at.name) {
                continue;
            }
            if self.config.is_skipped_function_name(at.text) || self.is_accessor_header(&caps) {
                continue;
            }
            found.push((at.name, ctx.unit(at, UnitKind::Function, None, self.config)));
        }
    }

    fn find_methods(
        &self,
        ctx: &Context<'_>,
        scopes: &[TypeScope],
        found: &mut Vec<(usize, CodeUnit)>,
    ) {
        for scope in scopes {
            let end = scope.end_offset.min(ctx.source.len());
            let body = &ctx.source[scope.start_offset..end];

            for caps in self.config.function_header.captures_iter(body) {
                let Some(at) = position_of(&caps, scope.start_offset) else {
                    continue;
                };
                if self.config.is_skipped_method_name(at.text, &scope.name)
                    || self.is_accessor_header(&caps)
                {
                    continue;
                }
                found.push((
                    at.name,
                    ctx.unit(at, UnitKind::Method, Some(&scope.name), self.config),
                ));
            }
        }
    }

    fn find_accessors(
        &self,
        ctx: &Context<'_>,
        scopes: &[TypeScope],
        found: &mut Vec<(usize, CodeUnit)>,
    ) {
        let passes = [
            (&self.config.getter_header, UnitKind::Getter),
            (&self.config.setter_header, UnitKind::Setter),
        ];
        for (pattern, kind) in passes {
            for caps in pattern.captures_iter(ctx.source) {
                let Some(at) = position_of(&caps, 0) else {
                    continue;
                };
                if self.config.is_skipped_accessor_name(at.text) {
                    continue;
                }
                let owner = scopes
                    .iter()
                    .find(|s| s.contains(at.name))
                    .map(|s| s.name.as_str());
                found.push((at.name, ctx.unit(at, kind, owner, self.config)));
            }
        }
    }

    fn is_accessor_header(&self, caps: &Captures<'_>) -> bool {
        caps.name("ret")
            .is_some_and(|ret| self.config.is_accessor_keyword(ret.as_str()))
    }
}

/// Whether `offset` sits inside the nearest scope that starts before it.
///
/// Decided by re-counting braces from that scope's header rather than by
/// span containment.
fn is_nested(source: &str, scopes: &[TypeScope], offset: usize) -> bool {
    scopes
        .iter()
        .filter(|s| s.start_offset <= offset)
        .max_by_key(|s| s.start_offset)
        .is_some_and(|s| is_open_at(source, s.start_offset, offset))
}

/// Where a matched declaration sits in the file.
#[derive(Clone, Copy)]
struct Position<'t> {
    text: &'t str,
    /// Offset of the declared name
    name: usize,
    /// Offset where the header match begins, before any annotation line
    header: usize,
}

fn position_of<'t>(caps: &Captures<'t>, base: usize) -> Option<Position<'t>> {
    let name = caps.name("name")?;
    let header = caps.get(0).map_or(name.start(), |m| m.start());
    Some(Position {
        text: name.as_str(),
        name: base + name.start(),
        header: base + header,
    })
}

/// Per-file lookup tables used while building units.
struct Context<'s> {
    source: &'s str,
    lines: Vec<&'s str>,
    index: LineIndex,
}

impl<'s> Context<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            lines: source.split('\n').collect(),
            index: LineIndex::new(source),
        }
    }

    /// Build a unit for a matched declaration.
    ///
    /// The line number is the name's line. The marker is searched around
    /// both the name and the header start, so a marker above a standalone
    /// annotation line still applies.
    fn unit(
        &self,
        at: Position<'_>,
        kind: UnitKind,
        owner: Option<&str>,
        config: &ParserConfig,
    ) -> CodeUnit {
        let line = self.index.line_of(at.name);
        let header_line = self.index.line_of(at.header);
        let marker = &config.exclusion_marker;
        CodeUnit {
            name: at.text.to_string(),
            kind,
            enclosing_type: owner.map(str::to_string),
            declared_at_line: line,
            signature: extract_signature(self.lines.get(line - 1).copied().unwrap_or("")),
            excluded: has_exclusion_marker(&self.lines, line, marker)
                || (header_line < line && has_exclusion_marker(&self.lines, header_line, marker)),
        }
    }
}

/// Trim a declaration line for display.
///
/// Drops a line that is only a comment, strips one leading annotation, and
/// truncates to [`SIGNATURE_WIDTH`] characters.
fn extract_signature(line: &str) -> String {
    let mut text = line.trim();
    if text.starts_with("//") {
        return String::new();
    }
    if let Some(rest) = text.strip_prefix('@') {
        let after_word = rest.trim_start_matches(|c: char| c.is_alphanumeric() || c == '_');
        text = after_word.trim_start();
    }

    let text = text.trim_end_matches('\r');
    if text.chars().count() > SIGNATURE_WIDTH {
        let truncated: String = text.chars().take(SIGNATURE_WIDTH).collect();
        format!("{}...", truncated)
    } else {
        text.to_string()
    }
}
