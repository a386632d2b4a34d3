//! Recovery of declared test cases from test text.
//!
//! A test declaration is a call like `test('adds two numbers', () {`. The
//! target of each test is guessed from its description: the first word that
//! is not a stopword, is longer than two characters, and appears as a whole
//! word somewhere in the file. This is deliberately weak and will both miss
//! and over-match.

use regex::Regex;
use std::fs;
use std::path::Path;

use super::scan::LineIndex;
use super::{ParserConfig, TestCase};

/// Extracts test cases from test text.
pub struct TestDeclarationParser<'a> {
    config: &'a ParserConfig,
}

impl<'a> TestDeclarationParser<'a> {
    pub fn new(config: &'a ParserConfig) -> Self {
        Self { config }
    }

    /// Read and parse a test file.
    pub fn parse_file(&self, path: &Path) -> std::io::Result<Vec<TestCase>> {
        let content = fs::read_to_string(path)?;
        Ok(self.parse(&content))
    }

    /// Extract test cases in declaration order.
    ///
    /// Declarations behind a `//` line comment are commented-out code and
    /// are skipped.
    pub fn parse(&self, text: &str) -> Vec<TestCase> {
        let index = LineIndex::new(text);
        let mut cases = Vec::new();

        for caps in self.config.test_declaration.captures_iter(text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let line_start = index.line_start(whole.start());
            if text[line_start..whole.start()].contains("//") {
                continue;
            }

            let description = caps
                .name("single")
                .or_else(|| caps.name("double"))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();

            cases.push(TestCase {
                inferred_target: self.infer_target(&description, text),
                declared_at_line: index.line_of(whole.start()),
                description,
            });
        }

        cases
    }

    /// Guess the unit a test exercises from its description.
    pub fn infer_target(&self, description: &str, text: &str) -> Option<String> {
        let lowered = description.to_lowercase();

        for word in lowered.split_whitespace() {
            if self.config.is_stopword(word) || word.chars().count() <= 2 {
                continue;
            }
            let Ok(pattern) = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(word))) else {
                continue;
            };
            if pattern.is_match(text) {
                return Some(word.to_string());
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Vec<TestCase> {
        let config = ParserConfig::default();
        TestDeclarationParser::new(&config).parse(text)
    }

    #[test]
    fn test_parse_declarations_in_order() {
        let text = r#"import 'package:test/test.dart';

void main() {
  test("add works", () {
    expect(add(1, 2), equals(3));
  });

  test('should subtract correctly', () {
    expect(subtract(3, 1), equals(2));
  });
}
"#;
        let cases = parse(text);
        assert_eq!(cases.len(), 2);

        assert_eq!(cases[0].description, "add works");
        assert_eq!(cases[0].declared_at_line, 4);
        assert_eq!(cases[0].inferred_target.as_deref(), Some("add"));

        assert_eq!(cases[1].description, "should subtract correctly");
        assert_eq!(cases[1].declared_at_line, 8);
        assert_eq!(cases[1].inferred_target.as_deref(), Some("subtract"));
    }

    #[test]
    fn test_stopwords_and_short_words_skipped() {
        let config = ParserConfig::default();
        let parser = TestDeclarationParser::new(&config);
        let target = parser.infer_target("can verify it is ok", "verify it is ok");
        assert_eq!(target, None);
    }

    #[test]
    fn test_inference_is_case_insensitive_whole_word() {
        let config = ParserConfig::default();
        let parser = TestDeclarationParser::new(&config);
        let text = "expect(calculateTotal(items), 3);";
        assert_eq!(
            parser.infer_target("CalculateTotal sums items", text).as_deref(),
            Some("calculatetotal")
        );
        // "sum" never occurs in the text.
        assert_eq!(
            parser
                .infer_target("sum of values", "values.fold(0, plus)")
                .as_deref(),
            Some("values")
        );
    }

    #[test]
    fn test_inference_takes_first_occurring_word() {
        let config = ParserConfig::default();
        let parser = TestDeclarationParser::new(&config);
        // "multiply" does not occur in the text, "numbers" does.
        let target = parser.infer_target("multiply numbers", "final numbers = [1, 2];");
        assert_eq!(target.as_deref(), Some("numbers"));
    }

    #[test]
    fn test_commented_out_declarations_skipped() {
        let text = "void main() {\n  // test('add should work', () {\n  // });\n}\n";
        assert!(parse(text).is_empty());
    }

    #[test]
    fn test_callback_with_arguments_not_matched() {
        let text = "test('add works', (tester) {\n});\n";
        assert!(parse(text).is_empty());
    }

    #[test]
    fn test_async_callback() {
        let text = "test('loads data', () async {\n  await load();\n});\n";
        let cases = parse(text);
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].inferred_target.as_deref(), Some("loads"));
    }

    #[test]
    fn test_apostrophe_in_double_quotes() {
        let text = "test(\"doesn't divide by zero\", () {\n});\n";
        let cases = parse(text);
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].description, "doesn't divide by zero");
    }
}
