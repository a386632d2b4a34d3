//! Detection of "no test" exclusion markers.
//!
//! A unit is exempt from coverage when a marker comment such as
//! `//No test` or `// no  TEST` sits on its declaration line or on the line
//! directly above it:
//!
//! ```text
//! void simpleUtility() { //No test
//!
//! //No test
//! void anotherFunction() {
//! ```

use regex::Regex;

/// Check the declaration line and the line before it for the marker.
///
/// `line_number` is 1-indexed; out-of-range lines never match.
pub fn has_exclusion_marker(lines: &[&str], line_number: usize, marker: &Regex) -> bool {
    if line_number == 0 || line_number > lines.len() {
        return false;
    }
    let idx = line_number - 1;

    if marker.is_match(lines[idx]) {
        return true;
    }
    idx > 0 && marker.is_match(lines[idx - 1])
}
