//! JavaScript module specifiers to Python import paths.

const SCRIPT_EXTENSIONS: [&str; 5] = [".js", ".mjs", ".cjs", ".jsx", ".json"];

/// Split a specifier into the relative import level (number of leading
/// dots) and a dotted module name.
///
/// `"./a/b.js"` is `(1, "a.b")`, `"../x"` is `(2, "x")` and
/// `"node:fs"` is `(0, "fs")`. Characters that cannot appear in a Python
/// identifier become `_`.
pub fn module_path(specifier: &str) -> (u32, String) {
    let specifier = specifier.strip_prefix("node:").unwrap_or(specifier);

    let mut level = 0u32;
    let mut segments = Vec::new();
    let mut leading = true;
    for segment in specifier.split('/') {
        match segment {
            "." if leading => level = level.max(1),
            ".." if leading => level = if level == 0 { 2 } else { level + 1 },
            "" => {}
            _ => {
                leading = false;
                segments.push(segment);
            }
        }
    }

    let last = segments.len().saturating_sub(1);
    let dotted = segments
        .iter()
        .enumerate()
        .map(|(i, segment)| {
            let segment = if i == last {
                strip_extension(segment)
            } else {
                segment
            };
            identifier(segment.trim_start_matches('@'))
        })
        .collect::<Vec<_>>()
        .join(".");

    (level, dotted)
}

fn strip_extension(segment: &str) -> &str {
    SCRIPT_EXTENSIONS
        .iter()
        .find_map(|ext| segment.strip_suffix(ext))
        .filter(|stem| !stem.is_empty())
        .unwrap_or(segment)
}

fn identifier(segment: &str) -> String {
    let mut out: String = segment
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if out.chars().next().map_or(true, |c| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}
