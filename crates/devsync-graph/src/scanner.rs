//! Go module scanner: turns a repository's `go.mod` into a [`ScanResult`].
//!
//! The module itself becomes the root node and every `require` entry becomes
//! a dependency of it. Both the single-line and the block form of `require`
//! are understood; `// indirect` requirements are included.

use crate::error::ScanError;
use crate::graph::{Edge, ScanResult};
use std::path::Path;

/// Root node name used when `go.mod` has no `module` directive.
pub const DEFAULT_ROOT: &str = "main";

/// Reads `<repo_path>/go.mod` and returns its dependency edges.
///
/// # Errors
///
/// Returns [`ScanError::Read`] when the file is missing or unreadable and
/// [`ScanError::Parse`] when a directive is malformed.
pub fn scan_go_module(repo_path: impl AsRef<Path>) -> Result<ScanResult, ScanError> {
    let path = repo_path.as_ref().join("go.mod");
    let display = path.display().to_string();
    let contents = std::fs::read_to_string(&path).map_err(|source| ScanError::Read {
        path: display.clone(),
        source,
    })?;

    let scan = parse_go_mod(&contents, &display)?;
    tracing::debug!(
        path = %path.display(),
        dependencies = scan.edges.len(),
        "scanned go module"
    );
    Ok(scan)
}

/// Parses the contents of a `go.mod` file. `origin` is only used in errors.
pub fn parse_go_mod(contents: &str, origin: &str) -> Result<ScanResult, ScanError> {
    let mut module: Option<String> = None;
    let mut requires: Vec<String> = Vec::new();
    let mut in_require_block = false;
    // Other directive blocks (replace, exclude, retract) are skipped.
    let mut in_other_block = false;

    for (index, raw) in contents.lines().enumerate() {
        let line_no = index + 1;
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }

        if in_require_block || in_other_block {
            if line == ")" {
                in_require_block = false;
                in_other_block = false;
            } else if in_require_block {
                requires.push(module_path(line, origin, line_no)?);
            }
            continue;
        }

        let (directive, rest) = match line.split_once(char::is_whitespace) {
            Some((d, r)) => (d, r.trim()),
            None => (line, ""),
        };

        match directive {
            "module" => {
                let name = unquote(rest);
                if name.is_empty() {
                    return Err(ScanError::Parse {
                        path: origin.to_string(),
                        line: line_no,
                        reason: "module directive without a path".to_string(),
                    });
                }
                module = Some(name.to_string());
            }
            "require" if rest == "(" => in_require_block = true,
            "require" => requires.push(module_path(rest, origin, line_no)?),
            _ if rest == "(" => in_other_block = true,
            _ => {}
        }
    }

    let root = module.unwrap_or_else(|| DEFAULT_ROOT.to_string());
    let mut nodes = vec![root.clone()];
    let mut edges = Vec::with_capacity(requires.len());
    for dep in requires {
        edges.push(Edge::new(root.clone(), dep.clone()));
        nodes.push(dep);
    }

    Ok(ScanResult { nodes, edges })
}

fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn unquote(s: &str) -> &str {
    s.trim_matches('"')
}

/// Extracts the module path from a `path version` requirement.
fn module_path(spec: &str, origin: &str, line: usize) -> Result<String, ScanError> {
    let mut parts = spec.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(path), Some(_version)) => Ok(unquote(path).to_string()),
        _ => Err(ScanError::Parse {
            path: origin.to_string(),
            line,
            reason: format!("expected `path version`, got `{spec}`"),
        }),
    }
}
