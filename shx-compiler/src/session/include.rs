use crate::{DiagnosticPhase, Diagnostics};
use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};
use thiserror::Error;

const INCLUDE_DIRECTIVE: &str = "#include";

#[derive(Error, Debug)]
pub enum IncludeError {
    #[error("malformed include directive on line {line}: `{text}`")]
    Malformed { line: usize, text: String },
    #[error("the include `{include}` was not found in any search path")]
    NotFound { include: String },
    #[error("failed to read the include `{}`: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct ExpandedSource {
    pub content: String,
    /// Files pulled in by `#include`, in the order they were first expanded.
    pub included: Vec<PathBuf>,
}

/// Expands `#include "file"` lines in place.
///
/// A relative include is looked up next to the including file first (or next
/// to `origin` for the root source), then in each search path in order. Each
/// file is expanded at most once; repeated includes are skipped with a warning.
pub fn expand_includes(
    content: &str,
    origin: Option<&Path>,
    search_paths: &[PathBuf],
    diagnostics: &mut Diagnostics,
) -> Result<ExpandedSource, IncludeError> {
    let mut expander = IncludeExpander {
        search_paths,
        diagnostics,
        visited: BTreeSet::new(),
        included: Vec::new(),
    };
    let content = expander.expand(content, origin)?;

    Ok(ExpandedSource {
        content,
        included: expander.included,
    })
}

struct IncludeExpander<'a> {
    search_paths: &'a [PathBuf],
    diagnostics: &'a mut Diagnostics,
    visited: BTreeSet<PathBuf>,
    included: Vec<PathBuf>,
}

impl<'a> IncludeExpander<'a> {
    fn expand(&mut self, content: &str, origin: Option<&Path>) -> Result<String, IncludeError> {
        let mut expanded = String::with_capacity(content.len());

        for (index, line) in content.lines().enumerate() {
            let include = match parse_include(line, index + 1)? {
                Some(include) => include,
                None => {
                    expanded.push_str(line);
                    expanded.push('\n');
                    continue;
                }
            };

            let path = self.resolve(include, origin)?;
            let key = path.canonicalize().unwrap_or_else(|_| path.clone());

            if !self.visited.insert(key) {
                self.diagnostics.warn(
                    DiagnosticPhase::Load,
                    format!(
                        "the include `{}` was already expanded; skipping.",
                        path.display()
                    ),
                );
                continue;
            }

            let included = std::fs::read_to_string(&path).map_err(|source| IncludeError::Read {
                path: path.clone(),
                source,
            })?;
            self.included.push(path.clone());

            let nested = self.expand(&included, path.parent())?;
            expanded.push_str(&nested);
        }

        Ok(expanded)
    }

    fn resolve(&self, include: &str, origin: Option<&Path>) -> Result<PathBuf, IncludeError> {
        let include_path = Path::new(include);

        if include_path.is_absolute() {
            if include_path.is_file() {
                return Ok(include_path.to_owned());
            }

            return Err(IncludeError::NotFound {
                include: include.to_owned(),
            });
        }

        origin
            .into_iter()
            .chain(self.search_paths.iter().map(|path| path.as_path()))
            .map(|root| root.join(include_path))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| IncludeError::NotFound {
                include: include.to_owned(),
            })
    }
}

fn parse_include(line: &str, line_number: usize) -> Result<Option<&str>, IncludeError> {
    let rest = match line.trim_start().strip_prefix(INCLUDE_DIRECTIVE) {
        Some(rest) => rest.trim(),
        None => return Ok(None),
    };

    match rest
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        Some(include) if !include.is_empty() && !include.contains('"') => Ok(Some(include)),
        _ => Err(IncludeError::Malformed {
            line: line_number,
            text: line.trim().to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "shx-include-{}-{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_source_without_includes_is_unchanged() {
        let mut diagnostics = Diagnostics::new();
        let expanded =
            expand_includes("fn a() {}\nfn b() {}", None, &[], &mut diagnostics).unwrap();

        assert_eq!(expanded.content, "fn a() {}\nfn b() {}\n");
        assert!(expanded.included.is_empty());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_includes_resolve_through_search_paths_in_order() {
        let dir = scratch_dir("order");
        let first = dir.join("first");
        let second = dir.join("second");
        fs::create_dir_all(&first).unwrap();
        fs::create_dir_all(&second).unwrap();
        fs::write(second.join("common.wgsl"), "const FROM_SECOND: f32 = 2.0;").unwrap();
        fs::write(first.join("common.wgsl"), "const FROM_FIRST: f32 = 1.0;").unwrap();

        let mut diagnostics = Diagnostics::new();
        let expanded = expand_includes(
            "#include \"common.wgsl\"\nfn main() {}",
            None,
            &[first.clone(), second],
            &mut diagnostics,
        )
        .unwrap();

        assert!(expanded.content.contains("FROM_FIRST"));
        assert!(!expanded.content.contains("FROM_SECOND"));
        assert_eq!(expanded.included, vec![first.join("common.wgsl")]);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_origin_directory_wins_over_search_paths() {
        let dir = scratch_dir("origin");
        let origin = dir.join("origin");
        let search = dir.join("search");
        fs::create_dir_all(&origin).unwrap();
        fs::create_dir_all(&search).unwrap();
        fs::write(origin.join("lib.wgsl"), "const LOCAL: u32 = 1u;").unwrap();
        fs::write(search.join("lib.wgsl"), "const GLOBAL: u32 = 1u;").unwrap();

        let mut diagnostics = Diagnostics::new();
        let expanded = expand_includes(
            "#include \"lib.wgsl\"",
            Some(&origin),
            &[search],
            &mut diagnostics,
        )
        .unwrap();

        assert!(expanded.content.contains("LOCAL"));
        assert!(!expanded.content.contains("GLOBAL"));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_repeated_and_cyclic_includes_expand_once() {
        let dir = scratch_dir("cycle");
        fs::write(dir.join("a.wgsl"), "#include \"b.wgsl\"\nconst A: u32 = 1u;").unwrap();
        fs::write(dir.join("b.wgsl"), "#include \"a.wgsl\"\nconst B: u32 = 2u;").unwrap();

        let mut diagnostics = Diagnostics::new();
        let expanded = expand_includes(
            "#include \"a.wgsl\"\n#include \"b.wgsl\"",
            None,
            &[dir.clone()],
            &mut diagnostics,
        )
        .unwrap();

        assert_eq!(expanded.content.matches("const A").count(), 1);
        assert_eq!(expanded.content.matches("const B").count(), 1);
        assert_eq!(diagnostics.len(), 2);
        assert!(!diagnostics.has_errors());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_include_is_an_error() {
        let mut diagnostics = Diagnostics::new();
        let result = expand_includes("#include \"nowhere.wgsl\"", None, &[], &mut diagnostics);

        assert!(matches!(
            result,
            Err(IncludeError::NotFound { include }) if include == "nowhere.wgsl"
        ));
    }

    #[test]
    fn test_malformed_include_is_an_error() {
        let mut diagnostics = Diagnostics::new();
        let result = expand_includes("fn a() {}\n#include common.wgsl", None, &[], &mut diagnostics);

        assert!(matches!(result, Err(IncludeError::Malformed { line: 2, .. })));
    }
}
