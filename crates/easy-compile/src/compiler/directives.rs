use path_clean::PathClean;
use std::path::{Path, PathBuf};

/// Where compiled output goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutTarget {
    /// Next to the source, with the output extension
    Sibling,
    /// `out: false`: compile for diagnostics only
    Disabled,
    /// Relative to the source directory; a trailing separator names a directory
    Path(String),
}

/// Options read from a leading comment such as
/// `// out: ../css/site.css, compress: true, groupmedia: true`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directives {
    pub out: OutTarget,
    pub compress: bool,
    pub group_media: bool,
}

impl Default for Directives {
    fn default() -> Self {
        Self { out: OutTarget::Sibling, compress: false, group_media: false }
    }
}

impl Directives {
    /// Parse the first line of `source`. Anything that is not a recognised
    /// `key: value` pair inside a leading comment is ignored.
    pub fn parse(source: &str) -> Self {
        let mut directives = Directives::default();

        let first_line = source.trim_start_matches('\u{feff}').lines().next().unwrap_or("").trim();
        let body = if let Some(rest) = first_line.strip_prefix("//") {
            rest
        } else if let Some(rest) = first_line.strip_prefix("/*") {
            rest.trim_end().trim_end_matches("*/")
        } else {
            return directives;
        };

        for pair in body.split(',') {
            let Some((key, value)) = pair.split_once(':') else {
                continue;
            };
            let value = value.trim();
            match key.trim().to_ascii_lowercase().as_str() {
                "out" => {
                    directives.out = match value {
                        "false" => OutTarget::Disabled,
                        "" | "true" => OutTarget::Sibling,
                        path => OutTarget::Path(path.to_string()),
                    }
                }
                "compress" => directives.compress = value == "true",
                "groupmedia" => directives.group_media = value == "true",
                _ => {}
            }
        }

        directives
    }

    /// Output file for `source_path`, or `None` when output is disabled
    pub fn output_path(&self, source_path: &Path, extension: &str) -> Option<PathBuf> {
        match &self.out {
            OutTarget::Sibling => Some(source_path.with_extension(extension)),
            OutTarget::Disabled => None,
            OutTarget::Path(out) => {
                let dir = source_path.parent().unwrap_or(Path::new(""));
                let target = dir.join(out);
                if out.ends_with('/') || out.ends_with('\\') {
                    let stem = source_path.file_stem()?;
                    Some(target.join(stem).with_extension(extension).clean())
                } else {
                    Some(target.clean())
                }
            }
        }
    }
}
