//! Media query grouping post-processor.
//!
//! Merges top-level `@media` blocks that share the same query and moves the
//! merged blocks after all other rules, in the order each query first appeared.

use super::CompilerError;
use lightningcss::media_query::MediaList;
use lightningcss::rules::media::MediaRule;
use lightningcss::rules::CssRule;
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::traits::ToCss;

pub fn group_media_queries(css: &str, minify: bool) -> Result<String, CompilerError> {
    let mut sheet = StyleSheet::parse(css, ParserOptions::default())
        .map_err(|e| CompilerError::CompileFailed(format!("media query grouping: {e}")))?;

    let rules = std::mem::take(&mut sheet.rules.0);
    let mut grouped: Vec<(String, MediaRule)> = Vec::new();
    let mut others = Vec::with_capacity(rules.len());

    for rule in rules {
        match rule {
            CssRule::Media(media) => {
                let key = query_key(&media.query)?;
                match grouped.iter_mut().find(|(existing, _)| *existing == key) {
                    Some((_, target)) => target.rules.0.extend(media.rules.0),
                    None => grouped.push((key, media)),
                }
            }
            other => others.push(other),
        }
    }

    others.extend(grouped.into_iter().map(|(_, media)| CssRule::Media(media)));
    sheet.rules.0 = others;

    let printed = sheet
        .to_css(PrinterOptions { minify, ..PrinterOptions::default() })
        .map_err(|e| CompilerError::Output(e.to_string()))?;
    Ok(printed.code)
}

fn query_key(query: &MediaList) -> Result<String, CompilerError> {
    query
        .to_css_string(PrinterOptions { minify: true, ..PrinterOptions::default() })
        .map_err(|e| CompilerError::Output(e.to_string()))
}
