use crate::compiler::{oxc_diagnostic, Compiler, CompilerError, CompilerOutput};
use oxc_allocator::Allocator;
use oxc_codegen::{Codegen, CodegenOptions};
use oxc_minifier::{Minifier, MinifierOptions};
use oxc_parser::Parser;
use oxc_span::SourceType;
use std::path::Path;

/// JavaScript minifier writing `name.min.js` next to `name.js`
pub struct JsMinifier {
    options: MinifierOptions,
}

impl JsMinifier {
    pub fn new() -> Self {
        Self { options: MinifierOptions::default() }
    }
}

impl Default for JsMinifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler for JsMinifier {
    fn name(&self) -> &str {
        "js-minify"
    }

    fn compile(&self, content: &str, file_path: &Path) -> Result<CompilerOutput, CompilerError> {
        let allocator = Allocator::default();
        let source_type = SourceType::from_path(file_path).unwrap_or_else(|_| SourceType::mjs());

        let parsed = Parser::new(&allocator, content, source_type).parse();
        if parsed.panicked || !parsed.errors.is_empty() {
            let diagnostics =
                parsed.errors.iter().map(|e| oxc_diagnostic(self.name(), content, e)).collect();
            return Ok(CompilerOutput::diagnostics(diagnostics));
        }
        let mut program = parsed.program;

        Minifier::new(self.options.clone()).build(&allocator, &mut program);

        let code = Codegen::new()
            .with_options(CodegenOptions { minify: true, ..CodegenOptions::default() })
            .build(&program)
            .code;
        Ok(CompilerOutput::artifact(file_path.with_extension("min.js"), code))
    }
}
