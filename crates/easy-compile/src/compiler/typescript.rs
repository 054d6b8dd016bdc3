use super::{oxc_diagnostic, Compiler, CompilerError, CompilerOutput, Directives};
use oxc_allocator::Allocator;
use oxc_codegen::Codegen;
use oxc_parser::Parser;
use oxc_semantic::SemanticBuilder;
use oxc_span::SourceType;
use oxc_transformer::{TransformOptions, Transformer};
use std::path::Path;

/// TypeScript to JavaScript compiler backed by oxc.
///
/// Type annotations are stripped; no type checking is performed. Parse and
/// transform errors are reported as diagnostics.
pub struct TypescriptCompiler {
    options: TransformOptions,
}

impl TypescriptCompiler {
    pub fn new() -> Self {
        Self { options: TransformOptions::default() }
    }
}

impl Default for TypescriptCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler for TypescriptCompiler {
    fn name(&self) -> &str {
        "typescript"
    }

    fn compile(&self, content: &str, file_path: &Path) -> Result<CompilerOutput, CompilerError> {
        let allocator = Allocator::default();
        let source_type = SourceType::from_path(file_path).unwrap_or_else(|_| SourceType::ts());

        let parsed = Parser::new(&allocator, content, source_type).parse();
        if parsed.panicked || !parsed.errors.is_empty() {
            let diagnostics =
                parsed.errors.iter().map(|e| oxc_diagnostic(self.name(), content, e)).collect();
            return Ok(CompilerOutput::diagnostics(diagnostics));
        }
        let mut program = parsed.program;

        let (symbols, scopes) =
            SemanticBuilder::new().build(&program).semantic.into_symbol_table_and_scope_tree();
        let transformed = Transformer::new(&allocator, file_path, &self.options)
            .build_with_symbols_and_scopes(symbols, scopes, &mut program);
        if !transformed.errors.is_empty() {
            let diagnostics =
                transformed.errors.iter().map(|e| oxc_diagnostic(self.name(), content, e)).collect();
            return Ok(CompilerOutput::diagnostics(diagnostics));
        }

        let Some(out_path) = Directives::parse(content).output_path(file_path, "js") else {
            return Ok(CompilerOutput::default());
        };

        let code = Codegen::new().build(&program).code;
        Ok(CompilerOutput::artifact(out_path, code))
    }
}
