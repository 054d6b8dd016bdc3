use super::{CompileKind, Compiler, LessCompiler, SassCompiler, TypescriptCompiler};
use crate::minify::{CssMinifier, JsMinifier};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Registry of compilers mapped by [`CompileKind`]
pub struct CompilerRegistry {
    compilers: FxHashMap<CompileKind, Arc<dyn Compiler>>,
}

impl CompilerRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self { compilers: FxHashMap::default() }
    }

    /// Create a registry holding the built-in tool for every kind
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for kind in CompileKind::ALL {
            registry.register(kind, builtin(kind));
        }
        registry
    }

    /// Register a compiler for `kind`, replacing any previous one
    pub fn register(&mut self, kind: CompileKind, compiler: Arc<dyn Compiler>) {
        self.compilers.insert(kind, compiler);
    }

    pub fn get(&self, kind: CompileKind) -> Option<&Arc<dyn Compiler>> {
        self.compilers.get(&kind)
    }

    pub fn has_compiler(&self, kind: CompileKind) -> bool {
        self.compilers.contains_key(&kind)
    }
}

impl Default for CompilerRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// The built-in tool for `kind`
fn builtin(kind: CompileKind) -> Arc<dyn Compiler> {
    match kind {
        CompileKind::Less => Arc::new(LessCompiler::new()),
        CompileKind::Sass => Arc::new(SassCompiler::new()),
        CompileKind::TypeScript => Arc::new(TypescriptCompiler::new()),
        CompileKind::Css => Arc::new(CssMinifier::new()),
        CompileKind::Js => Arc::new(JsMinifier::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_cover_every_kind() {
        let registry = CompilerRegistry::with_builtins();
        for kind in CompileKind::ALL {
            assert!(registry.has_compiler(kind), "missing compiler for {kind}");
        }
        assert_eq!(registry.get(CompileKind::Sass).map(|c| c.name()), Some("sass"));
        assert_eq!(registry.get(CompileKind::Js).map(|c| c.name()), Some("js-minify"));
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = CompilerRegistry::new();
        assert!(!registry.has_compiler(CompileKind::Less));

        registry.register(CompileKind::Less, Arc::new(SassCompiler::new()));
        assert_eq!(registry.get(CompileKind::Less).map(|c| c.name()), Some("sass"));
    }
}
