//! Seam to the markup-to-HTML pipeline.
//!
//! Turning markup into client-ready HTML is someone else's job; render
//! engines live out of process and change on their own schedule. The
//! editor only needs a narrow seam it can hand markup to, so hosts
//! plug their engine in behind [`MarkupCompiler`].

/// Result of compiling markup to email HTML.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompiledEmail {
    pub html: String,
    /// Engine diagnostics. Non-empty does not mean the HTML is
    /// unusable; engines emit warnings here too.
    pub errors: Vec<String>,
}

/// A markup-to-HTML engine.
pub trait MarkupCompiler {
    fn compile(&self, markup: &str) -> CompiledEmail;
}

/// Stand-in engine that returns the markup unchanged. Keeps previews
/// and tests wired up when no real engine is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughCompiler;

impl MarkupCompiler for PassthroughCompiler {
    fn compile(&self, markup: &str) -> CompiledEmail {
        CompiledEmail {
            html: markup.to_string(),
            errors: Vec::new(),
        }
    }
}
