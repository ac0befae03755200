//! Node and router traits.

use async_trait::async_trait;

use crate::errors::PipelineError;

/// One processing step: state in, updated state out.
///
/// The node owns the state while it runs. On failure it returns the error
/// without handing the state back, so a failed step never leaves a partial
/// write visible to the caller.
#[async_trait]
pub trait Node<S>: Send + Sync
where
    S: Send + 'static,
{
    async fn run(&self, state: S) -> Result<S, PipelineError>;
}

/// Picks the next step after a node, based on the state that node produced.
///
/// Routers return labels; a conditional edge's path map turns labels into
/// node ids (or [`super::END`]). [`Router::labels`] lists every label
/// [`Router::route`] can return so that assembly can check the path map is
/// complete.
pub trait Router<S>: Send + Sync {
    /// Every label [`Router::route`] may return.
    fn labels(&self) -> &[&'static str];

    /// Chooses a label. Must not mutate anything beyond logging.
    fn route(&self, state: &S) -> &'static str;
}
