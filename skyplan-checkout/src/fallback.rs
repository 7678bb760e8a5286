use serde::Serialize;

/// A value together with the fallback source that supplied it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resolved<T, S> {
    pub value: T,
    pub source: S,
}

/// Ordered candidates for one field; the first present value wins.
#[derive(Debug, Clone)]
pub struct FallbackChain<T, S> {
    candidates: Vec<(S, Option<T>)>,
}

impl<T, S> Default for FallbackChain<T, S> {
    fn default() -> Self {
        Self { candidates: Vec::new() }
    }
}

impl<T, S> FallbackChain<T, S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, source: S, value: Option<T>) -> Self {
        self.candidates.push((source, value));
        self
    }

    pub fn resolve_or(self, source: S, default: T) -> Resolved<T, S> {
        self.candidates
            .into_iter()
            .find_map(|(source, value)| value.map(|value| Resolved { value, source }))
            .unwrap_or(Resolved { value: default, source })
    }
}
