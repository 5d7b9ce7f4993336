use crate::engine::{ObstEngine, RootSearch};

#[derive(Debug, Clone, Default)]
pub struct ObstEngineBuilder {
    root_search: Option<RootSearch>,
}

impl ObstEngineBuilder {
    pub fn new() -> Self {
        Self { root_search: None }
    }
    pub fn with_root_search(mut self, root_search: RootSearch) -> Self {
        self.root_search = Some(root_search);
        self
    }
    pub fn build(self) -> ObstEngine {
        match self.root_search {
            Some(search) => ObstEngine::with_root_search(search),
            None => ObstEngine::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_knuth() {
        assert_eq!(ObstEngineBuilder::new().build().root_search(), RootSearch::Knuth);
    }

    #[test]
    fn explicit_search_is_kept() {
        let engine = ObstEngineBuilder::new()
            .with_root_search(RootSearch::Full)
            .build();
        assert_eq!(engine.root_search(), RootSearch::Full);
    }
}
