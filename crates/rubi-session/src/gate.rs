//! Two-condition barrier: the engine starts only once both the container and
//! the analyzer are available, in whichever order they arrive.

#[derive(Debug)]
pub struct ReadyGate<C, A> {
    container: Option<C>,
    analyzer: Option<A>,
    released: bool,
}

impl<C, A> Default for ReadyGate<C, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, A> ReadyGate<C, A> {
    pub fn new() -> Self {
        Self {
            container: None,
            analyzer: None,
            released: false,
        }
    }

    /// Record the container. Returns `false` if one was already recorded or
    /// the gate has been released.
    pub fn set_container(&mut self, container: C) -> bool {
        if self.released || self.container.is_some() {
            return false;
        }
        self.container = Some(container);
        true
    }

    /// Record the analyzer. Same rules as [`Self::set_container`].
    pub fn set_analyzer(&mut self, analyzer: A) -> bool {
        if self.released || self.analyzer.is_some() {
            return false;
        }
        self.analyzer = Some(analyzer);
        true
    }

    pub fn has_container(&self) -> bool {
        self.container.is_some()
    }

    pub fn has_analyzer(&self) -> bool {
        self.analyzer.is_some()
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Hand out both values once both are present. Returns `Some` at most once.
    pub fn try_release(&mut self) -> Option<(C, A)> {
        if self.released || self.container.is_none() || self.analyzer.is_none() {
            return None;
        }
        self.released = true;
        Some((self.container.take()?, self.analyzer.take()?))
    }
}
