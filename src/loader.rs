use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Instant;

use rubi_core::analyzer::{Analyzer, DictionaryAnalyzer};
use rubi_core::dict::DictError;
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("dictionary: {0}")]
    Dict(#[from] DictError),
    #[error("analyzer construction failed: {0}")]
    Build(String),
    #[error("failed to spawn loader thread: {0}")]
    Spawn(String),
    #[error("loader thread exited without a result")]
    WorkerLost,
}

pub type LoadResult = Result<Arc<dyn Analyzer>, LoadError>;

pub enum LoadStatus {
    Pending,
    Ready(Arc<dyn Analyzer>),
    Failed(LoadError),
    /// The result was already handed out.
    Finished,
}

/// One-shot background construction of the analyzer.
///
/// The result is delivered exactly once through [`AnalyzerLoader::poll`],
/// which never blocks.
pub struct AnalyzerLoader {
    rx: mpsc::Receiver<LoadResult>,
    done: bool,
}

impl AnalyzerLoader {
    /// Open the reading dictionary at `dict_path` (file or asset directory)
    /// on a background thread.
    pub fn spawn(dict_path: impl Into<PathBuf>) -> Self {
        let path = dict_path.into();
        Self::spawn_with(move || {
            let analyzer = DictionaryAnalyzer::open(&path)?;
            let (surfaces, entries) = analyzer.dictionary().stats();
            debug!(path = %path.display(), surfaces, entries, "dictionary opened");
            Ok(Arc::new(analyzer) as Arc<dyn Analyzer>)
        })
    }

    pub fn spawn_with<F>(build: F) -> Self
    where
        F: FnOnce() -> LoadResult + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<LoadResult>();
        let worker_tx = tx.clone();
        let spawned = thread::Builder::new()
            .name("rubi-analyzer-loader".into())
            .spawn(move || {
                let start = Instant::now();
                let result = build();
                if result.is_ok() {
                    info!(elapsed_ms = start.elapsed().as_millis() as u64, "analyzer ready");
                }
                let _ = worker_tx.send(result);
            });
        if let Err(e) = spawned {
            let _ = tx.send(Err(LoadError::Spawn(e.to_string())));
        }
        Self { rx, done: false }
    }

    /// A loader whose analyzer is already available.
    pub fn ready(analyzer: Arc<dyn Analyzer>) -> Self {
        let (tx, rx) = mpsc::channel::<LoadResult>();
        let _ = tx.send(Ok(analyzer));
        Self { rx, done: false }
    }

    pub fn is_finished(&self) -> bool {
        self.done
    }

    pub fn poll(&mut self) -> LoadStatus {
        if self.done {
            return LoadStatus::Finished;
        }
        match self.rx.try_recv() {
            Ok(result) => {
                self.done = true;
                match result {
                    Ok(analyzer) => LoadStatus::Ready(analyzer),
                    Err(e) => LoadStatus::Failed(e),
                }
            }
            Err(mpsc::TryRecvError::Empty) => LoadStatus::Pending,
            Err(mpsc::TryRecvError::Disconnected) => {
                self.done = true;
                LoadStatus::Failed(LoadError::WorkerLost)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rubi_core::analyzer::{AnalyzerError, Token};

    use super::*;

    struct Echo;

    impl Analyzer for Echo {
        fn tokenize(&self, text: &str) -> Result<Vec<Token>, AnalyzerError> {
            Ok(vec![Token::new(text, None)])
        }
    }

    fn wait(loader: &mut AnalyzerLoader) -> LoadStatus {
        for _ in 0..500 {
            match loader.poll() {
                LoadStatus::Pending => thread::sleep(Duration::from_millis(2)),
                other => return other,
            }
        }
        panic!("loader did not finish");
    }

    #[test]
    fn test_ready_then_finished() {
        let mut loader = AnalyzerLoader::spawn_with(|| Ok(Arc::new(Echo) as Arc<dyn Analyzer>));
        assert!(matches!(wait(&mut loader), LoadStatus::Ready(_)));
        assert!(loader.is_finished());
        assert!(matches!(loader.poll(), LoadStatus::Finished));
    }

    #[test]
    fn test_build_error_reported_once() {
        let mut loader = AnalyzerLoader::spawn_with(|| Err(LoadError::Build("boom".into())));
        match wait(&mut loader) {
            LoadStatus::Failed(LoadError::Build(msg)) => assert_eq!(msg, "boom"),
            _ => panic!("expected build failure"),
        }
        assert!(matches!(loader.poll(), LoadStatus::Finished));
    }

    #[test]
    fn test_panicking_builder_is_worker_lost() {
        let mut loader = AnalyzerLoader::spawn_with(|| panic!("builder panicked"));
        assert!(matches!(
            wait(&mut loader),
            LoadStatus::Failed(LoadError::WorkerLost)
        ));
    }

    #[test]
    fn test_missing_dictionary() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = AnalyzerLoader::spawn(dir.path().join("missing.dict"));
        assert!(matches!(
            wait(&mut loader),
            LoadStatus::Failed(LoadError::Dict(DictError::Io(_)))
        ));
    }

    #[test]
    fn test_prebuilt() {
        let mut loader = AnalyzerLoader::ready(Arc::new(Echo));
        assert!(matches!(loader.poll(), LoadStatus::Ready(_)));
    }
}
