use std::fs;
use std::path::Path;
use std::sync::Mutex;

use serde::Serialize;

use rubi_core::segment::{segment_with, Run};
use rubi_core::settings::{settings, Settings};
use rubi_engine::{AnalyzerLoader, CancelToken, EngineError, Orchestrator};
use rubi_session::dom::{Document, DomError, NodeId, Selector, SelectorError};
use rubi_session::ToggleOutcome;

#[derive(Debug, thiserror::Error)]
pub enum AnnotateError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("invalid mount selector: {0}")]
    Selector(#[from] SelectorError),
    #[error("building document: {0}")]
    Dom(#[from] DomError),
    #[error("engine settled without a container")]
    NoEngine,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct AnnotateReport {
    pub markup: String,
    pub candidates: usize,
    pub annotated: usize,
    pub aborted: usize,
}

#[derive(Serialize)]
struct SegmentReport<'a> {
    input: &'a str,
    runs: &'a [Run],
}

pub fn segment(text: &str, json: bool) {
    let runs = segment_with(text, &settings().classifier.classifier());
    if json {
        let report = SegmentReport { input: text, runs: &runs };
        println!(
            "{}",
            die!(serde_json::to_string_pretty(&report), "Error: {}")
        );
        return;
    }
    for run in &runs {
        let kind = if run.is_candidate() { "C" } else { "L" };
        println!("{kind}  {:?}", run.text());
    }
}

/// Build a container matching `selector` holding one `<p>` per non-empty
/// line of `text`.
pub fn build_document(text: &str, selector: &Selector) -> Result<(Document, NodeId), DomError> {
    let mut doc = Document::new();
    let container = selector.create_element(&mut doc)?;
    doc.append_child(doc.root(), container)?;
    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        let p = doc.append_element(container, "p")?;
        doc.append_text(p, line)?;
    }
    Ok((doc, container))
}

/// Run the orchestrator over `text` until it is active, optionally
/// annotating every candidate.
pub fn annotate_text(
    loader: AnalyzerLoader,
    text: &str,
    toggle_all: bool,
    settings: &Settings,
) -> Result<AnnotateReport, AnnotateError> {
    let selector = Selector::parse(&settings.mount.selector)?;
    let (doc, container) = build_document(text, &selector)?;
    let doc = Mutex::new(doc);
    let mut orch = Orchestrator::with_settings(loader, settings)?;
    orch.run_until_settled(&doc, &CancelToken::new())?;

    let mut doc = doc.into_inner().unwrap_or_else(|e| e.into_inner());
    let engine = orch.engine_mut().ok_or(AnnotateError::NoEngine)?;
    let mut report = AnnotateReport {
        candidates: engine.candidates().len(),
        ..Default::default()
    };
    if toggle_all {
        for id in engine.candidates() {
            match engine.toggle(&mut doc, id) {
                ToggleOutcome::Toggled(_) => report.annotated += 1,
                ToggleOutcome::Aborted(_) => report.aborted += 1,
                _ => {}
            }
        }
    }
    report.markup = doc.inner_markup(container);
    Ok(report)
}

pub fn annotate(dict_file: &str, file: &str, toggle_all: bool) {
    let text = die!(fs::read_to_string(file), "Error reading {file}: {}");
    let loader = AnalyzerLoader::spawn(Path::new(dict_file));
    let report = die!(
        annotate_text(loader, &text, toggle_all, settings()),
        "Error: {}"
    );
    println!("{}", report.markup);
    eprintln!(
        "{} candidates, {} annotated, {} aborted",
        report.candidates, report.annotated, report.aborted
    );
}
