//! Turn segmented runs into detached document nodes.

use rubi_core::segment::Run;
use rubi_core::settings::MarkupSettings;
use tracing::debug;

use crate::dom::{Document, DomError, Fragment, NodeId};

/// Build a detached fragment for `runs`.
///
/// Literal runs become text nodes. Candidate runs become
/// `<span class="ruby-candidate" data-surface="…">surface</span>` (names
/// from `markup`) in the plain state. Runs with empty text are skipped.
pub fn materialize(
    doc: &mut Document,
    runs: &[Run],
    markup: &MarkupSettings,
) -> Result<Fragment, DomError> {
    let mut fragment = Fragment::new();
    for run in runs {
        match run {
            Run::Literal { text } if !text.is_empty() => fragment.push(doc.create_text(text)),
            Run::Candidate { surface } if !surface.is_empty() => {
                fragment.push(create_candidate(doc, surface, markup)?);
            }
            _ => {}
        }
    }
    debug!(nodes = fragment.len());
    Ok(fragment)
}

/// Create one candidate element in the plain state.
pub fn create_candidate(
    doc: &mut Document,
    surface: &str,
    markup: &MarkupSettings,
) -> Result<NodeId, DomError> {
    let el = doc.create_element(&markup.candidate_tag);
    doc.add_class(el, &markup.candidate_class)?;
    doc.set_attr(el, &markup.surface_attr, surface)?;
    doc.append_text(el, surface)?;
    Ok(el)
}

#[cfg(test)]
mod tests {
    use rubi_core::segment::segment;
    use rubi_core::settings::settings;

    use super::*;

    #[test]
    fn test_materialize_sentence() {
        let mut doc = Document::new();
        let markup = &settings().markup;
        let frag = materialize(&mut doc, &segment("私は猫。"), markup).unwrap();
        assert_eq!(frag.len(), 4);

        let nodes = frag.nodes();
        assert!(doc.is_element(nodes[0]));
        assert!(doc.is_text(nodes[1]));
        assert!(doc.is_element(nodes[2]));
        assert_eq!(doc.text(nodes[3]), Some("。"));
        for &n in nodes {
            assert_eq!(doc.parent(n), None, "fragment nodes stay detached");
        }
        assert_eq!(
            doc.to_markup(nodes[2]),
            "<span class=\"ruby-candidate\" data-surface=\"猫\">猫</span>"
        );
    }

    #[test]
    fn test_materialize_skips_empty_runs() {
        let mut doc = Document::new();
        let runs = vec![
            Run::literal(""),
            Run::candidate(""),
            Run::literal("a"),
            Run::candidate("漢"),
        ];
        let frag = materialize(&mut doc, &runs, &settings().markup).unwrap();
        assert_eq!(frag.len(), 2);
    }

    #[test]
    fn test_materialize_empty() {
        let mut doc = Document::new();
        let frag = materialize(&mut doc, &[], &settings().markup).unwrap();
        assert!(frag.is_empty());
    }
}
