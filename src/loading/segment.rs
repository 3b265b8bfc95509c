//! Splitting marked-up step text into fragments: `_name_` for variables,
//! `*value*` for literals, `~name~` for enumeration values, `|Symbol|`
//! for grammar productions, and inline `<tags>` carried through whole.

use crate::compile;
use crate::language::{FragmentKind, FragmentNode};

pub fn segment(text: &str) -> Vec<FragmentNode<'_>> {
    segment_at(text, 0)
}

/// Fragment offsets are `base` plus the position of the fragment's first
/// character, the opening marker for formatted spans.
pub fn segment_at(text: &str, base: usize) -> Vec<FragmentNode<'_>> {
    let re = compile!(
        r"(?x)
          (?P<variable>_[A-Za-z][A-Za-z0-9]*_)
        | (?P<literal>\*[^*\n]+\*)
        | (?P<enumeration>~[a-zA-Z0-9+_-]+~)
        | (?P<nonterminal>\|[A-Za-z][A-Za-z0-9]*\|)
        | (?P<tag><[^>\n]+>)
    "
    );

    let mut out = Vec::new();
    let mut last = 0;
    for caps in re.captures_iter(text) {
        let matched = caps
            .get(0)
            .unwrap();
        if matched.start() > last {
            out.push(FragmentNode::text(
                &text[last..matched.start()],
                base + last,
            ));
        }

        let span = matched.as_str();
        let inner = &span[1..span.len() - 1];
        let kind = if caps
            .name("variable")
            .is_some()
        {
            FragmentKind::Variable(inner)
        } else if caps
            .name("literal")
            .is_some()
        {
            FragmentKind::Literal(inner)
        } else if caps
            .name("enumeration")
            .is_some()
        {
            FragmentKind::EnumValue(inner)
        } else if caps
            .name("nonterminal")
            .is_some()
        {
            FragmentKind::Nonterminal(inner)
        } else if caps
            .name("tag")
            .is_some()
        {
            FragmentKind::Tag(span)
        } else {
            unreachable!("segment pattern matched without a named group")
        };

        out.push(FragmentNode {
            kind,
            offset: base + matched.start(),
        });
        last = matched.end();
    }

    if last < text.len() {
        out.push(FragmentNode::text(&text[last..], base + last));
    }
    out
}

#[cfg(test)]
mod check {
    use super::*;

    #[test]
    fn spans_and_surrounding_text() {
        let fragments = segment("Let _x_ be *true*.");
        assert_eq!(
            fragments,
            vec![
                FragmentNode::text("Let ", 0),
                FragmentNode {
                    kind: FragmentKind::Variable("x"),
                    offset: 4,
                },
                FragmentNode::text(" be ", 7),
                FragmentNode {
                    kind: FragmentKind::Literal("true"),
                    offset: 11,
                },
                FragmentNode::text(".", 17),
            ]
        );
    }

    #[test]
    fn all_span_kinds() {
        let fragments = segment("~empty~ |Expression| <sub>x</sub>");
        assert_eq!(
            fragments[0].kind,
            FragmentKind::EnumValue("empty")
        );
        assert_eq!(
            fragments[2].kind,
            FragmentKind::Nonterminal("Expression")
        );
        assert_eq!(fragments[4].kind, FragmentKind::Tag("<sub>"));
    }

    #[test]
    fn base_offset_shifts_everything() {
        let fragments = segment_at("_x_", 40);
        assert_eq!(
            fragments,
            vec![FragmentNode {
                kind: FragmentKind::Variable("x"),
                offset: 40,
            }]
        );
    }

    #[test]
    fn widths_match_the_source() {
        for fragment in segment("Let _x_ be *\"words\"* now") {
            let end = fragment.offset + fragment.width();
            assert!(end <= "Let _x_ be *\"words\"* now".len());
        }
    }
}
