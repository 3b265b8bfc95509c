//! Pre-segmented rich text. A step arrives from the front end as a flat
//! sequence of fragments: runs of plain text interleaved with the
//! formatting spans the markup language gives meaning to (italics for
//! variables, bold for literal values, tildes for enumeration values,
//! pipes for grammar symbols) and opaque inline tags.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind<'i> {
    /// Free text, owned by no formatting span.
    Text(&'i str),
    /// `_name_`, an algorithm variable.
    Variable(&'i str),
    /// `*value*`, a literal value.
    Literal(&'i str),
    /// `~name~`, an enumeration value.
    EnumValue(&'i str),
    /// `|Symbol|`, a reference to a grammar production.
    Nonterminal(&'i str),
    /// An inline tag, carried through without interpretation.
    Tag(&'i str),
}

/// One fragment plus the byte offset of its first character (the opening
/// marker, for formatted spans) in the document source. Fragments are
/// immutable; the parser only ever slices the text ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FragmentNode<'i> {
    pub kind: FragmentKind<'i>,
    pub offset: usize,
}

impl<'i> FragmentNode<'i> {
    pub fn text(content: &'i str, offset: usize) -> FragmentNode<'i> {
        FragmentNode {
            kind: FragmentKind::Text(content),
            offset,
        }
    }

    /// Width in the source, counting the enclosing markers of formatted
    /// spans. A fragment sequence ends at `offset + width` of its last
    /// element.
    pub fn width(&self) -> usize {
        match self.kind {
            FragmentKind::Text(content) => content.len(),
            FragmentKind::Variable(content)
            | FragmentKind::Literal(content)
            | FragmentKind::EnumValue(content)
            | FragmentKind::Nonterminal(content) => content.len() + 2,
            FragmentKind::Tag(content) => content.len(),
        }
    }

    /// True for text fragments containing nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        match self.kind {
            FragmentKind::Text(content) => content
                .trim()
                .is_empty(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod check {
    use super::*;

    #[test]
    fn widths_count_markers() {
        let plain = FragmentNode::text("Let ", 0);
        assert_eq!(plain.width(), 4);

        let variable = FragmentNode {
            kind: FragmentKind::Variable("foo"),
            offset: 4,
        };
        assert_eq!(variable.width(), 5);
    }

    #[test]
    fn blankness() {
        assert!(FragmentNode::text("  \n", 0).is_blank());
        assert!(!FragmentNode::text(" x ", 0).is_blank());
        assert!(!FragmentNode {
            kind: FragmentKind::Variable("x"),
            offset: 0
        }
        .is_blank());
    }
}
