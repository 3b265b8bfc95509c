//! The expression tree built from one algorithm step. This is a closed set
//! of variants; consumers match exhaustively so that extending the grammar
//! without updating them is a compile error, not a silent gap.

use crate::language::{FragmentKind, FragmentNode};

/// An ordered concatenation of expressions, the "just some text"
/// container. Every structured position (a call argument, a list element,
/// the contents of parentheses) holds one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seq<'i> {
    pub items: Vec<Expr<'i>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr<'i> {
    Prose(Prose<'i>),
    List(List<'i>),
    Record(Record<'i>),
    RecordSpec(RecordSpec<'i>),
    Call(Call<'i>),
    SdoCall(SdoCall<'i>),
    Paren(Paren<'i>),
}

/// Coalesced free text: adjacent fragments, including ones spanning a tag
/// boundary, collect into a single prose node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prose<'i> {
    pub parts: Vec<FragmentNode<'i>>,
}

/// `« a, b, c »`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct List<'i> {
    pub elements: Vec<Seq<'i>>,
    pub offset: usize,
}

/// `{ [[Name]]: value, ... }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record<'i> {
    pub members: Vec<RecordMember<'i>>,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordMember<'i> {
    pub name: &'i str,
    pub value: Seq<'i>,
    pub offset: usize,
}

/// `{ [[Name]], ... }`, member names without values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSpec<'i> {
    pub names: Vec<&'i str>,
    pub offset: usize,
}

/// `Callee(arg, ...)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call<'i> {
    pub callee: &'i str,
    pub arguments: Vec<Seq<'i>>,
    pub offset: usize,
}

/// `Callee of node [with arguments ...]`, a syntax-directed operation
/// invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdoCall<'i> {
    pub callee: &'i str,
    pub parse_node: Seq<'i>,
    pub arguments: Vec<Seq<'i>>,
    pub offset: usize,
}

/// A parenthesized sub-expression that is not a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paren<'i> {
    pub inner: Seq<'i>,
    pub offset: usize,
}

impl<'i> Prose<'i> {
    /// Offset of the first part. Prose nodes are never constructed empty.
    pub fn offset(&self) -> usize {
        self.parts[0].offset
    }

    /// All parts are blank text.
    pub fn is_blank(&self) -> bool {
        self.parts
            .iter()
            .all(|part| part.is_blank())
    }

    /// The trailing run of meaningful text, used when a caller needs to
    /// know what immediately precedes the following sibling. Blank text
    /// and tags are skipped; any other formatted span blocks the view.
    pub fn trailing_text(&self) -> Option<&'i str> {
        for part in self
            .parts
            .iter()
            .rev()
        {
            match part.kind {
                FragmentKind::Text(_) if part.is_blank() => continue,
                FragmentKind::Text(content) => return Some(content.trim_end()),
                FragmentKind::Tag(_) => continue,
                _ => return None,
            }
        }
        None
    }
}

impl<'i> Expr<'i> {
    pub fn offset(&self) -> usize {
        match self {
            Expr::Prose(prose) => prose.offset(),
            Expr::List(list) => list.offset,
            Expr::Record(record) => record.offset,
            Expr::RecordSpec(spec) => spec.offset,
            Expr::Call(call) => call.offset,
            Expr::SdoCall(call) => call.offset,
            Expr::Paren(paren) => paren.offset,
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Expr::Prose(prose) => prose.is_blank(),
            _ => false,
        }
    }
}

impl<'i> Seq<'i> {
    pub fn offset(&self) -> Option<usize> {
        self.items
            .first()
            .map(|item| item.offset())
    }

    /// Empty, or containing nothing but blank prose.
    pub fn is_blank(&self) -> bool {
        self.items
            .iter()
            .all(|item| item.is_blank())
    }

    /// Whether any text in the sequence spans a line break. Decides
    /// whether a trailing separator is the conventional multi-line style.
    pub fn has_line_break(&self) -> bool {
        self.items
            .iter()
            .any(|item| match item {
                Expr::Prose(prose) => prose
                    .parts
                    .iter()
                    .any(|part| match part.kind {
                        FragmentKind::Text(content) => content.contains('\n'),
                        _ => false,
                    }),
                _ => false,
            })
    }
}

#[cfg(test)]
mod check {
    use super::*;

    #[test]
    fn blank_sequences() {
        let empty = Seq { items: vec![] };
        assert!(empty.is_blank());

        let blank = Seq {
            items: vec![Expr::Prose(Prose {
                parts: vec![FragmentNode::text("  \n  ", 0)],
            })],
        };
        assert!(blank.is_blank());
        assert!(blank.has_line_break());

        let full = Seq {
            items: vec![Expr::Prose(Prose {
                parts: vec![FragmentNode::text("words", 0)],
            })],
        };
        assert!(!full.is_blank());
    }

    #[test]
    fn trailing_text_skips_tags_and_blanks() {
        let prose = Prose {
            parts: vec![
                FragmentNode::text("Let it be ! ", 0),
                FragmentNode {
                    kind: FragmentKind::Tag("<sub>"),
                    offset: 12,
                },
                FragmentNode::text("  ", 17),
            ],
        };
        assert_eq!(prose.trailing_text(), Some("Let it be !"));

        let blocked = Prose {
            parts: vec![
                FragmentNode::text("! ", 0),
                FragmentNode {
                    kind: FragmentKind::Variable("x"),
                    offset: 2,
                },
            ],
        };
        assert_eq!(blocked.trailing_text(), None);
    }
}
