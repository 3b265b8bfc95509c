//! Tokenizing a fragment sequence. Only text fragments are scanned;
//! formatted spans and tags pass straight through as prose material. The
//! combined pattern matches, in priority order: list and record and
//! parenthesis delimiters, "and" (with or without a leading comma),
//! " is ", a period ending a clause, a bare comma, an identifier followed
//! by " of " (a candidate syntax-directed operation invocation), and
//! " with argument(s) ".

use crate::compile;
use crate::language::{FragmentKind, FragmentNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    ListOpen,
    ListClose,
    RecordOpen,
    RecordClose,
    ParenOpen,
    ParenClose,
    And,
    Is,
    Period,
    Comma,
    SdoOf,
    WithArguments,
    Eof,
}

impl TokenKind {
    /// The name used in diagnostics, as in "unexpected eof (expected
    /// close parenthesis)".
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::ListOpen => "open list",
            TokenKind::ListClose => "close list",
            TokenKind::RecordOpen => "open record",
            TokenKind::RecordClose => "close record",
            TokenKind::ParenOpen => "open parenthesis",
            TokenKind::ParenClose => "close parenthesis",
            TokenKind::And => "'and'",
            TokenKind::Is => "'is'",
            TokenKind::Period => "period",
            TokenKind::Comma => "comma",
            TokenKind::SdoOf => "'of'",
            TokenKind::WithArguments => "'with arguments'",
            TokenKind::Eof => "eof",
        }
    }
}

/// One unit of the token stream: either prose material (a fragment, or a
/// slice of one) or a structural token carrying its source text so it can
/// be folded back into prose where the grammar treats it as ordinary
/// words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tok<'i> {
    Fragment(FragmentNode<'i>),
    Token {
        kind: TokenKind,
        text: &'i str,
        offset: usize,
    },
}

pub fn tokenize<'i>(fragments: &[FragmentNode<'i>]) -> Vec<Tok<'i>> {
    let mut out = Vec::new();
    for node in fragments {
        match node.kind {
            FragmentKind::Text(content) => scan_text(content, node.offset, &mut out),
            _ => out.push(Tok::Fragment(*node)),
        }
    }
    out
}

fn scan_text<'i>(content: &'i str, base: usize, out: &mut Vec<Tok<'i>>) {
    // Alternation order is the priority order; the regex engine prefers
    // earlier branches at the same starting position.
    let re = compile!(
        r"(?x)
          (?P<olist>«)
        | (?P<clist>»)
        | (?P<orec>\{)
        | (?P<crec>\})
        | (?P<oparen>\()
        | (?P<cparen>\))
        | (?P<and>,\ and\ |\band\ )
        | (?P<is>\ is\ )
        | (?P<period>\.(?:[\ \n]|$))
        | (?P<comma>,)
        | (?P<sdo>\b[A-Za-z][A-Za-z0-9]*\ of\ )
        | (?P<with>\ with\ arguments?\ )
    "
    );

    let mut last = 0;
    for caps in re.captures_iter(content) {
        let matched = caps
            .get(0)
            .unwrap();
        if matched.start() > last {
            out.push(Tok::Fragment(FragmentNode::text(
                &content[last..matched.start()],
                base + last,
            )));
        }

        let kind = if caps
            .name("olist")
            .is_some()
        {
            TokenKind::ListOpen
        } else if caps
            .name("clist")
            .is_some()
        {
            TokenKind::ListClose
        } else if caps
            .name("orec")
            .is_some()
        {
            TokenKind::RecordOpen
        } else if caps
            .name("crec")
            .is_some()
        {
            TokenKind::RecordClose
        } else if caps
            .name("oparen")
            .is_some()
        {
            TokenKind::ParenOpen
        } else if caps
            .name("cparen")
            .is_some()
        {
            TokenKind::ParenClose
        } else if caps
            .name("and")
            .is_some()
        {
            TokenKind::And
        } else if caps
            .name("is")
            .is_some()
        {
            TokenKind::Is
        } else if caps
            .name("period")
            .is_some()
        {
            TokenKind::Period
        } else if caps
            .name("comma")
            .is_some()
        {
            TokenKind::Comma
        } else if caps
            .name("sdo")
            .is_some()
        {
            TokenKind::SdoOf
        } else if caps
            .name("with")
            .is_some()
        {
            TokenKind::WithArguments
        } else {
            unreachable!("token pattern matched without a named group")
        };

        out.push(Tok::Token {
            kind,
            text: matched.as_str(),
            offset: base + matched.start(),
        });
        last = matched.end();
    }

    if last < content.len() {
        out.push(Tok::Fragment(FragmentNode::text(
            &content[last..],
            base + last,
        )));
    }
}
