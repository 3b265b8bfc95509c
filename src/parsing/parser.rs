//! The recursive step parser. One routine, `parse_seq`, does all the
//! work; it is parameterized by the set of tokens its caller will accept
//! as terminators and recurses with different close sets for list
//! elements, call arguments, record members, and the top level. It never
//! returns without stopping at one of those terminators; anything else is
//! a structured failure carrying the offending offset.

use std::collections::HashSet;

use crate::compile;
use crate::language::{
    Call, Expr, FragmentKind, FragmentNode, List, Paren, Prose, Record, RecordMember, RecordSpec,
    SdoCall, Seq,
};
use crate::parsing::tokens::{tokenize, Tok, TokenKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsingError {
    /// A closing token with no matching opener, or end of input where a
    /// terminator was required. Carries what was found and the English
    /// list of terminators that would have been acceptable.
    UnexpectedToken(usize, String, String),
    /// A trailing separator introduced an element with nothing in it.
    MissingContent(usize, &'static str),
    InvalidRecordMember(usize),
    MixedRecordMembers(usize),
    DuplicateRecordMember(usize, String),
}

impl ParsingError {
    pub fn offset(&self) -> usize {
        match self {
            ParsingError::UnexpectedToken(offset, _, _) => *offset,
            ParsingError::MissingContent(offset, _) => *offset,
            ParsingError::InvalidRecordMember(offset) => *offset,
            ParsingError::MixedRecordMembers(offset) => *offset,
            ParsingError::DuplicateRecordMember(offset, _) => *offset,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ParsingError::UnexpectedToken(_, found, expected) => {
                format!("unexpected {} (expected {})", found, expected)
            }
            ParsingError::MissingContent(_, expected) => format!("expected {}", expected),
            ParsingError::InvalidRecordMember(_) => {
                "expected a record member of the form [[name]] or [[name]]: value".to_string()
            }
            ParsingError::MixedRecordMembers(_) => {
                "record members cannot mix the [[name]] and [[name]]: value forms".to_string()
            }
            ParsingError::DuplicateRecordMember(_, name) => {
                format!("duplicate record member name [[{}]]", name)
            }
        }
    }
}

/// Parse the fragments of one step (or equation). `op_names` is the set
/// of operation names in scope; only those are eligible to form
/// syntax-directed invocations through the "`Name` of" pattern.
pub fn parse_fragments<'i>(
    fragments: &[FragmentNode<'i>],
    op_names: &HashSet<String>,
) -> Result<Seq<'i>, ParsingError> {
    let mut parser = Parser::new(fragments, op_names);
    parser.parse_seq(&[TokenKind::Eof])
}

#[derive(Debug)]
pub struct Parser<'i, 'n> {
    tokens: Vec<Tok<'i>>,
    position: usize,
    end: usize,
    op_names: &'n HashSet<String>,
}

impl<'i, 'n> Parser<'i, 'n> {
    pub fn new(fragments: &[FragmentNode<'i>], op_names: &'n HashSet<String>) -> Parser<'i, 'n> {
        let end = fragments
            .last()
            .map(|node| node.offset + node.width())
            .unwrap_or(0);
        Parser {
            tokens: tokenize(fragments),
            position: 0,
            end,
            op_names,
        }
    }

    fn peek(&self) -> Option<&Tok<'i>> {
        self.tokens
            .get(self.position)
    }

    /// The core routine. Consumes up to, but not including, the first
    /// token in `close`; end of input is acceptable only when `close`
    /// contains `Eof`. Soft tokens (and, is, comma, period, "with
    /// arguments") that are not terminators here fold back into prose.
    pub fn parse_seq(&mut self, close: &[TokenKind]) -> Result<Seq<'i>, ParsingError> {
        let mut items: Vec<Expr<'i>> = Vec::new();
        loop {
            let (kind, text, offset) = match self.peek() {
                None => {
                    if close.contains(&TokenKind::Eof) {
                        return Ok(Seq { items });
                    }
                    return Err(ParsingError::UnexpectedToken(
                        self.end,
                        "eof".to_string(),
                        describe_close(close),
                    ));
                }
                Some(Tok::Fragment(node)) => {
                    let node = *node;
                    self.position += 1;
                    push_prose(&mut items, node);
                    continue;
                }
                Some(Tok::Token { kind, text, offset }) => (*kind, *text, *offset),
            };

            if close.contains(&kind) {
                return Ok(Seq { items });
            }

            match kind {
                TokenKind::And
                | TokenKind::Is
                | TokenKind::Period
                | TokenKind::Comma
                | TokenKind::WithArguments => {
                    // ordinary words here
                    self.position += 1;
                    push_prose(&mut items, FragmentNode::text(text, offset));
                }
                TokenKind::ListClose | TokenKind::RecordClose | TokenKind::ParenClose => {
                    return Err(ParsingError::UnexpectedToken(
                        offset,
                        kind.describe()
                            .to_string(),
                        describe_close(close),
                    ));
                }
                TokenKind::ListOpen => {
                    self.position += 1;
                    let elements = self.parse_separated(TokenKind::ListClose, "a list element")?;
                    items.push(Expr::List(List { elements, offset }));
                }
                TokenKind::RecordOpen => {
                    self.position += 1;
                    let record = self.parse_record(offset)?;
                    items.push(record);
                }
                TokenKind::ParenOpen => {
                    self.position += 1;
                    let expr = match carve_callee(&mut items) {
                        Some((callee, callee_offset)) => {
                            let arguments =
                                self.parse_separated(TokenKind::ParenClose, "an argument")?;
                            Expr::Call(Call {
                                callee,
                                arguments,
                                offset: callee_offset,
                            })
                        }
                        None => {
                            let inner = self.parse_seq(&[TokenKind::ParenClose])?;
                            self.position += 1; // the close parenthesis
                            Expr::Paren(Paren { inner, offset })
                        }
                    };
                    items.push(expr);
                }
                TokenKind::SdoOf => {
                    // "`Word` of" starts a syntax-directed invocation only
                    // for names actually in scope; otherwise the words are
                    // ordinary prose.
                    let word = &text[..text.len() - " of ".len()];
                    self.position += 1;
                    if self
                        .op_names
                        .contains(word)
                    {
                        let call = self.parse_sdo_call(word, offset, close)?;
                        items.push(Expr::SdoCall(call));
                    } else {
                        push_prose(&mut items, FragmentNode::text(text, offset));
                    }
                }
                TokenKind::Eof => unreachable!("eof is not a lexed token"),
            }
        }
    }

    /// Comma-separated sequence elements up to and including `close`.
    /// A trailing separator is tolerated only when the element it would
    /// introduce is blank and either sole or spanning a line break, the
    /// conventional multi-line style.
    fn parse_separated(
        &mut self,
        close: TokenKind,
        expected: &'static str,
    ) -> Result<Vec<Seq<'i>>, ParsingError> {
        let mut elements = Vec::new();
        loop {
            let element = self.parse_seq(&[close, TokenKind::Comma])?;
            let terminator = match self.peek() {
                Some(Tok::Token { kind, offset, .. }) => (*kind, *offset),
                _ => unreachable!("parse_seq stopped without a terminator"),
            };
            self.position += 1;

            if terminator.0 == TokenKind::Comma {
                // a comma never follows a blank element; only the close
                // token tolerates one, in the forms below
                if element.is_blank() {
                    return Err(ParsingError::MissingContent(
                        element
                            .offset()
                            .unwrap_or(terminator.1),
                        expected,
                    ));
                }
                elements.push(element);
                continue;
            }

            if element.is_blank() {
                if elements.is_empty() {
                    // zero elements, as in «» or Foo()
                } else if element.has_line_break() {
                    // multi-line trailing comma, discard the phantom element
                } else {
                    return Err(ParsingError::MissingContent(
                        element
                            .offset()
                            .unwrap_or(terminator.1),
                        expected,
                    ));
                }
            } else {
                elements.push(element);
            }
            return Ok(elements);
        }
    }

    /// Record members: `[[Name]]` or `[[Name]]: value`, separated by
    /// commas or "and", never mixed, never repeated.
    fn parse_record(&mut self, offset: usize) -> Result<Expr<'i>, ParsingError> {
        let mut named: Vec<&'i str> = Vec::new();
        let mut valued: Vec<RecordMember<'i>> = Vec::new();
        let mut seen: HashSet<&'i str> = HashSet::new();

        loop {
            let element =
                self.parse_seq(&[TokenKind::RecordClose, TokenKind::Comma, TokenKind::And])?;
            let terminator = match self.peek() {
                Some(Tok::Token { kind, offset, .. }) => (*kind, *offset),
                _ => unreachable!("parse_seq stopped without a terminator"),
            };
            self.position += 1;
            let closing = terminator.0 == TokenKind::RecordClose;

            if element.is_blank() {
                if closing {
                    if named.is_empty() && valued.is_empty() {
                        // an empty record, fine
                    } else if !element.has_line_break() {
                        return Err(ParsingError::MissingContent(
                            element
                                .offset()
                                .unwrap_or(terminator.1),
                            "a record member",
                        ));
                    }
                    break;
                }
                // blank between separators; nothing to record
                continue;
            }

            match interpret_member(element)? {
                Member::Named(name, name_offset) => {
                    if !seen.insert(name) {
                        return Err(ParsingError::DuplicateRecordMember(
                            name_offset,
                            name.to_string(),
                        ));
                    }
                    named.push(name);
                }
                Member::Valued(member) => {
                    if !seen.insert(member.name) {
                        return Err(ParsingError::DuplicateRecordMember(
                            member.offset,
                            member
                                .name
                                .to_string(),
                        ));
                    }
                    valued.push(member);
                }
            }

            if closing {
                break;
            }
        }

        match (named.is_empty(), valued.is_empty()) {
            (false, false) => Err(ParsingError::MixedRecordMembers(offset)),
            (false, true) => Ok(Expr::RecordSpec(RecordSpec {
                names: named,
                offset,
            })),
            (true, _) => Ok(Expr::Record(Record {
                members: valued,
                offset,
            })),
        }
    }

    /// `Callee of node`, optionally followed by "with argument(s)" and a
    /// separated argument list. Stops at (without consuming) any of the
    /// enclosing terminators.
    fn parse_sdo_call(
        &mut self,
        callee: &'i str,
        offset: usize,
        close: &[TokenKind],
    ) -> Result<SdoCall<'i>, ParsingError> {
        let mut node_close = close.to_vec();
        node_close.push(TokenKind::WithArguments);
        let parse_node = self.parse_seq(&node_close)?;

        let mut arguments = Vec::new();
        if let Some(Tok::Token {
            kind: TokenKind::WithArguments,
            ..
        }) = self.peek()
        {
            self.position += 1;
            let mut argument_close = close.to_vec();
            argument_close.push(TokenKind::Comma);
            argument_close.push(TokenKind::And);
            loop {
                let element = self.parse_seq(&argument_close)?;
                if !element.is_blank() {
                    arguments.push(element);
                }
                match self.peek() {
                    Some(Tok::Token {
                        kind: TokenKind::Comma,
                        ..
                    })
                    | Some(Tok::Token {
                        kind: TokenKind::And,
                        ..
                    }) => {
                        self.position += 1;
                    }
                    _ => break,
                }
            }
        }

        Ok(SdoCall {
            callee,
            parse_node,
            arguments,
            offset,
        })
    }
}

fn push_prose<'i>(items: &mut Vec<Expr<'i>>, node: FragmentNode<'i>) {
    // adjacent prose coalesces, including across tag boundaries
    if let Some(Expr::Prose(prose)) = items.last_mut() {
        prose
            .parts
            .push(node);
        return;
    }
    items.push(Expr::Prose(Prose { parts: vec![node] }));
}

/// Decide whether an open parenthesis is a call. It is exactly when the
/// immediately preceding prose ends in a space-free, letter-containing
/// run of text (or a variable span); that run is carved off as the
/// callee. Anything else leaves the parenthesis to open a grouped
/// sub-expression.
fn carve_callee<'i>(items: &mut Vec<Expr<'i>>) -> Option<(&'i str, usize)> {
    let Some(Expr::Prose(prose)) = items.last_mut() else {
        return None;
    };
    let last = *prose
        .parts
        .last()?;

    match last.kind {
        FragmentKind::Variable(name) => {
            prose
                .parts
                .pop();
            if prose
                .parts
                .is_empty()
            {
                items.pop();
            }
            Some((name, last.offset))
        }
        FragmentKind::Text(text) => {
            if text.ends_with(char::is_whitespace) {
                return None;
            }
            let start = text
                .rfind(char::is_whitespace)
                .map(|i| i + 1)
                .unwrap_or(0);
            let run = &text[start..];
            if run.is_empty()
                || !run
                    .chars()
                    .any(char::is_alphabetic)
            {
                return None;
            }
            let callee_offset = last.offset + start;
            if start == 0 {
                prose
                    .parts
                    .pop();
                if prose
                    .parts
                    .is_empty()
                {
                    items.pop();
                }
            } else {
                *prose
                    .parts
                    .last_mut()
                    .unwrap() = FragmentNode::text(&text[..start], last.offset);
            }
            Some((run, callee_offset))
        }
        _ => None,
    }
}

/// An English list of the acceptable terminators: "close parenthesis",
/// "close list or comma", "eof, comma, or period".
fn describe_close(close: &[TokenKind]) -> String {
    let names: Vec<&str> = close
        .iter()
        .map(|kind| kind.describe())
        .collect();
    match names.len() {
        0 => unreachable!("empty close set"),
        1 => names[0].to_string(),
        2 => format!("{} or {}", names[0], names[1]),
        _ => {
            let head = names[..names.len() - 1].join(", ");
            format!("{}, or {}", head, names[names.len() - 1])
        }
    }
}

enum Member<'i> {
    Named(&'i str, usize),
    Valued(RecordMember<'i>),
}

/// Shape-check one record member. The member's sequence must open with
/// text of the form `[[Name]]`; a following colon makes the rest of the
/// sequence the member's value.
fn interpret_member(mut element: Seq<'_>) -> Result<Member<'_>, ParsingError> {
    let offset = element
        .offset()
        .unwrap_or(0);

    // drop leading blank prose parts so the name check sees real text
    let Some(Expr::Prose(prose)) = element
        .items
        .first_mut()
    else {
        return Err(ParsingError::InvalidRecordMember(offset));
    };
    while prose
        .parts
        .first()
        .is_some_and(|part| part.is_blank())
    {
        prose
            .parts
            .remove(0);
    }
    let Some(first) = prose
        .parts
        .first()
        .copied()
    else {
        return Err(ParsingError::InvalidRecordMember(offset));
    };
    let FragmentKind::Text(full) = first.kind else {
        return Err(ParsingError::InvalidRecordMember(first.offset));
    };
    let indent = full.len()
        - full
            .trim_start()
            .len();
    let text = &full[indent..];
    let name_offset = first.offset + indent;

    let re = compile!(r"^\[\[([A-Za-z0-9_]+)\]\]\s*(:\s*)?");
    let Some(caps) = re.captures(text) else {
        return Err(ParsingError::InvalidRecordMember(name_offset));
    };
    let name = caps
        .get(1)
        .unwrap()
        .as_str();
    let consumed = caps
        .get(0)
        .unwrap()
        .end();

    if caps
        .get(2)
        .is_none()
    {
        // named-only member: nothing else may follow
        let rest_blank = text[consumed..]
            .trim()
            .is_empty()
            && prose
                .parts
                .iter()
                .skip(1)
                .all(|part| part.is_blank())
            && element
                .items
                .len()
                == 1;
        if !rest_blank {
            return Err(ParsingError::InvalidRecordMember(name_offset));
        }
        return Ok(Member::Named(name, name_offset));
    }

    // carve the "[[Name]]: " prefix off; what remains is the value
    if consumed == text.len() {
        prose
            .parts
            .remove(0);
    } else {
        prose.parts[0] = FragmentNode::text(&text[consumed..], name_offset + consumed);
    }
    if prose
        .parts
        .is_empty()
    {
        element
            .items
            .remove(0);
    }

    Ok(Member::Valued(RecordMember {
        name,
        value: element,
        offset: name_offset,
    }))
}
