//! Inferring a type for a parsed step expression. Deliberately
//! conservative: anything the rules below do not recognize infers to
//! unknown, which the analyzer reads as "no contradiction found".

use crate::biblio::Bibliography;
use crate::compile;
use crate::language::{Expr, FragmentKind, Prose, Seq};
use crate::typing::lattice::{join, normal_contents, Type};

/// The type of a sequence. A single meaningful item gives its own type;
/// a `!` or `?` marker followed by a call unwraps the callee's completion.
pub fn type_from_seq(seq: &Seq<'_>, biblio: &Bibliography) -> Type {
    let items: Vec<&Expr<'_>> = seq
        .items
        .iter()
        .filter(|item| !negligible(item))
        .collect();

    match items.as_slice() {
        [only] => type_from_expr(only, biblio),
        [Expr::Prose(prose), call @ (Expr::Call(_) | Expr::SdoCall(_))]
            if matches!(marker(prose), Some("!" | "?")) =>
        {
            normal_contents(type_from_expr(call, biblio))
        }
        _ => Type::Unknown,
    }
}

pub fn type_from_expr(expr: &Expr<'_>, biblio: &Bibliography) -> Type {
    match expr {
        Expr::List(list) => {
            let element = list
                .elements
                .iter()
                .fold(Type::Never, |acc, element| {
                    join(acc, type_from_seq(element, biblio))
                });
            Type::List(Box::new(element))
        }
        Expr::Record(_) | Expr::RecordSpec(_) => Type::Record,
        Expr::Call(call) => match (call.callee, call.arguments.as_slice()) {
            ("NormalCompletion", [argument]) => {
                Type::Normal(Box::new(type_from_seq(argument, biblio)))
            }
            ("NormalCompletion", _) => Type::Normal(Box::new(Type::Unknown)),
            ("ThrowCompletion", _) => Type::Abrupt,
            // Completion(x) is an assertion, not a constructor
            ("Completion", [argument]) => type_from_seq(argument, biblio),
            _ => declared_return(call.callee, biblio),
        },
        Expr::SdoCall(call) => declared_return(call.callee, biblio),
        Expr::Paren(paren) => type_from_seq(&paren.inner, biblio),
        Expr::Prose(prose) => type_from_prose(prose),
    }
}

fn declared_return(callee: &str, biblio: &Bibliography) -> Type {
    biblio
        .by_aoid(callee)
        .and_then(|entry| {
            entry
                .signature
                .return_type
                .clone()
        })
        .unwrap_or(Type::Unknown)
}

fn type_from_prose(prose: &Prose<'_>) -> Type {
    // tags and the step-ending period are invisible to inference
    let meaningful: Vec<_> = prose
        .parts
        .iter()
        .filter(|part| match part.kind {
            FragmentKind::Text(content) => {
                let trimmed = content.trim();
                !trimmed.is_empty() && trimmed != "."
            }
            FragmentKind::Tag(_) => false,
            _ => true,
        })
        .collect();
    let [only] = meaningful.as_slice() else {
        return Type::Unknown;
    };

    match only.kind {
        FragmentKind::Literal("true") => Type::ConcreteBoolean(true),
        FragmentKind::Literal("false") => Type::ConcreteBoolean(false),
        FragmentKind::Literal("null") => Type::Null,
        FragmentKind::Literal("undefined") => Type::Undefined,
        FragmentKind::Literal(content) => literal(content),
        FragmentKind::EnumValue("unused") => Type::Unused,
        FragmentKind::EnumValue(content) => Type::EnumValue(content.to_string()),
        FragmentKind::Text(content) if numeric(content.trim()) => {
            Type::ConcreteReal(
                content
                    .trim()
                    .to_string(),
            )
        }
        _ => Type::Unknown,
    }
}

fn literal(content: &str) -> Type {
    if let Some(caps) = compile!(r#"^"([^"]*)"$"#).captures(content) {
        return Type::ConcreteString(caps[1].to_string());
    }
    if let Some(stripped) = content.strip_suffix('ℤ') {
        if numeric(stripped) {
            return Type::ConcreteBigInt(stripped.to_string());
        }
    }
    if numeric(content) {
        return Type::ConcreteNumber(content.to_string());
    }
    Type::Unknown
}

fn numeric(text: &str) -> bool {
    compile!(r"^[-+]?[0-9]+(\.[0-9]+)?$").is_match(text)
}

// blank prose and the step-ending period carry no type information
fn negligible(item: &Expr<'_>) -> bool {
    match item {
        Expr::Prose(prose) => prose
            .parts
            .iter()
            .all(|part| match part.kind {
                FragmentKind::Text(content) => {
                    let trimmed = content.trim();
                    trimmed.is_empty() || trimmed == "."
                }
                FragmentKind::Tag(_) => true,
                _ => false,
            }),
        _ => false,
    }
}

/// The prose as a completion-unwrap marker, if it is nothing else.
fn marker<'i>(prose: &Prose<'i>) -> Option<&'i str> {
    let mut found = None;
    for part in &prose.parts {
        match part.kind {
            FragmentKind::Text(content) => {
                let trimmed = content.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if found.is_some() {
                    return None;
                }
                found = Some(trimmed);
            }
            FragmentKind::Tag(_) => continue,
            _ => return None,
        }
    }
    found
}
