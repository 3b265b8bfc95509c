//! The document analyzer. Walks every algorithm step, parses it, and
//! cross-checks each operation invocation against the bibliography:
//! unknown callees, invocation kind, argument count, completion
//! consumption, the Perform idiom, and argument and return plausibility.
//! Two global passes then look for signatures the whole document treats
//! as simpler than declared.

mod usage;

pub use usage::Usage;

use std::collections::HashMap;

use crate::biblio::{Bibliography, Kind};
use crate::compile;
use crate::language::{Expr, FragmentKind, FragmentNode, Prose, Seq};
use crate::parsing::parse_fragments;
use crate::problem::{Diagnostic, Reporter};
use crate::typing::{is_completion, meet, normal_contents, type_from_seq, Type};

// Casing conversions are described in prose rather than declared, so an
// unresolved reference to them is expected.
const EXEMPT_CALLEES: [&str; 2] = ["toUppercase", "toLowercase"];

/// One algorithm element: its declaring operation name, if the element
/// has one, and its steps as pre-segmented rich text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Algorithm<'i> {
    pub name: Option<&'i str>,
    pub steps: Vec<Step<'i>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step<'i> {
    pub fragments: Vec<FragmentNode<'i>>,
}

/// The path from a call back to the root of its step, needed to read the
/// sibling context the call appears in.
enum Frame<'a, 'i> {
    Seq { seq: &'a Seq<'i>, index: usize },
    Parent(&'a Expr<'i>),
}

#[derive(Default)]
struct CallContext {
    marker: Option<char>,
    performed: bool,
    completion_argument: bool,
}

impl CallContext {
    fn consumed_as_completion(&self) -> bool {
        self.marker
            .is_some()
            || self.completion_argument
    }
}

pub struct Analyzer<'b> {
    biblio: &'b Bibliography,
    perform_only: HashMap<String, Usage>,
    bang_only: HashMap<String, Usage>,
}

impl<'b> Analyzer<'b> {
    pub fn new(biblio: &'b Bibliography) -> Analyzer<'b> {
        Analyzer {
            biblio,
            perform_only: HashMap::new(),
            bang_only: HashMap::new(),
        }
    }

    /// Checks one algorithm element. A step that fails to parse produces
    /// one diagnostic and the remaining steps are still checked.
    pub fn check_algorithm(&mut self, algorithm: &Algorithm<'_>, report: &mut dyn Reporter) {
        for step in &algorithm.steps {
            let stepped = match parse_fragments(
                &step.fragments,
                self.biblio
                    .op_names(),
            ) {
                Ok(stepped) => stepped,
                Err(failure) => {
                    report.warn(Diagnostic {
                        rule: "invalid-step",
                        message: failure.message(),
                        offset: failure.offset(),
                    });
                    continue;
                }
            };
            let mut path = Vec::new();
            self.walk_seq(&stepped, &mut path, report);
            self.check_return_step(algorithm, &stepped, report);
        }
    }

    /// The end-of-document passes. Consumes the analyzer; diagnostics
    /// point at the declaring header of each flagged operation.
    pub fn finish(self, report: &mut dyn Reporter) {
        let mut performed: Vec<&String> = self
            .perform_only
            .iter()
            .filter(|(_, usage)| **usage == Usage::Candidate)
            .map(|(name, _)| name)
            .collect();
        performed.sort();
        for name in performed {
            let Some(entry) = self
                .biblio
                .by_aoid(name)
            else {
                continue;
            };
            report.warn(Diagnostic {
                rule: "always-performed",
                message: format!(
                    "every invocation of {} uses Perform; consider declaring its return type as ~unused~",
                    name
                ),
                offset: entry.offset,
            });
        }

        let mut asserted: Vec<&String> = self
            .bang_only
            .iter()
            .filter(|(_, usage)| **usage == Usage::Candidate)
            .map(|(name, _)| name)
            .collect();
        asserted.sort();
        for name in asserted {
            let Some(entry) = self
                .biblio
                .by_aoid(name)
            else {
                continue;
            };
            let Some(declared) = entry
                .signature
                .return_type
                .clone()
            else {
                continue;
            };
            report.warn(Diagnostic {
                rule: "always-asserted",
                message: format!(
                    "every invocation of {} is unwrapped with !; consider declaring its return type as {}",
                    name,
                    normal_contents(declared)
                ),
                offset: entry.offset,
            });
        }
    }

    fn walk_seq<'a, 'i>(
        &mut self,
        seq: &'a Seq<'i>,
        path: &mut Vec<Frame<'a, 'i>>,
        report: &mut dyn Reporter,
    ) {
        for (index, item) in seq
            .items
            .iter()
            .enumerate()
        {
            path.push(Frame::Seq { seq, index });
            self.walk_expr(item, path, report);
            path.pop();
        }
    }

    fn walk_expr<'a, 'i>(
        &mut self,
        expr: &'a Expr<'i>,
        path: &mut Vec<Frame<'a, 'i>>,
        report: &mut dyn Reporter,
    ) {
        match expr {
            Expr::Call(call) => {
                self.check_call(call.callee, call.offset, &call.arguments, false, path, report);
            }
            Expr::SdoCall(call) => {
                self.check_call(call.callee, call.offset, &call.arguments, true, path, report);
            }
            _ => {}
        }

        path.push(Frame::Parent(expr));
        match expr {
            Expr::Prose(_) | Expr::RecordSpec(_) => {}
            Expr::List(list) => {
                for element in &list.elements {
                    self.walk_seq(element, path, report);
                }
            }
            Expr::Record(record) => {
                for member in &record.members {
                    self.walk_seq(&member.value, path, report);
                }
            }
            Expr::Call(call) => {
                for argument in &call.arguments {
                    self.walk_seq(argument, path, report);
                }
            }
            Expr::SdoCall(call) => {
                self.walk_seq(&call.parse_node, path, report);
                for argument in &call.arguments {
                    self.walk_seq(argument, path, report);
                }
            }
            Expr::Paren(paren) => {
                self.walk_seq(&paren.inner, path, report);
            }
        }
        path.pop();
    }

    fn check_call(
        &mut self,
        callee: &str,
        offset: usize,
        arguments: &[Seq<'_>],
        sdo: bool,
        path: &[Frame<'_, '_>],
        report: &mut dyn Reporter,
    ) {
        let Some(entry) = self
            .biblio
            .by_aoid(callee)
        else {
            if !EXEMPT_CALLEES.contains(&callee) {
                report.warn(Diagnostic {
                    rule: "undefined-callee",
                    message: format!("could not find definition for {}", callee),
                    offset,
                });
            }
            return;
        };

        let declared_sdo = entry.kind == Kind::SyntaxDirectedOperation;
        if sdo != declared_sdo {
            let message = if declared_sdo {
                format!(
                    "{} is a syntax-directed operation and should be invoked as \"{} of ...\"",
                    callee, callee
                )
            } else {
                format!(
                    "{} is an abstract operation and should be invoked as \"{}(...)\"",
                    callee, callee
                )
            };
            report.warn(Diagnostic {
                rule: "invocation-kind",
                message,
                offset,
            });
        }

        let min = entry
            .signature
            .min_arity();
        let max = entry
            .signature
            .max_arity();
        let count = arguments.len();
        if count < min || count > max {
            let expected = if min == max {
                format!("{} argument{}", min, if min == 1 { "" } else { "s" })
            } else {
                format!("between {} and {} arguments", min, max)
            };
            report.warn(Diagnostic {
                rule: "argument-count",
                message: format!(
                    "{} takes {}, but this invocation passes {}",
                    callee, expected, count
                ),
                offset,
            });
        }

        let context = call_context(path);
        let declared = entry
            .signature
            .return_type
            .as_ref();
        if let Some(declared) = declared {
            let completion = is_completion(declared);
            if completion && !context.consumed_as_completion() {
                report.warn(Diagnostic {
                    rule: "completion-consumption",
                    message: format!(
                        "{} returns a Completion Record, but is not consumed as if it does",
                        callee
                    ),
                    offset,
                });
            }
            if !completion && context.consumed_as_completion() {
                report.warn(Diagnostic {
                    rule: "completion-consumption",
                    message: format!(
                        "{} does not return a Completion Record, but is consumed as if it does",
                        callee
                    ),
                    offset,
                });
            }

            if *declared == Type::Unused && !context.performed {
                report.warn(Diagnostic {
                    rule: "perform-unused",
                    message: format!(
                        "{} returns ~unused~, so it should be invoked with Perform",
                        callee
                    ),
                    offset,
                });
            }

            if completion {
                let usage = self
                    .bang_only
                    .entry(callee.to_string())
                    .or_default();
                *usage = usage.combine(context.marker == Some('!'));
            }
        }

        // an undeclared return type still belongs in the Perform pass;
        // the ~unused~ suggestion fits those operations best
        if declared != Some(&Type::Unused) {
            let usage = self
                .perform_only
                .entry(callee.to_string())
                .or_default();
            *usage = usage.combine(context.performed);
        }

        for (index, argument) in arguments
            .iter()
            .enumerate()
        {
            let Some(parameter) = entry
                .signature
                .parameter_type(index)
            else {
                continue;
            };
            let inferred = type_from_seq(argument, self.biblio);
            if inferred == Type::Unknown {
                continue;
            }
            if meet(parameter.clone(), inferred.clone()) == Type::Never {
                report.warn(Diagnostic {
                    rule: "argument-type",
                    message: format!(
                        "argument ({}) is not compatible with the parameter type of {} ({})",
                        inferred, callee, parameter
                    ),
                    offset: argument
                        .offset()
                        .unwrap_or(offset),
                });
            }
        }
    }

    /// Compares the value of a "Return ..." step against the declared
    /// return type of the enclosing operation. Conservative both ways:
    /// unknown on either side means no finding.
    fn check_return_step(
        &self,
        algorithm: &Algorithm<'_>,
        stepped: &Seq<'_>,
        report: &mut dyn Reporter,
    ) {
        let Some(name) = algorithm.name else {
            return;
        };
        let Some(entry) = self
            .biblio
            .by_aoid(name)
        else {
            return;
        };
        let Some(declared) = entry
            .signature
            .return_type
            .clone()
        else {
            return;
        };
        let Some(remainder) = carve_return(stepped) else {
            return;
        };

        let inferred = type_from_seq(&remainder, self.biblio);
        if inferred == Type::Unknown {
            return;
        }
        // an operation declaring a completion implicitly wraps the
        // returned value, so compare the normal branches on both sides
        let inferred = normal_contents(inferred);
        let target = normal_contents(declared);
        if inferred == Type::Never || target == Type::Unknown {
            return;
        }
        if meet(target.clone(), inferred.clone()) == Type::Never {
            report.warn(Diagnostic {
                rule: "return-type",
                message: format!(
                    "returned value ({}) is not compatible with the declared return type ({})",
                    inferred, target
                ),
                offset: remainder
                    .offset()
                    .unwrap_or(entry.offset),
            });
        }
    }
}

/// Reads the context a call appears in: the `!`/`?` marker or Perform
/// keyword immediately before it, or its position as the sole argument of
/// Completion. Climbs through parentheses and wrapper-only prose.
fn call_context(path: &[Frame<'_, '_>]) -> CallContext {
    let mut context = CallContext::default();
    let mut cursor = path.len();
    while cursor > 0 {
        cursor -= 1;
        match &path[cursor] {
            Frame::Seq { seq, index } => {
                for sibling in seq.items[..*index]
                    .iter()
                    .rev()
                {
                    match sibling {
                        Expr::Prose(prose) if wrapper_only(prose) => continue,
                        Expr::Prose(prose) => {
                            if let Some(text) = prose.trailing_text() {
                                classify(text, &mut context);
                            }
                            return context;
                        }
                        _ => return context,
                    }
                }
                // nothing meaningful precedes the call at this level
            }
            Frame::Parent(Expr::Paren(_)) => {}
            Frame::Parent(Expr::Call(call))
                if call.callee == "Completion"
                    && call
                        .arguments
                        .len()
                        == 1 =>
            {
                context.completion_argument = true;
                return context;
            }
            Frame::Parent(_) => return context,
        }
    }
    context
}

fn classify(text: &str, context: &mut CallContext) {
    if text.ends_with('!') {
        context.marker = Some('!');
    } else if text.ends_with('?') {
        context.marker = Some('?');
    }
    context.performed = compile!(r"(?i)\bperform\s*[!?]?$").is_match(text);
}

// blank text and tags only, the wrapper levels the sibling scan skips
fn wrapper_only(prose: &Prose<'_>) -> bool {
    prose
        .parts
        .iter()
        .all(|part| part.is_blank() || matches!(part.kind, FragmentKind::Tag(_)))
}

/// If the step is a "Return ..." step, the step with the keyword carved
/// off, so the returned value can be inferred on its own.
fn carve_return<'i>(stepped: &Seq<'i>) -> Option<Seq<'i>> {
    let mut items = stepped
        .items
        .clone();
    let first = items
        .iter()
        .position(|item| !item.is_blank())?;
    let Expr::Prose(prose) = &mut items[first] else {
        return None;
    };
    let part = prose
        .parts
        .iter()
        .position(|part| !part.is_blank())?;
    let FragmentKind::Text(content) = prose.parts[part].kind else {
        return None;
    };
    let rest = content
        .trim_start()
        .strip_prefix("Return ")?;
    let consumed = content.len() - rest.len();
    prose.parts[part] = FragmentNode::text(rest, prose.parts[part].offset + consumed);
    Some(Seq { items })
}
