//! Outlining a document. The outline format is line oriented: operation
//! headers declare signatures, and algorithm blocks carry the steps to
//! be checked against them.
//!
//! ```text
//! operation Add(_x_: a Number, _y_: a Number) returns a Number
//! sdo Evaluation() returns an ECMAScript language value
//!
//! algorithm Add:
//!   1. Return the sum of _x_ and _y_.
//! ```
//!
//! Optional parameters sit in brackets after the required ones, as in
//! `operation Round(_x_: a Number [, _mode_])`.

use tracing::debug;

use super::segment::segment_at;
use crate::analysis::{Algorithm, Step};
use crate::biblio::{Bibliography, Entry, Kind, Parameter, Signature};
use crate::compile;
use crate::problem::Diagnostic;
use crate::typing::parse_description;

pub struct Outline<'i> {
    pub biblio: Bibliography,
    pub algorithms: Vec<Algorithm<'i>>,
    /// Findings made while outlining, reported alongside the analyzer's.
    pub problems: Vec<Diagnostic>,
}

pub fn outline(source: &str) -> Outline<'_> {
    let mut out = Outline {
        biblio: Bibliography::new(),
        algorithms: Vec::new(),
        problems: Vec::new(),
    };

    let mut position = 0;
    for raw in source.split_inclusive('\n') {
        let at = position;
        position += raw.len();
        let line = raw.trim_end_matches('\n');

        if line
            .trim()
            .is_empty()
            || line.starts_with('#')
        {
            continue;
        }

        if let Some(caps) = compile!(
            r"^(operation|sdo)\s+([A-Za-z][A-Za-z0-9]*)\s*(?:\((.*)\))?(?:\s+returns\s+(.*))?$"
        )
        .captures(line)
        {
            let kind = match &caps[1] {
                "sdo" => Kind::SyntaxDirectedOperation,
                _ => Kind::AbstractOperation,
            };
            let name = caps
                .get(2)
                .map(|m| m.as_str())
                .unwrap_or_default();
            let parameters = caps
                .get(3)
                .map(|m| (m.as_str(), at + m.start()))
                .unwrap_or(("", at));
            let (parameters, optional_parameters) =
                parse_parameters(parameters.0, parameters.1, &mut out.problems);
            let return_type = caps
                .get(4)
                .and_then(|m| {
                    match parse_description(m.as_str(), at + m.start()) {
                        Ok(ty) => Some(ty),
                        Err(failure) => {
                            out.problems
                                .push(Diagnostic {
                                    rule: "invalid-type",
                                    message: failure.message(),
                                    offset: failure.offset(),
                                });
                            None
                        }
                    }
                });
            out.biblio
                .insert(Entry {
                    name: name.to_string(),
                    kind,
                    signature: Signature {
                        parameters,
                        optional_parameters,
                        return_type,
                    },
                    offset: at,
                });
            continue;
        }

        if let Some(caps) = compile!(r"^algorithm(?:\s+([A-Za-z][A-Za-z0-9]*))?:$").captures(line)
        {
            out.algorithms
                .push(Algorithm {
                    name: caps
                        .get(1)
                        .map(|m| m.as_str()),
                    steps: Vec::new(),
                });
            continue;
        }

        if let Some(caps) = compile!(r"^\s*(?:[0-9]+\.|[*-])\s(.*)$").captures(line) {
            let body = caps
                .get(1)
                .map(|m| (m.as_str(), at + m.start()))
                .unwrap_or(("", at));
            match out
                .algorithms
                .last_mut()
            {
                Some(algorithm) => {
                    algorithm
                        .steps
                        .push(Step {
                            fragments: segment_at(body.0, body.1),
                        });
                }
                None => {
                    out.problems
                        .push(Diagnostic {
                            rule: "orphan-step",
                            message: "step appears before any algorithm header".to_string(),
                            offset: at,
                        });
                }
            }
            continue;
        }

        out.problems
            .push(Diagnostic {
                rule: "unrecognized-line",
                message: "line is not a header, an algorithm, or a step".to_string(),
                offset: at,
            });
    }

    let operations = out
        .biblio
        .op_names()
        .len();
    let algorithms = out
        .algorithms
        .len();
    debug!(
        "Found {} operation{}, {} algorithm{}",
        operations,
        if operations == 1 { "" } else { "s" },
        algorithms,
        if algorithms == 1 { "" } else { "s" }
    );
    out
}

fn parse_parameters(
    text: &str,
    offset: usize,
    problems: &mut Vec<Diagnostic>,
) -> (Vec<Parameter>, Vec<Parameter>) {
    // the optional block always opens "[,", which cannot collide with
    // the "[[Field]]" spelling inside a type
    let (required, optional) = match text.find("[,") {
        Some(bracket) => {
            let tail = text[bracket + 1..]
                .trim_end()
                .trim_end_matches(']');
            (
                (&text[..bracket], offset),
                Some((tail, offset + bracket + 1)),
            )
        }
        None => ((text, offset), None),
    };

    let parse = |piece: (&str, usize), problems: &mut Vec<Diagnostic>| {
        let mut parameters = Vec::new();
        let mut position = piece.1;
        for part in piece
            .0
            .split(',')
        {
            let at = position;
            position += part.len() + 1;
            let trimmed = part.trim();
            if trimmed.is_empty() {
                continue;
            }
            let Some(caps) =
                compile!(r"^_([A-Za-z][A-Za-z0-9]*)_(?:\s*:\s*(.*))?$").captures(trimmed)
            else {
                problems.push(Diagnostic {
                    rule: "invalid-parameter",
                    message: format!("cannot read parameter \"{}\"", trimmed),
                    offset: at,
                });
                continue;
            };
            let ty = caps
                .get(2)
                .and_then(|m| {
                    let shift = at + (part.len() - part.trim_start().len());
                    match parse_description(m.as_str(), shift + m.start()) {
                        Ok(ty) => Some(ty),
                        Err(failure) => {
                            problems.push(Diagnostic {
                                rule: "invalid-type",
                                message: failure.message(),
                                offset: failure.offset(),
                            });
                            None
                        }
                    }
                });
            parameters.push(Parameter {
                name: caps[1].to_string(),
                ty,
            });
        }
        parameters
    };

    let parameters = parse(required, problems);
    let optional_parameters = optional
        .map(|piece| parse(piece, problems))
        .unwrap_or_default();
    (parameters, optional_parameters)
}

#[cfg(test)]
mod check {
    use super::*;
    use crate::typing::Type;

    #[test]
    fn headers_build_the_bibliography() {
        let outlined = outline(
            "operation Add(_x_: a Number, _y_: a Number) returns a Number\n\
             sdo Evaluation() returns an ECMAScript language value\n",
        );
        assert_eq!(outlined.problems, vec![]);

        let add = outlined
            .biblio
            .by_aoid("Add")
            .unwrap();
        assert_eq!(add.kind, Kind::AbstractOperation);
        assert_eq!(
            add.signature
                .min_arity(),
            2
        );
        assert_eq!(
            add.signature
                .parameter_type(0),
            Some(&Type::Number)
        );
        assert_eq!(
            add.signature
                .return_type,
            Some(Type::Number)
        );

        let evaluation = outlined
            .biblio
            .by_aoid("Evaluation")
            .unwrap();
        assert_eq!(evaluation.kind, Kind::SyntaxDirectedOperation);
    }

    #[test]
    fn optional_parameters_in_brackets() {
        let outlined = outline("operation Round(_x_: a Number [, _mode_]) returns a Number\n");
        let round = outlined
            .biblio
            .by_aoid("Round")
            .unwrap();
        assert_eq!(
            round
                .signature
                .min_arity(),
            1
        );
        assert_eq!(
            round
                .signature
                .max_arity(),
            2
        );
    }

    #[test]
    fn algorithms_collect_their_steps() {
        let outlined = outline(
            "operation Add(_x_, _y_) returns a Number\n\
             \n\
             algorithm Add:\n\
             \x20 1. Let _sum_ be _x_.\n\
             \x20 2. Return _sum_.\n",
        );
        assert_eq!(outlined.problems, vec![]);
        assert_eq!(
            outlined
                .algorithms
                .len(),
            1
        );
        let algorithm = &outlined.algorithms[0];
        assert_eq!(algorithm.name, Some("Add"));
        assert_eq!(
            algorithm
                .steps
                .len(),
            2
        );
    }

    #[test]
    fn step_offsets_point_into_the_source() {
        let source = "algorithm:\n  1. Let _x_ be *true*.\n";
        let outlined = outline(source);
        let step = &outlined.algorithms[0].steps[0];
        let first = &step.fragments[0];
        assert_eq!(&source[first.offset..first.offset + 4], "Let ");
    }

    #[test]
    fn stray_lines_are_reported() {
        let outlined = outline("1. An orphan step.\nwhat is this\n");
        assert_eq!(
            outlined
                .problems
                .iter()
                .map(|problem| problem.rule)
                .collect::<Vec<_>>(),
            vec!["orphan-step", "unrecognized-line"]
        );
    }

    #[test]
    fn bad_type_descriptions_are_reported_but_do_not_abort() {
        let outlined =
            outline("operation Odd(_x_) returns a List of Numbers or *null*\n");
        assert_eq!(
            outlined.problems[0].rule,
            "invalid-type"
        );
        let odd = outlined
            .biblio
            .by_aoid("Odd")
            .unwrap();
        assert_eq!(
            odd.signature
                .return_type,
            None
        );
    }
}
