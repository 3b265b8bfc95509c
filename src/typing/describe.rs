//! Parsing English type descriptions, the prose written in structured
//! operation headers ("a normal completion containing either a Number or
//! a Boolean"). Longest phrase wins; anything the grammar does not
//! recognize becomes an opaque leaf carrying its literal text.

use crate::compile;
use crate::typing::lattice::Type;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptionError {
    /// A bare "or" whose scope cannot be determined; the offset points at
    /// the alternative that makes it ambiguous.
    AmbiguousDisjunction(usize),
    DuplicateField(usize, String),
    MixedFields(usize),
}

impl DescriptionError {
    pub fn offset(&self) -> usize {
        match self {
            DescriptionError::AmbiguousDisjunction(offset) => *offset,
            DescriptionError::DuplicateField(offset, _) => *offset,
            DescriptionError::MixedFields(offset) => *offset,
        }
    }

    pub fn message(&self) -> String {
        match self {
            DescriptionError::AmbiguousDisjunction(_) => {
                "ambiguous disjunction; write \"either ... or ...\" to make the scope of \"or\" explicit"
                    .to_string()
            }
            DescriptionError::DuplicateField(_, name) => {
                format!("duplicate field name [[{}]]", name)
            }
            DescriptionError::MixedFields(_) => {
                "field types must be given for all fields or none".to_string()
            }
        }
    }
}

/// Parses one type description. `offset` is the position of the
/// description within its document, carried through so failures point at
/// the source.
pub fn parse_description(source: &str, offset: usize) -> Result<Type, DescriptionError> {
    let (text, offset) = trim(source, offset);

    // "T, but not U" narrows informally; the narrowing is discarded.
    let text = match find_top_level(text, ", but not ") {
        Some(position) => &text[..position],
        None => text,
    };

    if let Some(body) = text.strip_prefix("either ") {
        let alternatives = split_alternatives(body, offset + "either ".len());
        return alternatives
            .into_iter()
            .map(|(alt, at)| parse_description(alt, at))
            .collect::<Result<Vec<_>, _>>()
            .map(union_of);
    }

    let alternatives = split_alternatives(text, offset);
    if alternatives.len() > 1 {
        let mut parsed = Vec::new();
        for (alt, at) in &alternatives {
            parsed.push((parse_description(alt, *at)?, *at));
        }
        // A bare "or" is fine between simple leaves, but once an
        // alternative other than the last could itself continue ("a List
        // of X or Y"), the reader cannot tell where it ends.
        for (ty, at) in &parsed[..parsed.len() - 1] {
            let ambiguous = match ty {
                Type::List(_) | Type::Union(_) => true,
                Type::Normal(inner) => **inner != Type::Unknown,
                _ => false,
            };
            if ambiguous {
                return Err(DescriptionError::AmbiguousDisjunction(*at));
            }
        }
        return Ok(union_of(
            parsed
                .into_iter()
                .map(|(ty, _)| ty)
                .collect(),
        ));
    }

    atom(text, offset)
}

fn union_of(mut alternatives: Vec<Type>) -> Type {
    match alternatives.pop() {
        None => Type::Never,
        Some(only) if alternatives.is_empty() => only,
        Some(last) => {
            alternatives.push(last);
            Type::Union(alternatives)
        }
    }
}

fn atom(text: &str, offset: usize) -> Result<Type, DescriptionError> {
    if let Some(rest) = text.strip_prefix("a normal completion containing ") {
        let inner = parse_description(rest, offset + "a normal completion containing ".len())?;
        return Ok(Type::Normal(Box::new(inner)));
    }
    if text == "a normal completion" {
        return Ok(Type::Normal(Box::new(Type::Unknown)));
    }
    if text == "a Completion Record" {
        return Ok(Type::Union(vec![
            Type::Normal(Box::new(Type::Unknown)),
            Type::Abrupt,
        ]));
    }
    // "an abrupt completion", "a throw completion", and any other
    // single-word completion kind all collapse to the abrupt side.
    if compile!(r"^an? [a-z]+ completion$").is_match(text) {
        return Ok(Type::Abrupt);
    }
    if let Some(rest) = text.strip_prefix("a List of ") {
        let element = parse_description(rest, offset + "a List of ".len())?;
        return Ok(Type::List(Box::new(element)));
    }
    if text == "a List" {
        return Ok(Type::List(Box::new(Type::Unknown)));
    }
    if let Some(rest) = text.strip_prefix("a Record with fields ") {
        return record(rest, offset + "a Record with fields ".len());
    }
    if let Some(rest) = text.strip_prefix("a Record with field ") {
        return record(rest, offset + "a Record with field ".len());
    }
    if text == "a Record" {
        return Ok(Type::Record);
    }

    Ok(leaf(text))
}

fn leaf(text: &str) -> Type {
    match text {
        "a mathematical value" | "mathematical values" => return Type::Real,
        "an integer" | "integers" => return Type::Integer,
        "a non-negative integer" | "non-negative integers" => return Type::NonNegativeInteger,
        "a negative integer" | "negative integers" => return Type::NegativeInteger,
        "a positive integer" | "positive integers" => return Type::PositiveInteger,
        "an ECMAScript language value" | "ECMAScript language values" => return Type::ESValue,
        "a String" | "Strings" => return Type::String,
        "a Number" | "Numbers" => return Type::Number,
        "an integral Number" | "integral Numbers" => return Type::IntegralNumber,
        "a BigInt" | "BigInts" => return Type::BigInt,
        "a Boolean" | "Booleans" => return Type::Boolean,
        "*null*" | "null" => return Type::Null,
        "*undefined*" | "undefined" => return Type::Undefined,
        "~unused~" | "unused" => return Type::Unused,
        "*true*" => return Type::ConcreteBoolean(true),
        "*false*" => return Type::ConcreteBoolean(false),
        _ => {}
    }

    if let Some(caps) = compile!(r#"^\*"([^"]*)"\*$"#).captures(text) {
        return Type::ConcreteString(caps[1].to_string());
    }
    if let Some(caps) = compile!(r"^\*([^*]+)\*ℤ$").captures(text) {
        return Type::ConcreteBigInt(caps[1].to_string());
    }
    if let Some(caps) = compile!(r"^\*([-+]?[0-9][^*]*)\*$").captures(text) {
        return Type::ConcreteNumber(caps[1].to_string());
    }
    if let Some(caps) = compile!(r"^~([a-zA-Z0-9+_-]+)~$").captures(text) {
        return Type::EnumValue(caps[1].to_string());
    }
    if compile!(r"^-?[0-9]+(\.[0-9]+)?$").is_match(text) {
        return Type::ConcreteReal(text.to_string());
    }

    Type::Opaque(text.to_string())
}

fn record(body: &str, offset: usize) -> Result<Type, DescriptionError> {
    let re = compile!(r"^\[\[([A-Za-z0-9_]+)\]\](?:\s*\((.*)\))?$");

    let mut names: Vec<String> = Vec::new();
    let mut typed = 0;
    let mut untyped = 0;
    for (field, at) in split_fields(body, offset) {
        let Some(caps) = re.captures(field) else {
            // an unrecognized field shape is tolerated, since the lattice
            // is field-insensitive anyway; the rest still gets validated
            continue;
        };
        let name = caps[1].to_string();
        if names.contains(&name) {
            return Err(DescriptionError::DuplicateField(at, name));
        }
        names.push(name);
        match caps.get(2) {
            Some(ty) => {
                typed += 1;
                // surface failures inside the field type, though the
                // type itself is not retained
                parse_description(ty.as_str(), at + ty.start())?;
            }
            None => untyped += 1,
        }
    }
    if typed > 0 && untyped > 0 {
        return Err(DescriptionError::MixedFields(offset));
    }
    Ok(Type::Record)
}

fn trim(source: &str, offset: usize) -> (&str, usize) {
    let trimmed = source.trim_start();
    let at = offset + (source.len() - trimmed.len());
    (trimmed.trim_end(), at)
}

/// Finds the byte position of `needle` at bracket depth zero, or None.
fn find_top_level(text: &str, needle: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut position = 0;
    let bytes = text.as_bytes();
    while position + needle.len() <= text.len() {
        match text[position..]
            .chars()
            .next()
        {
            Some('(' | '«' | '[') => depth += 1,
            Some(')' | '»' | ']') => depth = depth.saturating_sub(1),
            _ => {}
        }
        if depth == 0 && bytes[position..].starts_with(needle.as_bytes()) {
            return Some(position);
        }
        position += text[position..]
            .chars()
            .next()
            .map_or(1, char::len_utf8);
    }
    None
}

/// Splits a disjunction body into its alternatives, each with its source
/// offset. Prefers the serial form (", or " with ", " between earlier
/// alternatives); otherwise splits on bare " or ". An "either" inside an
/// alternative shields the following " or " from splitting, so nested
/// disjunctions stay whole.
fn split_alternatives(text: &str, offset: usize) -> Vec<(&str, usize)> {
    let serial = has_top_level_serial_or(text);
    let mut out = Vec::new();
    let mut start = 0;
    let mut depth = 0usize;
    let mut shield = 0usize;
    let mut position = 0;
    let bytes = text.as_bytes();
    while position < text.len() {
        let c = text[position..]
            .chars()
            .next()
            .unwrap_or('\0');
        match c {
            '(' | '«' | '[' => depth += 1,
            ')' | '»' | ']' => depth = depth.saturating_sub(1),
            _ => {}
        }
        if depth == 0 {
            if bytes[position..].starts_with(b"either ") && at_word_start(bytes, position) {
                shield += 1;
                position += "either ".len();
                continue;
            }
            let split_width = if serial && bytes[position..].starts_with(b", ") {
                Some(2)
            } else if !serial && bytes[position..].starts_with(b" or ") {
                if shield > 0 {
                    shield -= 1;
                    None
                } else {
                    Some(4)
                }
            } else {
                None
            };
            if let Some(width) = split_width {
                out.push((&text[start..position], offset + start));
                position += width;
                start = position;
                continue;
            }
        }
        position += c.len_utf8();
    }
    out.push((&text[start..], offset + start));

    out.into_iter()
        .map(|(alt, at)| {
            // the serial form leaves "or " on the final alternative
            match alt.strip_prefix("or ") {
                Some(stripped) if serial => (stripped, at + 3),
                _ => (alt, at),
            }
        })
        .map(|(alt, at)| trim(alt, at))
        .filter(|(alt, _)| !alt.is_empty())
        .collect()
}

/// Splits a record field list on its ", " / " and " separators.
fn split_fields(text: &str, offset: usize) -> Vec<(&str, usize)> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut depth = 0usize;
    let mut position = 0;
    let bytes = text.as_bytes();
    while position < text.len() {
        let c = text[position..]
            .chars()
            .next()
            .unwrap_or('\0');
        match c {
            '(' | '«' => depth += 1,
            ')' | '»' => depth = depth.saturating_sub(1),
            _ => {}
        }
        if depth == 0 {
            let width = if bytes[position..].starts_with(b", and ") {
                Some(6)
            } else if bytes[position..].starts_with(b" and ") {
                Some(5)
            } else if bytes[position..].starts_with(b", ") {
                Some(2)
            } else {
                None
            };
            if let Some(width) = width {
                out.push((&text[start..position], offset + start));
                position += width;
                start = position;
                continue;
            }
        }
        position += c.len_utf8();
    }
    out.push((&text[start..], offset + start));

    out.into_iter()
        .map(|(field, at)| {
            let (field, at) = trim(field, at);
            (field, at)
        })
        .filter(|(field, _)| !field.is_empty())
        .collect()
}

fn has_top_level_serial_or(text: &str) -> bool {
    let mut depth = 0usize;
    let bytes = text.as_bytes();
    let mut position = 0;
    while position < text.len() {
        let c = text[position..]
            .chars()
            .next()
            .unwrap_or('\0');
        match c {
            '(' | '«' | '[' => depth += 1,
            ')' | '»' | ']' => depth = depth.saturating_sub(1),
            _ => {}
        }
        if depth == 0 && bytes[position..].starts_with(b", or ") {
            return true;
        }
        position += c.len_utf8();
    }
    false
}

fn at_word_start(bytes: &[u8], position: usize) -> bool {
    position == 0 || !bytes[position - 1].is_ascii_alphanumeric()
}

#[cfg(test)]
mod check {
    use super::*;

    fn parse(source: &str) -> Result<Type, DescriptionError> {
        parse_description(source, 0)
    }

    #[test]
    fn leaves() {
        assert_eq!(parse("a Number"), Ok(Type::Number));
        assert_eq!(parse("an ECMAScript language value"), Ok(Type::ESValue));
        assert_eq!(parse("a mathematical value"), Ok(Type::Real));
        assert_eq!(parse("~unused~"), Ok(Type::Unused));
        assert_eq!(parse("*null*"), Ok(Type::Null));
        assert_eq!(
            parse("*\"ok\"*"),
            Ok(Type::ConcreteString("ok".to_string()))
        );
        assert_eq!(parse("*true*"), Ok(Type::ConcreteBoolean(true)));
        assert_eq!(
            parse("*42*"),
            Ok(Type::ConcreteNumber("42".to_string()))
        );
        assert_eq!(
            parse("*42*ℤ"),
            Ok(Type::ConcreteBigInt("42".to_string()))
        );
        assert_eq!(parse("~empty~"), Ok(Type::EnumValue("empty".to_string())));
        assert_eq!(parse("3"), Ok(Type::ConcreteReal("3".to_string())));
    }

    #[test]
    fn unrecognized_text_is_opaque() {
        assert_eq!(
            parse("an Object"),
            Ok(Type::Opaque("an Object".to_string()))
        );
    }

    #[test]
    fn completions() {
        assert_eq!(
            parse("a normal completion containing a Number"),
            Ok(Type::Normal(Box::new(Type::Number)))
        );
        assert_eq!(
            parse("a normal completion"),
            Ok(Type::Normal(Box::new(Type::Unknown)))
        );
        assert_eq!(parse("an abrupt completion"), Ok(Type::Abrupt));
        assert_eq!(parse("a throw completion"), Ok(Type::Abrupt));
        assert_eq!(
            parse("a Completion Record"),
            Ok(Type::Union(vec![
                Type::Normal(Box::new(Type::Unknown)),
                Type::Abrupt
            ]))
        );
    }

    #[test]
    fn lists() {
        assert_eq!(
            parse("a List of Strings"),
            Ok(Type::List(Box::new(Type::String)))
        );
        assert_eq!(parse("a List"), Ok(Type::List(Box::new(Type::Unknown))));
    }

    #[test]
    fn records() {
        assert_eq!(parse("a Record"), Ok(Type::Record));
        assert_eq!(
            parse("a Record with fields [[X]] (a Number) and [[Y]] (a Boolean)"),
            Ok(Type::Record)
        );
        assert_eq!(
            parse("a Record with fields [[X]] and [[Y]]"),
            Ok(Type::Record)
        );
        assert_eq!(
            parse("a Record with fields [[X]] and [[X]]"),
            Err(DescriptionError::DuplicateField(31, "X".to_string()))
        );
        // an unreadable field does not end the scan early
        assert_eq!(
            parse("a Record with fields [[X]] (a Number) and garbage and [[X]]"),
            Err(DescriptionError::DuplicateField(54, "X".to_string()))
        );
        assert_eq!(
            parse("a Record with fields [[X]] (a Number) and [[Y]]"),
            Err(DescriptionError::MixedFields(21))
        );
    }

    #[test]
    fn explicit_disjunction() {
        assert_eq!(
            parse("either a Number or a Boolean"),
            Ok(Type::Union(vec![Type::Number, Type::Boolean]))
        );
        assert_eq!(
            parse("either a Number, a Boolean, or *null*"),
            Ok(Type::Union(vec![Type::Number, Type::Boolean, Type::Null]))
        );
    }

    #[test]
    fn bare_or_between_simple_leaves() {
        assert_eq!(
            parse("X or Y"),
            Ok(Type::Union(vec![
                Type::Opaque("X".to_string()),
                Type::Opaque("Y".to_string())
            ]))
        );
    }

    #[test]
    fn nested_either_scopes_to_the_list_element() {
        assert_eq!(
            parse("either a List of either Objects or *null*, or ~empty~"),
            Ok(Type::Union(vec![
                Type::List(Box::new(Type::Union(vec![
                    Type::Opaque("Objects".to_string()),
                    Type::Null
                ]))),
                Type::EnumValue("empty".to_string())
            ]))
        );
    }

    #[test]
    fn ambiguous_bare_or_is_rejected() {
        assert_eq!(
            parse("a List of Numbers or *null*"),
            Err(DescriptionError::AmbiguousDisjunction(0))
        );
        // ambiguity only matters before the final alternative
        assert_eq!(
            parse("*null* or a List of Numbers"),
            Ok(Type::Union(vec![
                Type::Null,
                Type::List(Box::new(Type::Number))
            ]))
        );
    }

    #[test]
    fn ambiguous_completion_contents_need_either() {
        assert!(parse("a normal completion containing a Number or a boolean").is_err());
        let parsed =
            parse("a normal completion containing either a Number or a boolean").unwrap();
        assert_eq!(
            parsed,
            Type::Normal(Box::new(Type::Union(vec![
                Type::Number,
                Type::Opaque("a boolean".to_string())
            ])))
        );
    }

    #[test]
    fn but_not_is_discarded() {
        assert_eq!(parse("an integer, but not 0"), Ok(Type::Integer));
    }

    #[test]
    fn offsets_follow_the_source() {
        let result = parse_description("a List of Numbers or *null*", 100);
        assert_eq!(result, Err(DescriptionError::AmbiguousDisjunction(100)));
    }
}
