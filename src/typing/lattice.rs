//! The type lattice. Types are plain values with no identity; `dominates`
//! is the subtype relation ("a is at least as general as b"), and join
//! and meet derive from it. Unions are normalized at construction: no
//! member of a union is ever dominated by another member, nested unions
//! are flattened, and two normal completions merge by joining their
//! contents rather than sitting side by side.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    /// Top: no information, compatible with anything.
    Unknown,
    /// Bottom: no value has this type.
    Never,
    Union(Vec<Type>),
    List(Box<Type>),
    /// Field-insensitive; all records look alike to the lattice.
    Record,
    Normal(Box<Type>),
    Abrupt,
    /// A mathematical value.
    Real,
    Integer,
    NonNegativeInteger,
    NegativeInteger,
    PositiveInteger,
    /// A mathematical value literal, carrying its source text.
    ConcreteReal(String),
    /// Any ECMAScript language value.
    ESValue,
    String,
    Number,
    IntegralNumber,
    BigInt,
    Boolean,
    Null,
    Undefined,
    ConcreteString(String),
    ConcreteNumber(String),
    ConcreteBigInt(String),
    ConcreteBoolean(bool),
    EnumValue(String),
    /// The ~unused~ return type of operations invoked only for effect.
    Unused,
    /// A leaf the grammar does not further interpret; carries its text.
    Opaque(String),
}

/// Whether `a` is a supertype of (or equal to) `b`.
pub fn dominates(a: &Type, b: &Type) -> bool {
    if a == b {
        return true;
    }
    match (a, b) {
        (Type::Unknown, _) => true,
        (_, Type::Never) => true,
        // a dominates a union only by dominating every member; a union
        // dominates when any member does, which is sound because union
        // members never themselves require the stricter rule.
        (_, Type::Union(members)) => members
            .iter()
            .all(|member| dominates(a, member)),
        (Type::Union(members), _) => members
            .iter()
            .any(|member| dominates(member, b)),
        (Type::List(x), Type::List(y)) => dominates(x, y),
        (Type::Normal(x), Type::Normal(y)) => dominates(x, y),
        (Type::Real, _) => matches!(
            b,
            Type::Integer
                | Type::NonNegativeInteger
                | Type::NegativeInteger
                | Type::PositiveInteger
                | Type::ConcreteReal(_)
        ),
        (
            Type::Integer,
            Type::NonNegativeInteger | Type::NegativeInteger | Type::PositiveInteger,
        ) => true,
        (Type::Integer, Type::ConcreteReal(text)) => integral(text),
        (Type::NonNegativeInteger, Type::PositiveInteger) => true,
        (Type::NonNegativeInteger, Type::ConcreteReal(text)) => {
            integral(text) && !negative(text)
        }
        (Type::NegativeInteger, Type::ConcreteReal(text)) => {
            integral(text) && negative(text)
        }
        (Type::PositiveInteger, Type::ConcreteReal(text)) => {
            integral(text) && !negative(text) && nonzero(text)
        }
        (Type::ESValue, _) => matches!(
            b,
            Type::String
                | Type::Number
                | Type::IntegralNumber
                | Type::BigInt
                | Type::Boolean
                | Type::Null
                | Type::Undefined
                | Type::ConcreteString(_)
                | Type::ConcreteNumber(_)
                | Type::ConcreteBigInt(_)
                | Type::ConcreteBoolean(_)
        ),
        (Type::Number, Type::IntegralNumber | Type::ConcreteNumber(_)) => true,
        (Type::IntegralNumber, Type::ConcreteNumber(text)) => integral(text),
        (Type::String, Type::ConcreteString(_)) => true,
        (Type::BigInt, Type::ConcreteBigInt(_)) => true,
        (Type::Boolean, Type::ConcreteBoolean(_)) => true,
        _ => false,
    }
}

// a numeric literal with no decimal point denotes an integer
fn integral(text: &str) -> bool {
    !text.contains('.')
}

// sign characters say nothing about the value once the digits are all
// zero, so both tests work on the unsigned part
fn nonzero(text: &str) -> bool {
    magnitude(text)
        .bytes()
        .any(|b| b != b'0')
}

fn negative(text: &str) -> bool {
    text.starts_with('-') && nonzero(text)
}

fn magnitude(text: &str) -> &str {
    text.trim_start_matches(['-', '+'])
}

/// Least upper bound. When neither side dominates the other the result
/// is a normalized union.
pub fn join(a: Type, b: Type) -> Type {
    if dominates(&a, &b) {
        return a;
    }
    if dominates(&b, &a) {
        return b;
    }

    let mut parts = Vec::new();
    flatten(a, &mut parts);
    flatten(b, &mut parts);

    let mut members: Vec<Type> = Vec::new();
    let mut normal: Option<Type> = None;
    for part in parts {
        if let Type::Normal(inner) = part {
            normal = Some(match normal.take() {
                Some(existing) => join(existing, *inner),
                None => *inner,
            });
            continue;
        }
        absorb(&mut members, part);
    }
    if let Some(inner) = normal {
        absorb(&mut members, Type::Normal(Box::new(inner)));
    }

    match members.pop() {
        None => Type::Never,
        Some(only) if members.is_empty() => only,
        Some(last) => {
            members.push(last);
            Type::Union(members)
        }
    }
}

/// Greatest lower bound. Against a union, meet distributes over the
/// members and re-joins; structurally unrelated types meet at bottom.
pub fn meet(a: Type, b: Type) -> Type {
    if dominates(&a, &b) {
        return b;
    }
    if dominates(&b, &a) {
        return a;
    }
    match (a, b) {
        (Type::Union(members), other) | (other, Type::Union(members)) => members
            .into_iter()
            .fold(Type::Never, |acc, member| {
                join(acc, meet(member, other.clone()))
            }),
        (Type::List(x), Type::List(y)) => Type::List(Box::new(meet(*x, *y))),
        (Type::Normal(x), Type::Normal(y)) => Type::Normal(Box::new(meet(*x, *y))),
        _ => Type::Never,
    }
}

/// Whether the type is, or contains, a Completion Record.
pub fn is_completion(t: &Type) -> bool {
    match t {
        Type::Normal(_) | Type::Abrupt => true,
        Type::Union(members) => members
            .iter()
            .any(is_completion),
        _ => false,
    }
}

/// The type of the value a `!` or `?` prefix extracts: the contents of
/// the normal branch. Non-completion types pass through unchanged.
pub fn normal_contents(t: Type) -> Type {
    match t {
        Type::Normal(inner) => *inner,
        Type::Abrupt => Type::Never,
        Type::Union(members) => members
            .into_iter()
            .fold(Type::Never, |acc, member| join(acc, normal_contents(member))),
        other => other,
    }
}

fn flatten(t: Type, out: &mut Vec<Type>) {
    match t {
        Type::Union(members) => {
            for member in members {
                flatten(member, out);
            }
        }
        other => out.push(other),
    }
}

fn absorb(members: &mut Vec<Type>, candidate: Type) {
    if members
        .iter()
        .any(|member| dominates(member, &candidate))
    {
        return;
    }
    members.retain(|member| !dominates(&candidate, member));
    members.push(candidate);
}

/// Serialization renders the same English vocabulary the description
/// grammar accepts.
impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Unknown => write!(f, "unknown"),
            Type::Never => write!(f, "never"),
            Type::Union(members) => {
                if is_completion_record(members) {
                    return write!(f, "a Completion Record");
                }
                write!(f, "either ")?;
                let last = members.len() - 1;
                for (i, member) in members
                    .iter()
                    .enumerate()
                {
                    if i > 0 {
                        if members.len() > 2 {
                            write!(f, ", ")?;
                        } else {
                            write!(f, " ")?;
                        }
                        if i == last {
                            write!(f, "or ")?;
                        }
                    }
                    write!(f, "{}", member)?;
                }
                Ok(())
            }
            Type::List(element) if **element == Type::Unknown => write!(f, "a List"),
            Type::List(element) => write!(f, "a List of {}", element),
            Type::Record => write!(f, "a Record"),
            Type::Normal(inner) if **inner == Type::Unknown => write!(f, "a normal completion"),
            Type::Normal(inner) => write!(f, "a normal completion containing {}", inner),
            Type::Abrupt => write!(f, "an abrupt completion"),
            Type::Real => write!(f, "a mathematical value"),
            Type::Integer => write!(f, "an integer"),
            Type::NonNegativeInteger => write!(f, "a non-negative integer"),
            Type::NegativeInteger => write!(f, "a negative integer"),
            Type::PositiveInteger => write!(f, "a positive integer"),
            Type::ConcreteReal(text) => write!(f, "{}", text),
            Type::ESValue => write!(f, "an ECMAScript language value"),
            Type::String => write!(f, "a String"),
            Type::Number => write!(f, "a Number"),
            Type::IntegralNumber => write!(f, "an integral Number"),
            Type::BigInt => write!(f, "a BigInt"),
            Type::Boolean => write!(f, "a Boolean"),
            Type::Null => write!(f, "*null*"),
            Type::Undefined => write!(f, "*undefined*"),
            Type::ConcreteString(text) => write!(f, "*\"{}\"*", text),
            Type::ConcreteNumber(text) => write!(f, "*{}*", text),
            Type::ConcreteBigInt(text) => write!(f, "*{}*ℤ", text),
            Type::ConcreteBoolean(value) => write!(f, "*{}*", value),
            Type::EnumValue(name) => write!(f, "~{}~", name),
            Type::Unused => write!(f, "~unused~"),
            Type::Opaque(text) => write!(f, "{}", text),
        }
    }
}

fn is_completion_record(members: &[Type]) -> bool {
    members.len() == 2
        && members.contains(&Type::Abrupt)
        && members
            .iter()
            .any(|member| matches!(member, Type::Normal(inner) if **inner == Type::Unknown))
}
