//! The operation bibliography: the checker's view of every declared
//! operation in the document. Entries are built by the front end from
//! structured headers; the analyzer and type inference only read them.
//! The namespace is flat, one entry per operation name.

use std::collections::{HashMap, HashSet};

use crate::typing::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    AbstractOperation,
    SyntaxDirectedOperation,
}

impl Kind {
    pub fn describe(&self) -> &'static str {
        match self {
            Kind::AbstractOperation => "an abstract operation",
            Kind::SyntaxDirectedOperation => "a syntax-directed operation",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    /// None when the header does not give the parameter a type.
    pub ty: Option<Type>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub parameters: Vec<Parameter>,
    pub optional_parameters: Vec<Parameter>,
    pub return_type: Option<Type>,
}

impl Signature {
    pub fn min_arity(&self) -> usize {
        self.parameters
            .len()
    }

    pub fn max_arity(&self) -> usize {
        self.parameters
            .len()
            + self
                .optional_parameters
                .len()
    }

    /// The declared type of the argument at `index`, spanning required
    /// and optional parameters.
    pub fn parameter_type(&self, index: usize) -> Option<&Type> {
        let required = self
            .parameters
            .len();
        let parameter = if index < required {
            self.parameters
                .get(index)
        } else {
            self.optional_parameters
                .get(index - required)
        };
        parameter
            .and_then(|parameter| {
                parameter
                    .ty
                    .as_ref()
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub kind: Kind,
    pub signature: Signature,
    /// Position of the declaring header, where end-of-document
    /// diagnostics about this operation point.
    pub offset: usize,
}

#[derive(Debug, Default)]
pub struct Bibliography {
    entries: HashMap<String, Entry>,
    names: HashSet<String>,
}

impl Bibliography {
    pub fn new() -> Bibliography {
        Bibliography::default()
    }

    /// A later entry with the same name replaces the earlier one.
    pub fn insert(&mut self, entry: Entry) {
        self.names
            .insert(
                entry
                    .name
                    .clone(),
            );
        self.entries
            .insert(
                entry
                    .name
                    .clone(),
                entry,
            );
    }

    pub fn by_aoid(&self, name: &str) -> Option<&Entry> {
        self.entries
            .get(name)
    }

    /// Every declared operation name. The step parser consults this to
    /// decide whether "X of ..." is an invocation or ordinary prose.
    pub fn op_names(&self) -> &HashSet<String> {
        &self.names
    }
}
