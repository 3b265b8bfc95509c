//! The tri-state fold behind the end-of-document passes. Each operation
//! name carries one flag per pass, folded over its call sites in document
//! order: a conforming site promotes an unseen name to candidate, and a
//! single non-conforming site disqualifies the name for good.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Usage {
    #[default]
    Unseen,
    Candidate,
    Disqualified,
}

impl Usage {
    pub fn combine(self, conforming: bool) -> Usage {
        match (self, conforming) {
            (Usage::Disqualified, _) => Usage::Disqualified,
            (_, false) => Usage::Disqualified,
            (_, true) => Usage::Candidate,
        }
    }
}
