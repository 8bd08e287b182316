//! Request tokens for dropping superseded backend responses.
//!
//! Every analysis and generation request is tagged with a token taken from a
//! monotonically increasing counter. A completion is applied only if its token
//! is still the latest one issued for that operation.

use std::fmt;

/// Backend operations that are tracked by token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Analysis,
    Generation,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Analysis => "analysis",
            Operation::Generation => "generation",
        }
    }
}

/// Identifier captured when a request is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Issues tokens and remembers the outstanding one per operation.
#[derive(Debug, Default)]
pub(crate) struct TokenIssuer {
    counter: u64,
    analysis: Option<RequestToken>,
    generation: Option<RequestToken>,
}

impl TokenIssuer {
    fn slot(&mut self, op: Operation) -> &mut Option<RequestToken> {
        match op {
            Operation::Analysis => &mut self.analysis,
            Operation::Generation => &mut self.generation,
        }
    }

    /// Issue a new token, superseding any outstanding one for `op`.
    pub fn issue(&mut self, op: Operation) -> RequestToken {
        self.counter += 1;
        let token = RequestToken(self.counter);
        *self.slot(op) = Some(token);
        token
    }

    /// Consume the outstanding token for `op` if it matches.
    ///
    /// Returns false for superseded, already consumed or invalidated tokens.
    pub fn redeem(&mut self, op: Operation, token: RequestToken) -> bool {
        let slot = self.slot(op);
        if *slot == Some(token) {
            *slot = None;
            true
        } else {
            false
        }
    }

    /// Forget every outstanding token; late completions become stale.
    pub fn invalidate_all(&mut self) {
        self.analysis = None;
        self.generation = None;
    }
}
