use super::loc::Loc;
use super::parse_error::ParseError;

/// Tracks whether the expression just parsed could be reinterpreted as an assignment target or a
/// binding pattern, along with the first error that only applies if it ends up being used as a
/// value.
///
/// For example `{a = 1}` is an error as an object literal but a valid object pattern, so the
/// error is held as pending until the use of the expression is known.
#[derive(Debug)]
pub struct CoverState {
    /// Expression could be the left hand side of an assignment
    pub assignable: bool,
    /// Expression could be a binding pattern, e.g. arrow function parameters
    pub bindable: bool,
    pending_error: Option<(Loc, ParseError)>,
}

impl CoverState {
    pub fn new() -> CoverState {
        CoverState { assignable: true, bindable: true, pending_error: None }
    }

    pub fn set(&mut self, assignable: bool, bindable: bool) {
        self.assignable = assignable;
        self.bindable = bindable;
    }

    /// Record an error that is raised if this expression is used as a value. Only the first error
    /// is kept.
    pub fn set_pending_error(&mut self, loc: Loc, error: ParseError) {
        if self.pending_error.is_none() {
            self.pending_error = Some((loc, error));
        }
    }

    pub fn take_pending_error(&mut self) -> Option<(Loc, ParseError)> {
        self.pending_error.take()
    }

    /// Combine the state of a child element into the state of its containing array, object, or
    /// parenthesized expression.
    pub fn merge(&mut self, child: CoverState) {
        self.assignable &= child.assignable;
        self.bindable &= child.bindable;

        if let Some((loc, error)) = child.pending_error {
            self.set_pending_error(loc, error);
        }
    }
}

impl Default for CoverState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_first_error() {
        let mut parent = CoverState::new();

        let mut first = CoverState::new();
        first.set(true, false);
        first.set_pending_error(Loc::new(1, 2), ParseError::InvalidPatternInitializer);

        let mut second = CoverState::new();
        second.set_pending_error(Loc::new(5, 6), ParseError::DuplicateProtoProperty);

        parent.merge(first);
        parent.merge(second);

        assert!(parent.assignable);
        assert!(!parent.bindable);

        let (loc, error) = parent.take_pending_error().unwrap();
        assert_eq!(loc, Loc::new(1, 2));
        assert!(matches!(error, ParseError::InvalidPatternInitializer));
        assert!(parent.take_pending_error().is_none());
    }
}
