pub mod tree;

#[cfg(test)]
pub(crate) mod test_utils;

/// Outcome of an alternative that may decline to handle its input.
///
/// Dispatch loops (lexer recognizers, top-level mini-parsers) use
/// [`Attempt::NoMatch`] to move on to the next alternative. Genuine
/// failures travel separately, in the `Err` side of a `Result`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[must_use]
pub enum Attempt<T> {
    Matched(T),
    NoMatch,
}

/// Tries each alternative in order, returning the first match. Errors abort
/// the search immediately.
pub fn first_match<C: ?Sized, T, E>(
    ctx: &mut C,
    alternatives: &[fn(&mut C) -> Result<Attempt<T>, E>],
) -> Result<Attempt<T>, E> {
    for alternative in alternatives {
        if let Attempt::Matched(value) = alternative(ctx)? {
            return Ok(Attempt::Matched(value));
        }
    }
    Ok(Attempt::NoMatch)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn never(_: &mut u32) -> Result<Attempt<u32>, ()> {
        Ok(Attempt::NoMatch)
    }

    fn even(n: &mut u32) -> Result<Attempt<u32>, ()> {
        Ok(if *n % 2 == 0 {
            Attempt::Matched(*n / 2)
        } else {
            Attempt::NoMatch
        })
    }

    fn fail(_: &mut u32) -> Result<Attempt<u32>, ()> {
        Err(())
    }

    #[test]
    fn test_first_match() {
        assert_eq!(first_match(&mut 4, &[never, even]), Ok(Attempt::Matched(2)));
        assert_eq!(first_match(&mut 3, &[never, even]), Ok(Attempt::NoMatch));
        assert_eq!(first_match(&mut 3, &[never, fail, even]), Err(()));
        // The search stops at the first match.
        assert_eq!(first_match(&mut 4, &[even, fail]), Ok(Attempt::Matched(2)));
    }
}
