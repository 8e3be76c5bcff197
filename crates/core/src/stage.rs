use std::fmt::{self, Display, Formatter};

/// The send state of one widget instance.
///
/// Only `Idle` accepts a new send. `Done` and `Error` record how the last
/// exchange ended and settle back to `Idle` as soon as the next send is
/// attempted, so a finished widget is never stuck.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Nothing is outstanding.
    #[default]
    Idle,
    /// A request is in flight.
    Sending,
    /// The last request failed.
    Error,
    /// The last request succeeded.
    Done,
}

/// Returned when a send is attempted while another one is in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct Busy;

impl Stage {
    /// Returns `true` while a request is in flight.
    #[inline]
    pub fn is_busy(self) -> bool {
        self == Stage::Sending
    }

    /// Moves `Done` and `Error` back to `Idle`.
    #[inline]
    pub(crate) fn settle(&mut self) {
        if matches!(self, Stage::Done | Stage::Error) {
            *self = Stage::Idle;
        }
    }

    /// Enters `Sending`, which is only possible from `Idle` once the
    /// previous outcome has settled.
    #[inline]
    pub(crate) fn try_begin_send(&mut self) -> Result<(), Busy> {
        self.settle();
        if *self != Stage::Idle {
            return Err(Busy);
        }
        *self = Stage::Sending;
        Ok(())
    }

    /// Leaves `Sending` with the outcome of the request.
    #[inline]
    pub(crate) fn finish(&mut self, succeeded: bool) {
        debug_assert_eq!(*self, Stage::Sending, "finished without sending");
        *self = if succeeded { Stage::Done } else { Stage::Error };
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Idle => write!(f, "idle"),
            Stage::Sending => write!(f, "sending"),
            Stage::Error => write!(f, "error"),
            Stage::Done => write!(f, "done"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_idle_accepts_send() {
        let mut stage = Stage::default();
        assert_eq!(stage.try_begin_send(), Ok(()));
        assert!(stage.is_busy());
        assert_eq!(stage.try_begin_send(), Err(Busy));
        assert_eq!(stage, Stage::Sending);
    }

    #[test]
    fn test_outcomes_settle() {
        let mut stage = Stage::default();
        stage.try_begin_send().unwrap();
        stage.finish(true);
        assert_eq!(stage, Stage::Done);
        stage.try_begin_send().unwrap();
        stage.finish(false);
        assert_eq!(stage, Stage::Error);
        stage.settle();
        assert_eq!(stage, Stage::Idle);
    }
}
