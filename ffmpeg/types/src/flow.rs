/*!
    Non-error outcomes of stage calls.
*/

/**
    Outcome of a push or pull against a pipeline stage.

    Every stage operation returns `Result<Flow<T>>`. The `Err` side carries
    genuine failures; everything in here is expected control flow and should
    never be logged as an error.

    - Pulls (`read_packet`, `decode_next_frame`, `filter_frame`) produce
      `Ready(value)`, `NeedMoreInput` or `EndOfStream`.
    - Pushes (`send_packet`, `send_frame`) produce `Ready(())` when the input
      was taken, or `Busy` when output must be drained before resubmitting.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
#[must_use]
pub enum Flow<T> {
    /// A value was produced, or the input was accepted.
    Ready(T),
    /// The input was not taken. Drain output, then resubmit the same input.
    Busy,
    /// Nothing to emit until more input arrives.
    NeedMoreInput,
    /// No more output will ever be produced.
    EndOfStream,
}

impl<T> Flow<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy)
    }

    pub fn is_need_more_input(&self) -> bool {
        matches!(self, Self::NeedMoreInput)
    }

    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Self::EndOfStream)
    }

    /**
        Returns the ready value, discarding any control signal.
    */
    pub fn ready(self) -> Option<T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    /**
        Maps the ready value, leaving control signals untouched.
    */
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Flow<U> {
        match self {
            Self::Ready(value) => Flow::Ready(f(value)),
            Self::Busy => Flow::Busy,
            Self::NeedMoreInput => Flow::NeedMoreInput,
            Self::EndOfStream => Flow::EndOfStream,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ready_extracts_value() {
        assert_eq!(Flow::Ready(7).ready(), Some(7));
        assert_eq!(Flow::<i32>::NeedMoreInput.ready(), None);
        assert_eq!(Flow::<i32>::EndOfStream.ready(), None);
    }

    #[test]
    fn map_preserves_signals() {
        assert_eq!(Flow::Ready(2).map(|v| v * 10), Flow::Ready(20));
        assert_eq!(Flow::<i32>::Busy.map(|v| v * 10), Flow::Busy);
        assert_eq!(Flow::<i32>::EndOfStream.map(|v| v * 10), Flow::EndOfStream);
    }

    #[test]
    fn predicates() {
        assert!(Flow::Ready(()).is_ready());
        assert!(Flow::<()>::Busy.is_busy());
        assert!(Flow::<()>::NeedMoreInput.is_need_more_input());
        assert!(Flow::<()>::EndOfStream.is_end_of_stream());
        assert!(!Flow::<()>::EndOfStream.is_ready());
    }
}
