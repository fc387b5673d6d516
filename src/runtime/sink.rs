//! Outbound entry-action dispatch.

use crate::core::StateId;
use std::marker::PhantomData;

/// Receiver of entry actions, implemented by the host.
///
/// The runtime calls [`on_enter`](ActionSink::on_enter) synchronously every
/// time a state becomes active, before `execute` or `force_transition`
/// returns. The sink is owned by the session and holds no handle back to
/// it, so it cannot re-enter evaluation; work that would need another
/// evaluation belongs in the next tick.
///
/// # Example
///
/// ```rust
/// use hsm_runtime::core::StateId;
/// use hsm_runtime::runtime::ActionSink;
///
/// #[derive(Default)]
/// struct Entered(Vec<StateId>);
///
/// impl ActionSink<String> for Entered {
///     fn on_enter(&mut self, state: StateId, _tag: Option<&String>) {
///         self.0.push(state);
///     }
/// }
/// ```
pub trait ActionSink<T> {
    fn on_enter(&mut self, state: StateId, tag: Option<&T>);
}

impl<T, A: ActionSink<T> + ?Sized> ActionSink<T> for Box<A> {
    fn on_enter(&mut self, state: StateId, tag: Option<&T>) {
        (**self).on_enter(state, tag)
    }
}

impl<T, A: ActionSink<T> + ?Sized> ActionSink<T> for &mut A {
    fn on_enter(&mut self, state: StateId, tag: Option<&T>) {
        (**self).on_enter(state, tag)
    }
}

/// Sink that ignores every entry.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl<T> ActionSink<T> for NoopSink {
    fn on_enter(&mut self, _state: StateId, _tag: Option<&T>) {}
}

/// Adapter turning a closure into a sink.
///
/// # Example
///
/// ```rust
/// use hsm_runtime::core::StateId;
/// use hsm_runtime::runtime::{ActionSink, FnSink};
///
/// let mut entered = Vec::new();
/// let mut sink = FnSink::new(|state: StateId, _tag: Option<&()>| entered.push(state));
/// sink.on_enter(StateId(2), None);
/// drop(sink);
/// assert_eq!(entered, vec![StateId(2)]);
/// ```
pub struct FnSink<T, F> {
    callback: F,
    _phantom: PhantomData<fn(&T)>,
}

impl<T, F> FnSink<T, F>
where
    F: FnMut(StateId, Option<&T>),
{
    pub fn new(callback: F) -> Self {
        Self {
            callback,
            _phantom: PhantomData,
        }
    }
}

impl<T, F> ActionSink<T> for FnSink<T, F>
where
    F: FnMut(StateId, Option<&T>),
{
    fn on_enter(&mut self, state: StateId, tag: Option<&T>) {
        (self.callback)(state, tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        entered: Vec<(StateId, Option<u8>)>,
    }

    impl ActionSink<u8> for Recorder {
        fn on_enter(&mut self, state: StateId, tag: Option<&u8>) {
            self.entered.push((state, tag.copied()));
        }
    }

    fn dispatch<S: ActionSink<u8>>(mut sink: S, state: u32, tag: Option<u8>) {
        sink.on_enter(StateId(state), tag.as_ref());
    }

    #[test]
    fn borrowed_sink_forwards() {
        let mut recorder = Recorder::default();
        dispatch(&mut recorder, 3, None);
        dispatch(&mut recorder, 4, Some(1));
        assert_eq!(recorder.entered, vec![(StateId(3), None), (StateId(4), Some(1))]);
    }

    #[test]
    fn boxed_sink_forwards() {
        let mut recorder = Recorder::default();
        let boxed: Box<dyn ActionSink<u8> + '_> = Box::new(&mut recorder);
        dispatch(boxed, 1, Some(4));
        assert_eq!(recorder.entered, vec![(StateId(1), Some(4))]);
    }

    #[test]
    fn closure_sink_receives_tag() {
        let mut tags = Vec::new();
        {
            let mut sink = FnSink::new(|_: StateId, tag: Option<&u8>| tags.push(tag.copied()));
            sink.on_enter(StateId(0), Some(&9));
            sink.on_enter(StateId(1), None);
        }
        assert_eq!(tags, vec![Some(9), None]);
    }

    #[test]
    fn noop_sink_accepts_anything() {
        let mut sink = NoopSink;
        ActionSink::<u8>::on_enter(&mut sink, StateId(5), Some(&1));
    }
}
