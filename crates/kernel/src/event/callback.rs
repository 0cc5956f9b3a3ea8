//! Ordered, append-only callback lists.
//!
//! A [`CallbackList`] is the single-key unit every queue is built from.
//! Callbacks receive a mutable context and a shared argument value.
//!
//! Callbacks are reference counted so a list can be snapshotted before it
//! runs. Dispatch never removes anything from the owning context.

use std::fmt;
use std::rc::Rc;

/// An ordered list of callbacks over context `C` and argument `A`.
pub struct CallbackList<C, A: ?Sized> {
    callbacks: Vec<Rc<dyn Fn(&mut C, &A)>>,
}

impl<C, A: ?Sized> Default for CallbackList<C, A> {
    fn default() -> Self {
        Self {
            callbacks: Vec::new(),
        }
    }
}

impl<C, A: ?Sized> Clone for CallbackList<C, A> {
    fn clone(&self) -> Self {
        Self {
            callbacks: self.callbacks.clone(),
        }
    }
}

impl<C, A: ?Sized> fmt::Debug for CallbackList<C, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackList")
            .field("len", &self.callbacks.len())
            .finish()
    }
}

impl<C, A: ?Sized> CallbackList<C, A> {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a callback. The same closure logic registered twice runs twice.
    pub fn push<F>(&mut self, callback: F)
    where
        F: Fn(&mut C, &A) + 'static,
    {
        self.callbacks.push(Rc::new(callback));
    }

    /// Invoke every callback in registration order. Returns how many ran.
    pub fn fire(&self, ctx: &mut C, args: &A) -> usize {
        for callback in &self.callbacks {
            callback(ctx, args);
        }
        self.callbacks.len()
    }

    /// Number of callbacks.
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// True when no callbacks are registered.
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

/// Fire a list stored inside `ctx` with full mutable access to `ctx`.
///
/// `list` picks the list out of the context. It is snapshotted first, so
/// callbacks added during dispatch run from the next fire on, and the stored
/// list is left untouched if a callback panics.
pub fn fire_snapshot<C, A: ?Sized>(
    ctx: &mut C,
    list: impl FnOnce(&C) -> Option<&CallbackList<C, A>>,
    args: &A,
) -> usize {
    let Some(snapshot) = list(ctx).cloned() else {
        return 0;
    };
    snapshot.fire(ctx, args)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use super::*;

    #[test]
    fn fires_in_registration_order() {
        let mut list: CallbackList<Vec<&'static str>, ()> = CallbackList::new();
        list.push(|log: &mut Vec<&'static str>, _: &()| log.push("first"));
        list.push(|log: &mut Vec<&'static str>, _: &()| log.push("second"));
        list.push(|log: &mut Vec<&'static str>, _: &()| log.push("first"));

        let mut log = Vec::new();
        assert_eq!(list.fire(&mut log, &()), 3);
        assert_eq!(log, vec!["first", "second", "first"]);
    }

    #[test]
    fn passes_the_same_arguments_to_every_callback() {
        let mut list: CallbackList<Vec<i64>, [i64]> = CallbackList::new();
        list.push(|out: &mut Vec<i64>, args: &[i64]| out.extend_from_slice(args));
        list.push(|out: &mut Vec<i64>, args: &[i64]| out.push(args.iter().sum()));

        let mut out = Vec::new();
        list.fire(&mut out, &[1, 2, 3]);
        assert_eq!(out, vec![1, 2, 3, 6]);
    }

    struct Host {
        hooks: CallbackList<Host, u32>,
        log: Vec<String>,
    }

    impl Host {
        fn new() -> Self {
            Self {
                hooks: CallbackList::new(),
                log: Vec::new(),
            }
        }

        fn fire(&mut self, n: u32) -> usize {
            fire_snapshot(self, |h| Some(&h.hooks), &n)
        }
    }

    #[test]
    fn callbacks_added_during_dispatch_run_next_time() {
        let mut host = Host::new();
        host.hooks.push(|h: &mut Host, _: &u32| {
            h.log.push("original".into());
            h.hooks.push(|h: &mut Host, _: &u32| h.log.push("added".into()));
        });

        assert_eq!(host.fire(0), 1);
        assert_eq!(host.log, vec!["original"]);
        assert_eq!(host.hooks.len(), 2);

        host.log.clear();
        host.fire(0);
        assert_eq!(host.log, vec!["original", "added"]);
    }

    #[test]
    fn a_callback_can_fire_its_own_list() {
        let mut host = Host::new();
        host.hooks.push(|h: &mut Host, n: &u32| {
            h.log.push(format!("n={n}"));
            if *n > 0 {
                h.fire(n - 1);
            }
        });

        host.fire(2);
        assert_eq!(host.log, vec!["n=2", "n=1", "n=0"]);
    }

    #[test]
    fn list_survives_a_panicking_callback() {
        let mut host = Host::new();
        host.hooks.push(|h: &mut Host, n: &u32| {
            h.log.push(format!("n={n}"));
            assert!(*n > 0, "zero");
        });

        let result = catch_unwind(AssertUnwindSafe(|| host.fire(0)));
        assert!(result.is_err());
        assert_eq!(host.hooks.len(), 1);
        assert_eq!(host.fire(1), 1);
        assert_eq!(host.log, vec!["n=0", "n=1"]);
    }

    #[test]
    fn missing_list_fires_nothing() {
        let mut count = 0u32;
        let fired = fire_snapshot(&mut count, |_| None::<&CallbackList<u32, ()>>, &());
        assert_eq!(fired, 0);
    }
}
