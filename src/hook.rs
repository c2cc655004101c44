//! Callback sinks.
//!
//! A hook sees every event that passes the threshold, synchronously and in
//! the emitting thread. It receives the whole composed line (tag included)
//! and the length of the tag, so it can skip the `identity[pid]: ` prefix if
//! it wants to.

use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, unbounded};

/// What makes two registrations the same hook: a callback address and an
/// argument word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookKey {
    pub callback: usize,
    pub arg: usize,
}

pub trait LogHook: Send + Sync {
    fn on_message(&self, message: &str, tag_len: usize);

    /// Registration identity. Defaults to the address of the hook object.
    fn key(&self) -> HookKey {
        HookKey {
            callback: (self as *const Self).cast::<()>() as usize,
            arg: 0,
        }
    }
}

impl<F> LogHook for F
where
    F: Fn(&str, usize) + Send + Sync,
{
    fn on_message(&self, message: &str, tag_len: usize) {
        self(message, tag_len)
    }
}

/// Callback shape taking an explicit argument.
pub type HookFn<A> = fn(message: &str, tag_len: usize, arg: &A);

/// An argument reduced to one word for hook identity.
///
/// Shared pointers and references count by address, integers by value.
pub trait HookArg: Send + Sync {
    fn identity(&self) -> usize;
}

impl<T: ?Sized + Send + Sync> HookArg for Arc<T> {
    fn identity(&self) -> usize {
        Arc::as_ptr(self).cast::<()>() as usize
    }
}

impl<T: ?Sized + Sync> HookArg for &'static T {
    fn identity(&self) -> usize {
        (*self as *const T).cast::<()>() as usize
    }
}

impl HookArg for () {
    fn identity(&self) -> usize {
        0
    }
}

macro_rules! integer_hook_arg {
    ($($ty:ty),*) => {
        $(impl HookArg for $ty {
            fn identity(&self) -> usize {
                *self as usize
            }
        })*
    };
}

integer_hook_arg!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

/// A plain function paired with the argument it is called with.
///
/// The same function may be registered several times, once per argument.
/// Two `FnHook`s with the same function and argument identity are the same
/// hook, even when built separately.
pub struct FnHook<A> {
    callback: HookFn<A>,
    arg: A,
}

impl<A: HookArg> FnHook<A> {
    pub fn new(callback: HookFn<A>, arg: A) -> Arc<Self> {
        Arc::new(Self { callback, arg })
    }

    pub fn arg(&self) -> &A {
        &self.arg
    }
}

impl<A: HookArg> LogHook for FnHook<A> {
    fn on_message(&self, message: &str, tag_len: usize) {
        (self.callback)(message, tag_len, &self.arg)
    }

    fn key(&self) -> HookKey {
        HookKey {
            callback: self.callback as usize,
            arg: self.arg.identity(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMessage {
    pub message: String,
    pub tag_len: usize,
}

impl LogMessage {
    /// The line without its `identity[pid]: ` tag.
    pub fn body(&self) -> &str {
        &self.message[self.tag_len..]
    }
}

/// Forwards every message to an unbounded channel.
///
/// Sends never block; once the receiver is gone messages are dropped.
pub struct ChannelHook {
    sender: Sender<LogMessage>,
}

impl ChannelHook {
    pub fn channel() -> (Arc<Self>, Receiver<LogMessage>) {
        let (sender, receiver) = unbounded();
        (Arc::new(Self { sender }), receiver)
    }
}

impl LogHook for ChannelHook {
    fn on_message(&self, message: &str, tag_len: usize) {
        self.sender
            .send(LogMessage {
                message: message.to_string(),
                tag_len,
            })
            .ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_fn_hook_passes_its_argument() {
        fn record(message: &str, tag_len: usize, seen: &Arc<Mutex<Vec<String>>>) {
            seen.lock().unwrap().push(message[tag_len..].to_string());
        }
        let hook = FnHook::new(record, Arc::new(Mutex::new(Vec::new())));
        hook.on_message("svc[1]: info: up\n", 8);
        assert_eq!(*hook.arg().lock().unwrap(), vec!["info: up\n".to_string()]);
    }

    fn count(_: &str, _: usize, calls: &Arc<Mutex<u32>>) {
        *calls.lock().unwrap() += 1;
    }

    fn reset(_: &str, _: usize, calls: &Arc<Mutex<u32>>) {
        *calls.lock().unwrap() = 0;
    }

    #[test]
    fn test_fn_hook_key_is_callback_and_argument() {
        let shared = Arc::new(Mutex::new(0));
        let first = FnHook::new(count, Arc::clone(&shared));
        let again = FnHook::new(count, Arc::clone(&shared));
        assert_eq!(first.key(), again.key());
        assert_ne!(first.key(), FnHook::new(count, Arc::new(Mutex::new(0))).key());
        assert_ne!(first.key(), FnHook::new(reset, shared).key());

        fn by_value(_: &str, _: usize, _: &u32) {}
        assert_eq!(FnHook::new(by_value, 7).key().arg, 7);
    }

    #[test]
    fn test_default_key_is_the_object_address() {
        let (first, _rx) = ChannelHook::channel();
        let (second, _rx2) = ChannelHook::channel();
        assert_eq!(first.key(), Arc::clone(&first).key());
        assert_ne!(first.key(), second.key());
    }

    #[test]
    fn test_channel_hook_forwards_messages() {
        let (hook, receiver) = ChannelHook::channel();
        hook.on_message("svc[1]: warn: low\n", 8);
        let message = receiver.try_recv().unwrap();
        assert_eq!(message.tag_len, 8);
        assert_eq!(message.body(), "warn: low\n");
        drop(receiver);
        // no receiver left, must not panic
        hook.on_message("svc[1]: warn: again\n", 8);
    }

    #[test]
    fn test_closure_is_a_hook() {
        let count = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&count);
        let hook = move |_: &str, _: usize| *counter.lock().unwrap() += 1;
        hook.on_message("x", 0);
        hook.on_message("y", 0);
        assert_eq!(*count.lock().unwrap(), 2);
    }
}
