//! Unwinding recovery utilities.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::string::ToString;
use core::any::Any;
use core::panic::AssertUnwindSafe;
use std::eprintln;
use std::panic::catch_unwind;
use std::panic::resume_unwind;
use std::process::abort;
use std::thread::Result;

/// Executes `f` and captures any panic, translating that panic into a
/// `Err` result. The caller decides whether the panic is later propagated
/// with [`resume_unwinding`], reported, or dropped, so `f` can be treated as
/// exception safe.
#[inline(always)]
pub fn halt_unwinding<F, R>(func: F) -> Result<R>
where
    F: FnOnce() -> R,
{
    catch_unwind(AssertUnwindSafe(func))
}

#[cold]
pub fn resume_unwinding(payload: Box<dyn Any + Send>) -> ! {
    resume_unwind(payload)
}

/// Aborts the process if dropped while unwinding. Used to guard code that
/// must not be unwound past, because jobs still hold borrows into the stack.
pub struct AbortOnDrop;

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        eprintln!("grainpool: detected unexpected panic; aborting");
        abort();
    }
}

/// Extracts the message from a panic payload. Panics raised through `panic!`
/// carry either a `&'static str` or a `String`.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}
