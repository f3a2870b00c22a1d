//! Entry points for host programs.
//!
//! Use [`catch`] around code that may panic, or [`install_panic_hook`] once
//! at startup to cover every thread. Use one or the other; combining them
//! analyzes the same panic twice.

use colored::Colorize;
use std::any::Any;
use std::fmt;
use std::panic::{self, Location, UnwindSafe};

use crate::analyzer::analyze;

/// Print the "enabled" banner
pub fn init() {
    println!("{} {}", "●".green(), "AI Error Analyzer Enabled".bold());
    println!("{}", "-".repeat(50));
}

/// Text carried by a panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "Box<dyn Any> (non-string panic payload)".to_string()
    }
}

/// Run `f`, analyzing its panic if it panics.
///
/// Returns `None` when `f` panicked; the panic does not propagate.
pub fn catch<F, T>(f: F) -> Option<T>
where
    F: FnOnce() -> T + UnwindSafe,
{
    catch_with(f, |message| analyze(&message))
}

pub(crate) fn catch_with<F, T, S>(f: F, sink: S) -> Option<T>
where
    F: FnOnce() -> T + UnwindSafe,
    S: FnOnce(String),
{
    match panic::catch_unwind(f) {
        Ok(value) => Some(value),
        Err(payload) => {
            sink(panic_message(&*payload));
            None
        }
    }
}

/// Analyze every panic in the process, after the previously installed hook runs
pub fn install_panic_hook() {
    install_panic_hook_with(|text| analyze(&text));
}

pub(crate) fn install_panic_hook_with<S>(sink: S)
where
    S: Fn(String) + Send + Sync + 'static,
{
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        previous(info);
        sink(panic_report(info.payload(), info.location()));
    }));
}

/// `"<message> at <file>:<line>:<col>"`, or just the message without a location
pub(crate) fn panic_report(
    payload: &(dyn Any + Send),
    location: Option<&Location<'_>>,
) -> String {
    let message = panic_message(payload);
    match location {
        Some(location) => format!(
            "{} at {}:{}:{}",
            message,
            location.file(),
            location.line(),
            location.column()
        ),
        None => message,
    }
}

/// Analyze `result`'s error, if any, and hand the result back unchanged
pub fn check<T, E: fmt::Display>(result: Result<T, E>) -> Result<T, E> {
    check_with(result, |message| analyze(&message))
}

pub(crate) fn check_with<T, E, S>(result: Result<T, E>, sink: S) -> Result<T, E>
where
    E: fmt::Display,
    S: FnOnce(String),
{
    if let Err(err) = &result {
        sink(err.to_string());
    }
    result
}

/// Analyze `err` when present; `None` is a no-op
pub fn check_error<E: fmt::Display + ?Sized>(err: Option<&E>) {
    if let Some(err) = err {
        analyze(&err.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_panic_message_str() {
        let payload: Box<dyn Any + Send> = Box::new("index out of range");
        assert_eq!(panic_message(&*payload), "index out of range");
    }

    #[test]
    fn test_panic_message_string() {
        let payload: Box<dyn Any + Send> = Box::new(format!("bad value {}", 42));
        assert_eq!(panic_message(&*payload), "bad value 42");
    }

    #[test]
    fn test_panic_message_other_payload() {
        let payload: Box<dyn Any + Send> = Box::new(7_u32);
        assert!(panic_message(&*payload).contains("non-string"));
    }

    #[test]
    fn test_panic_report_appends_location() {
        let payload: Box<dyn Any + Send> = Box::new("index out of range");
        let location = Location::caller();

        assert_eq!(
            panic_report(&*payload, Some(location)),
            format!(
                "index out of range at {}:{}:{}",
                location.file(),
                location.line(),
                location.column()
            )
        );
        assert_eq!(panic_report(&*payload, None), "index out of range");
    }

    #[test]
    fn test_panic_hook_forwards_message_and_location() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        install_panic_hook_with(move |text| sink.lock().unwrap().push(text));

        let result = panic::catch_unwind(|| panic!("hook test: slice index out of bounds"));
        // Drop our hook; the default one goes back in its place
        let _ = panic::take_hook();

        assert!(result.is_err());
        let seen = seen.lock().unwrap();
        let report = seen
            .iter()
            .find(|text| text.starts_with("hook test: slice index out of bounds at "))
            .expect("hook did not see the panic");
        assert!(report.contains("hooks.rs:"));
    }

    #[test]
    fn test_catch_with_no_panic_returns_value() {
        let seen = RefCell::new(Vec::new());
        let value = catch_with(|| 2 + 2, |m| seen.borrow_mut().push(m));
        assert_eq!(value, Some(4));
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_catch_with_panic_forwards_message() {
        let seen = RefCell::new(Vec::new());
        let value: Option<()> = catch_with(
            || panic!("assignment to entry in nil map"),
            |m| seen.borrow_mut().push(m),
        );
        assert!(value.is_none());
        assert_eq!(*seen.borrow(), vec!["assignment to entry in nil map".to_string()]);
    }

    #[test]
    fn test_check_with_ok_is_silent() {
        let mut called = false;
        let result: Result<u8, io::Error> = check_with(Ok(1), |_| called = true);
        assert_eq!(result.unwrap(), 1);
        assert!(!called);
    }

    #[test]
    fn test_check_with_err_forwards_display_and_passes_through() {
        let mut seen = None;
        let result: Result<(), io::Error> = check_with(
            Err(io::Error::new(io::ErrorKind::NotFound, "config.yaml: no such file")),
            |m| seen = Some(m),
        );
        assert!(result.is_err());
        assert_eq!(seen.as_deref(), Some("config.yaml: no such file"));
    }

    #[test]
    fn test_check_error_none_is_noop() {
        check_error::<io::Error>(None);
    }
}
