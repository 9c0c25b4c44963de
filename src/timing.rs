//! Execution timing
//!
//! [`TimedExecution`] wraps functions so that every completed call logs its
//! wall-clock duration at DEBUG through one emitter:
//!
//! ```text
//! The function 'load_index' takes 0.0132 [seg]
//! ```
//!
//! The wrapper keeps the function's argument list: a function of `n` arguments
//! is called with an `n`-tuple (`()` for none, `(x,)` for one). Nothing is
//! logged when the call fails, whether it panics or returns `Err` through
//! [`Timed::try_call`].

use std::borrow::Cow;
use std::future::Future;
use std::panic::Location;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::emitter::Emitter;
use crate::handler::Record;
use crate::severity::Severity;

/// Calling a function with its arguments packed in a tuple
pub trait Invoke<Args> {
    type Output;

    fn invoke(&self, args: Args) -> Self::Output;
}

macro_rules! impl_invoke {
    ($($arg:ident),*) => {
        impl<Func, Out, $($arg),*> Invoke<($($arg,)*)> for Func
        where
            Func: Fn($($arg),*) -> Out,
        {
            type Output = Out;

            #[allow(non_snake_case)]
            fn invoke(&self, ($($arg,)*): ($($arg,)*)) -> Out {
                (self)($($arg),*)
            }
        }
    };
}

impl_invoke!();
impl_invoke!(A);
impl_invoke!(A, B);
impl_invoke!(A, B, C);
impl_invoke!(A, B, C, D);
impl_invoke!(A, B, C, D, E);
impl_invoke!(A, B, C, D, E, G);

/// Wraps functions so their calls are timed through one emitter
#[derive(Debug, Clone)]
pub struct TimedExecution {
    emitter: Arc<Emitter>,
}

impl TimedExecution {
    pub fn new(emitter: Arc<Emitter>) -> Self {
        Self { emitter }
    }

    pub fn emitter(&self) -> &Arc<Emitter> {
        &self.emitter
    }

    /// Wrap `func`, reporting it as `name`
    pub fn wrap<F>(&self, name: impl Into<Cow<'static, str>>, func: F) -> Timed<F> {
        Timed {
            name: name.into(),
            doc: None,
            func,
            emitter: self.emitter.clone(),
        }
    }
}

/// Wrap a named function, using its path as the reported name.
///
/// ```
/// use emitter_registry::{Registry, timed};
///
/// fn checksum(data: &[u8]) -> u32 {
///     data.iter().map(|b| *b as u32).sum()
/// }
///
/// let registry = Registry::new();
/// let timer = registry.register_timed_execution(&registry.get_emitter("demo"));
/// let checksum = timed!(timer, checksum);
/// assert_eq!(checksum.name(), "checksum");
/// assert_eq!(checksum.call((&[1u8, 2, 3][..],)), 6);
/// ```
#[macro_export]
macro_rules! timed {
    ($timer:expr, $func:path) => {
        $timer.wrap(stringify!($func), $func)
    };
}

/// A function wrapped by [`TimedExecution::wrap`]
#[derive(Debug, Clone)]
pub struct Timed<F> {
    name: Cow<'static, str>,
    doc: Option<Cow<'static, str>>,
    func: F,
    emitter: Arc<Emitter>,
}

impl<F> Timed<F> {
    /// Attach documentation for introspection
    pub fn with_doc(mut self, doc: impl Into<Cow<'static, str>>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// The wrapped function itself
    pub fn inner(&self) -> &F {
        &self.func
    }

    /// Call and log the elapsed time; the result is returned unchanged
    #[track_caller]
    pub fn call<Args>(&self, args: Args) -> <F as Invoke<Args>>::Output
    where
        F: Invoke<Args>,
    {
        let caller = Location::caller();
        let start = Instant::now();
        let output = self.func.invoke(args);
        self.report(caller, start.elapsed());
        output
    }

    /// Call a fallible function; `Err` is returned as is and not logged
    #[track_caller]
    pub fn try_call<Args, T, E>(&self, args: Args) -> Result<T, E>
    where
        F: Invoke<Args, Output = Result<T, E>>,
    {
        let caller = Location::caller();
        let start = Instant::now();
        let value = self.func.invoke(args)?;
        self.report(caller, start.elapsed());
        Ok(value)
    }

    /// Call an async function, timing until its future completes
    #[track_caller]
    pub fn call_async<Args, Fut>(&self, args: Args) -> impl Future<Output = Fut::Output>
    where
        F: Invoke<Args, Output = Fut>,
        Fut: Future,
    {
        let caller = Location::caller();
        async move {
            let start = Instant::now();
            let output = self.func.invoke(args).await;
            self.report(caller, start.elapsed());
            output
        }
    }

    /// Async counterpart of [`Timed::try_call`]
    #[track_caller]
    pub fn try_call_async<Args, Fut, T, E>(&self, args: Args) -> impl Future<Output = Result<T, E>>
    where
        F: Invoke<Args, Output = Fut>,
        Fut: Future<Output = Result<T, E>>,
    {
        let caller = Location::caller();
        async move {
            let start = Instant::now();
            let value = self.func.invoke(args).await?;
            self.report(caller, start.elapsed());
            Ok(value)
        }
    }

    fn report(&self, caller: &'static Location<'static>, elapsed: Duration) {
        if !self.emitter.is_enabled_for(Severity::Debug) {
            return;
        }
        let message = format!("The function '{}' takes {:.4} [seg]", self.name, elapsed.as_secs_f64());
        let record = Record::new(Severity::Debug, self.emitter.name(), caller.file(), caller.line(), message);
        self.emitter.log_record(&record);
    }
}
