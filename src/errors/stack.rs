// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Stack-capturing error decoration.
//!
//! An error crossing the scheduler boundary is wrapped together with the call
//! stack captured at the moment it was first wrapped. Wrapping an error that is
//! already wrapped hands back the very same value, so a stack is captured once
//! no matter how many layers forward the error.

use std::backtrace::Backtrace;
use std::fmt;
use std::sync::Arc;

use super::Error;

/// An error together with the stack captured when it was first wrapped.
///
/// Displays exactly like the error it carries.
#[derive(Debug)]
pub struct Traced {
    inner: Box<Error>,
    stack: Arc<Backtrace>,
}

impl Traced {
    pub fn inner(&self) -> &Error {
        &self.inner
    }

    pub fn stack(&self) -> &Arc<Backtrace> {
        &self.stack
    }

    pub fn into_inner(self) -> Error {
        *self.inner
    }
}

impl fmt::Display for Traced {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl std::error::Error for Traced {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(self.inner.as_ref())
    }
}

/// Decorates `err` with the current call stack unless it already carries one.
pub fn wrap(err: Error) -> Error {
    match err {
        Error::Traced(_) => err,
        other => Error::Traced(Traced {
            inner: Box::new(other),
            stack: Arc::new(Backtrace::force_capture()),
        }),
    }
}
