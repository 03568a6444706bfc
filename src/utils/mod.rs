// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub(crate) mod sync;

pub(crate) use sync::{lock, read, write};
