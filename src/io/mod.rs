// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations for frames, operator input and zone files.

pub mod input;
pub mod media;
pub mod serialization;
