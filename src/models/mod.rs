// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data models for zone annotation.

pub mod annotation;
pub mod overlay;
pub mod session;
