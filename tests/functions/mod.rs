// SPDX-License-Identifier: MIT OR Apache-2.0

#[path = "../common/mod.rs"]
pub mod common;

pub mod lock_functions;
pub mod spatial_text_functions;
pub mod wkb_functions;
