// SPDX-License-Identifier: MIT OR Apache-2.0

pub mod attribute;

pub use self::attribute::Type;
