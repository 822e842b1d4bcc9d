//! Board platform descriptions for FPGA carrier boards.
//!
//! A platform description ties together:
//! - **IO table:** logical resources bound to package pins and I/O standards
//! - **Device:** the exact target part
//! - **Toolchain steps:** bitstream settings and post-build multiboot images
//! - **Programmers:** the debug/flash backends the board supports
//!
//! Finalizing an elaborated design against a description yields the pin
//! and clock constraints for that design.

pub mod command;
pub mod design;
pub mod error;
pub mod hash;
pub mod multiboot;
pub mod parse;
pub mod pins;
pub mod platform;
pub mod programmer;
pub mod tcl;
pub mod timecard;
pub mod xdc;

pub use design::{ConstraintSet, Design, PeriodConstraint};
pub use error::{PlatformError, Result};
pub use pins::{PinConstraint, ResourceId, SubSignal};
pub use platform::PlatformDescriptor;
pub use programmer::{Programmer, ProgrammerKind};
