//! # ESC/POS Protocol
//!
//! Command builders for the ESC/POS control language spoken by the thermal
//! receipt printers this subsystem targets (Epson TM series and the many
//! compatible clones found in POS installations).
//!
//! Commands are byte sequences prefixed with an escape character:
//!
//! - `ESC` (0x1B) for text formatting and paper feed
//! - `GS` (0x1D) for character scaling and the cutter
//!
//! The builders here return plain `Vec<u8>` so callers can concatenate
//! them freely; the [`crate::encoder`] module is the only intended caller
//! and owns the turn-on/emit/turn-off discipline.

pub mod commands;
