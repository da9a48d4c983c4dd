//! Background and compensating jobs.
//!
//! Everything here runs outside the workflow engine's transactions, from
//! periodic entry points. A job failing never leaves a round in an
//! inconsistent state; at worst its work is redone on the next run.

pub mod duplicates;
pub mod exports;
pub mod reminders;
