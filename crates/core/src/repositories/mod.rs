//! Repository management modules.
//!
//! Services that own stored clinic records. Only appointments are written; patients, staff and
//! services are read-only and live in [`crate::directory`].

pub mod appointments;
