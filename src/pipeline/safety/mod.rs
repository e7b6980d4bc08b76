//! Safety guard and output assembly.
//!
//! Owns the two outward surfaces: the structured payload handed to the
//! narrative layer, and the final per-persona rendered outputs. Generated
//! text passes through the banned-phrase scan before assembly, and every
//! rendered output ends with its fixed disclaimer.

mod payload;
mod phrases;
mod render;

pub use payload::ReasoningPayload;
pub use phrases::{scan_banned_phrases, PhraseHit};
pub use render::{
    render_clinician, render_patient, RenderedOutput, CLINICIAN_DISCLAIMER, PATIENT_DISCLAIMER,
    PATIENT_QUESTIONS,
};
