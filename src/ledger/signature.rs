//! Identity key derivation for case records
//!
//! Two records with the same signature are the same real-world case
//! regardless of their storage ids. Natural case-file references are used
//! verbatim; records without one get a synthesized key under a reserved
//! prefix so it can never collide with a natural reference.

/// Reserved prefix for synthesized signatures.
///
/// Natural case references (e.g. "II AKa 12/23") never start with this
/// token, so a synthesized key cannot shadow a real one.
pub const SYNTH_PREFIX: &str = "synth:";

/// Synthesize a fallback signature from a source prefix and the source's
/// own primary key.
pub fn synthetic(source: &str, native_id: i64) -> String {
    format!("{SYNTH_PREFIX}{source}-{native_id}")
}

/// Derive the signature for an incoming record: the natural case-file
/// reference when the source supplied a non-empty one, otherwise a
/// synthesized fallback.
///
/// Pure and deterministic — the same input always yields the same
/// signature, which dedup across harvest runs depends on.
pub fn derive(natural: Option<&str>, source: &str, native_id: i64) -> String {
    match natural.map(str::trim) {
        Some(reference) if !reference.is_empty() => reference.to_string(),
        _ => synthetic(source, native_id),
    }
}

/// Whether a signature was synthesized rather than source-provided.
pub fn is_synthetic(signature: &str) -> bool {
    signature.starts_with(SYNTH_PREFIX)
}
