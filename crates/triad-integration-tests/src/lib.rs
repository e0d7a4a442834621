//! Cross-crate scenarios for the triad workspace live under `tests/`.
