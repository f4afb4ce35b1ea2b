//! End-to-end tests for the refinement core live in `tests/`.
