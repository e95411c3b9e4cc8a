//! End-to-end tests driving the assembled router.
