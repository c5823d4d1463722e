//! End-to-end scenarios for the new-bill workflow.
