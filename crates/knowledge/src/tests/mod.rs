//! Cross-module tests for the query pipeline.
