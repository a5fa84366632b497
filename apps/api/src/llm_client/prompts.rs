// Shared prompt constants for the summarization endpoint.
// Per-record-type prompt templates live in analysis/prompts.rs.

/// System instruction sent with every summary request.
pub const SUMMARY_SYSTEM: &str = "\
    Write a summary of less than 50 words about the user's current status. \
    Use simple, warm and supportive language, open with a greeting, \
    and include a few emoji.";
