// "Analyze" workflow: build a prompt from stored records, send it to the
// summarizer, and hand back text for the summary panel.

pub mod guard;
pub mod handlers;
pub mod prompts;
