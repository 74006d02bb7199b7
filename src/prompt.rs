//! Prompt composition. Pure functions from the current message, the recent
//! history window, and optional document text to a single completion request
//! string.

use crate::db::models::MessageTurn;

pub const SYSTEM_PROMPT: &str = "You are an intelligent AI assistant. Use your full knowledge to provide helpful, accurate, and detailed responses. ";

pub const EMPTY_MESSAGE_NOTICE: &str = "Please enter a message";
pub const FALLBACK_REPLY: &str =
    "I'm sorry, I couldn't generate a response. Please try again.";
pub const EMPTY_FILE_NOTICE: &str = "File appears to be empty";
pub const NO_ANALYSIS_NOTICE: &str = "Unable to generate analysis for this file";

/// Hard cap on document context, applied both when composing prompts and to
/// the value handed back for persistence.
pub const DOCUMENT_CONTEXT_LIMIT: usize = 8000;

/// Truncates to at most `max` characters (not bytes), on a char boundary.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Renders prior turns as alternating "User:"/"AI:" lines. Turns are expected
/// in chronological order.
fn history_block(turns: &[MessageTurn]) -> String {
    let mut block = String::new();
    for turn in turns {
        block.push_str(&format!("User: {}\nAI: {}\n\n", turn.message, turn.response));
    }
    block
}

/// Builds the completion request. Presence of history and document context
/// selects one of four templates; this is the whole branching logic.
pub fn compose_chat_prompt(
    message: &str,
    history: &[MessageTurn],
    file_context: &str,
) -> String {
    let document = truncate_chars(file_context, DOCUMENT_CONTEXT_LIMIT);
    let conversation = history_block(history);

    match (!document.is_empty(), !conversation.is_empty()) {
        (true, true) => format!(
            "{SYSTEM_PROMPT}Here's our conversation context:\n{conversation}\nDocument context:\n{document}\n\nUser: {message}\n\nProvide a comprehensive response using the document, our conversation, and your knowledge."
        ),
        (true, false) => format!(
            "{SYSTEM_PROMPT}Document context:\n{document}\n\nUser: {message}\n\nAnalyze the document and answer using both the document content and your knowledge."
        ),
        (false, true) => format!(
            "{SYSTEM_PROMPT}Previous conversation:\n{conversation}\nUser: {message}\n\nRespond naturally using our conversation context and your full knowledge base."
        ),
        (false, false) => format!(
            "{SYSTEM_PROMPT}User: {message}\n\nProvide a helpful and informative response."
        ),
    }
}

/// Fixed structured-summary template for uploaded documents. `content` must
/// already be capped by the caller.
pub fn compose_analysis_prompt(filename: &str, content: &str) -> String {
    format!(
        r#"Analyze the file '{filename}' and provide a structured summary:

### **Title:** [Extract main title/topic]

### **Purpose:**
[2-3 lines describing the main purpose/objective]

---

### **Sections Overview:**

#### ✅ **[Section 1 Name]**
- [Key points from this section]

#### 📝 **[Section 2 Name]**
- [Key points from this section]

#### 🚀 **[Section 3 Name]**
- [Key points from this section]

---

File content:
{content}

Provide a professional, well-organized analysis."#
    )
}
