use crate::history::DialogueTurn;

const NO_CONTEXT: &str = "(no matching passages)";

/// Prompt for answering `question` from the grounding `context` and prior turns.
pub fn build_answer_prompt(
    system_prompt: &str,
    history: &[DialogueTurn],
    context: &str,
    question: &str,
) -> String {
    let mut prompt = String::new();

    let system_prompt = system_prompt.trim();
    if !system_prompt.is_empty() {
        prompt.push_str(system_prompt);
        prompt.push_str("\n\n");
    }

    if !history.is_empty() {
        prompt.push_str("Conversation so far:\n");
        push_transcript(&mut prompt, history);
        prompt.push('\n');
    }

    prompt.push_str("Context:\n");
    if context.trim().is_empty() {
        prompt.push_str(NO_CONTEXT);
    } else {
        prompt.push_str(context.trim());
    }
    prompt.push_str("\n\n");

    prompt.push_str("Question: ");
    prompt.push_str(question);
    prompt.push_str("\nAnswer:");
    prompt
}

/// Prompt asking the model to rewrite a follow-up into a standalone question.
pub fn build_condense_prompt(instruction: &str, history: &[DialogueTurn], question: &str) -> String {
    let mut prompt = String::new();
    prompt.push_str(instruction.trim());
    prompt.push_str("\n\nChat History:\n");
    push_transcript(&mut prompt, history);
    prompt.push_str("Follow Up Input: ");
    prompt.push_str(question);
    prompt.push_str("\nStandalone question:");
    prompt
}

fn push_transcript(prompt: &mut String, history: &[DialogueTurn]) {
    for turn in history {
        prompt.push_str("User: ");
        prompt.push_str(&turn.question);
        prompt.push('\n');
        prompt.push_str("Assistant: ");
        prompt.push_str(&turn.answer);
        prompt.push('\n');
    }
}
