//! Prompt assembly for prioritization requests.

/// Label that opens the context segment.
pub const CONTEXT_LABEL: &str = "Here is the context for my work:\n\n";

/// Instruction that precedes the task list when context is supplied.
pub const CONTEXT_TASKS_INSTRUCTION: &str =
    "\n\nNow, here is my task list. Please prioritize it using the context I provided:\n\n";

/// Render tasks as `- <task>` lines in input order.
#[must_use]
pub fn render_task_list<S: AsRef<str>>(tasks: &[S]) -> String {
    let mut out = String::new();
    for (i, task) in tasks.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str("- ");
        out.push_str(task.as_ref());
    }
    out
}

/// Build the text segments sent to the model.
///
/// Without context (or with an empty context string) the result is a single segment
/// holding the bulleted list. With context it is two segments: the labelled
/// context, then the instruction followed by the list.
#[must_use]
pub fn build_prompt_segments<S: AsRef<str>>(tasks: &[S], context: Option<&str>) -> Vec<String> {
    let list = render_task_list(tasks);

    match context.filter(|c| !c.is_empty()) {
        Some(context) => vec![
            format!("{CONTEXT_LABEL}{context}"),
            format!("{CONTEXT_TASKS_INSTRUCTION}{list}"),
        ],
        None => vec![list],
    }
}
