// Polish prompt templates. The prompt asks for a faithful rewrite, not an
// interpretation: same facts, same language, same voice.

pub const POLISH_SYSTEM: &str = "\
You are a dream journal polishing assistant. You rewrite dream records to be \
more vivid and readable while keeping them truthful to what was dreamed.";

pub fn build_polish_prompt(content: &str, instruction: Option<&str>) -> String {
    let mut prompt = String::from(
        "Rewrite the following dream record so it reads more smoothly and \
vividly, without changing what actually happened in the dream.\n\n\
Rules:\n\
1. Keep every key fact and detail.\n\
2. Keep the original language and the first-person voice.\n\
3. You may add light descriptive touches, never new events.\n\
4. Preserve the emotional atmosphere of the dream.\n\
5. Keep the length between 1.0x and 1.5x of the original.\n\
6. Do not add any explanation or analysis.\n\n",
    );
    if let Some(extra) = instruction {
        prompt.push_str("Special instruction: ");
        prompt.push_str(extra);
        prompt.push_str("\n\n");
    }
    prompt.push_str("Original dream record:\n");
    prompt.push_str(content);
    prompt.push_str("\n\nReturn only the polished dream record, nothing else:");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_content() {
        let prompt = build_polish_prompt("I dreamed of flying over mountains", None);
        assert!(prompt.contains("I dreamed of flying over mountains"));
        assert!(!prompt.contains("Special instruction"));
    }

    #[test]
    fn test_prompt_includes_instruction_when_given() {
        let prompt = build_polish_prompt("some dream", Some("make it more vivid"));
        assert!(prompt.contains("Special instruction: make it more vivid"));
    }
}
