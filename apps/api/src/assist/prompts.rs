// Completion prompts for the conversational assistant.

use crate::assist::sections::SectionFieldConfig;
use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;

/// Instruction asking for `{chat_reply, field_updates}` restricted to the section's fields.
pub fn field_extraction_instruction(section: &SectionFieldConfig) -> String {
    format!(
        "You are extracting structured data for {description}. \
        Respond strictly with a JSON object shaped as \
        {{\"chat_reply\": \"<natural language response for the user>\", \
        \"field_updates\": {{ \"<field>\": \"<value>\" }}}}. \
        Only include keys in field_updates from this allowlist: {fields}. \
        If you have no structured updates, return an empty object for field_updates. \
        All field values must be plain strings without markdown or trailing commentary. \
        {JSON_ONLY_INSTRUCTION}",
        description = section.description,
        fields = section.fields.join(", "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assist::sections::section_config;

    #[test]
    fn test_instruction_lists_allowed_fields() {
        let instruction = field_extraction_instruction(section_config(4).unwrap());
        assert!(instruction.contains("Problem / Opportunity statement details"));
        assert!(instruction.contains("problemDescription, supportingEvidence"));
        assert!(instruction.contains("\"chat_reply\""));
    }
}
