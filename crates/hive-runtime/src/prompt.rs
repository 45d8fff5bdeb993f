//! System prompt composition
//!
//! Prompts are built from tagged sections: the agent's role, its
//! instructions as a bullet list, and for team leaders the member roster with
//! the transfer tool for each member.

/// A member as shown to its team leader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSummary {
    pub name: String,
    pub role: String,
    pub transfer_tool: String,
}

/// Builder for an agent's system prompt
#[derive(Debug, Clone, Default)]
pub struct SystemPrompt {
    role: Option<String>,
    instructions: Vec<String>,
    members: Vec<MemberSummary>,
}

const HOW_TO_RESPOND: &str = "\
- You can either respond directly or transfer tasks to members of your team, depending on what each member can do.
- When you transfer a task, give a clear task_description and the expected_output, and pass along any additional_information the member needs.
- Always validate the output of a member before responding to the user.
- You can transfer the task again if you are not satisfied with the result.";

impl SystemPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the role line; blank roles are skipped
    pub fn role(mut self, role: impl Into<String>) -> Self {
        let role = role.into();
        self.role = if role.trim().is_empty() { None } else { Some(role) };
        self
    }

    /// Append instructions; blank entries are skipped
    pub fn instructions<I, S>(mut self, instructions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.instructions.extend(
            instructions
                .into_iter()
                .map(Into::into)
                .filter(|s| !s.trim().is_empty()),
        );
        self
    }

    /// Add a team member to the roster
    pub fn member(mut self, member: MemberSummary) -> Self {
        self.members.push(member);
        self
    }

    /// Render the prompt
    pub fn render(&self) -> String {
        let mut sections = Vec::new();

        if let Some(role) = &self.role {
            sections.push(format!("<your_role>\n{}\n</your_role>", role.trim()));
        }

        if !self.instructions.is_empty() {
            let bullets = self
                .instructions
                .iter()
                .map(|i| format!("- {}", i.trim()))
                .collect::<Vec<_>>()
                .join("\n");
            sections.push(format!("<instructions>\n{bullets}\n</instructions>"));
        }

        if !self.members.is_empty() {
            let roster = self
                .members
                .iter()
                .enumerate()
                .map(|(i, m)| {
                    let mut entry = format!(" - Member {}:\n   Name: {}\n", i + 1, m.name);
                    if !m.role.is_empty() {
                        entry.push_str(&format!("   Role: {}\n", m.role));
                    }
                    entry.push_str(&format!("   Transfer tool: {}", m.transfer_tool));
                    entry
                })
                .collect::<Vec<_>>()
                .join("\n");
            sections.push(format!("<team_members>\n{roster}\n</team_members>"));
            sections.push(format!("<how_to_respond>\n{HOW_TO_RESPOND}\n</how_to_respond>"));
        }

        if sections.is_empty() {
            "You are a helpful assistant.".to_string()
        } else {
            sections.join("\n\n")
        }
    }
}
