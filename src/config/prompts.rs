//! Prompt templates for Commentary.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory,
//! one file per stage (`filter.toml`, `router.toml`, `praise.toml`, `search.toml`,
//! `synthesis.toml`, `question.toml`).

use crate::llm::StageKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Marker the web search stage emits when it finds nothing relevant.
pub const NO_RELEVANT_RESULTS: &str = "NO_RELEVANT_RESULTS";

/// Marker the synthesis stage emits when neither source can answer the question.
pub const NO_INFORMATION: &str = "NO_INFORMATION";

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Prompts {
    pub filter: StagePrompt,
    pub router: StagePrompt,
    pub praise: StagePrompt,
    pub search: StagePrompt,
    pub synthesis: StagePrompt,
    pub question: StagePrompt,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// System and user templates for one stage.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StagePrompt {
    pub system: String,
    pub user: String,
}

impl StagePrompt {
    fn new(system: &str, user: &str) -> Self {
        Self {
            system: system.to_string(),
            user: user.to_string(),
        }
    }
}

impl Default for Prompts {
    fn default() -> Self {
        Self {
            filter: StagePrompt::new(
                r#"You screen comments left on a YouTube channel and decide whether they deserve a reply.

Answer IGNORE only when the comment is:
- spam, self-promotion or a link drop
- abusive, hateful or otherwise inappropriate
- empty, or nothing but emojis

Answer ACCEPT for everything else, including:
- questions of any size
- praise or thanks, even a bare "thanks" or "great video"
- personal stories and experiences
- requests for help or clarification

Be lenient. When unsure, ACCEPT.
Reply with exactly one word: ACCEPT or IGNORE."#,
                "Comment:\n{{comment}}",
            ),

            router: StagePrompt::new(
                r#"You sort accepted YouTube comments into one of two buckets.

Question: the viewer asks something, wants information, clarification or advice
("how", "what", "why", "can you", "kya", a question mark, ...).

Praise: the viewer thanks, compliments or shares positive feedback without asking anything.

If a comment both praises and asks, it is a Question.
Reply with exactly one word: Question or Praise."#,
                "Comment:\n{{comment}}",
            ),

            praise: StagePrompt::new(
                r#"You reply to appreciative comments on the channel, in the creator's own voice.

These are real replies the creator has written. Match their tone, language mix and length:

{{exemplars}}

Rules:
- one or two short sentences
- casual and warm, never formal
- mirror how the viewer addresses you
- emojis are fine, sparingly

Reply with the response text only."#,
                "Comment:\n{{comment}}",
            ),

            search: StagePrompt::new(
                r#"You research questions from YouTube viewers on the web.

Search for the question and report what you find:
- keep only facts that bear directly on the question
- cite sources where you can
- never add facts the results do not contain

If nothing relevant turns up, reply with exactly NO_RELEVANT_RESULTS."#,
                "{{question}}",
            ),

            synthesis: StagePrompt::new(
                r#"You merge research notes into a single brief that another writer will use to answer a viewer.

You get two sets of findings: one from the channel's own video transcripts, one from a web search.

- The transcripts are the channel's own words. When both sources cover the same point, the transcript wins.
- Use web findings to fill in what the transcripts do not cover.
- Drop duplicates.
- When the sources disagree, say so and state both positions.
- When something the question needs is missing, say what is missing.
- Never invent facts that are not in the findings.

If the findings contain nothing relevant to the question, reply with exactly NO_INFORMATION."#,
                r#"Question:
{{question}}

Transcript findings:
{{transcript_results}}

Web search findings:
{{web_results}}"#,
            ),

            question: StagePrompt::new(
                r#"You answer viewer questions on the channel, in the creator's own voice.

These are real replies the creator has written. Match their tone, language mix and length:

{{exemplars}}

Accuracy rules:
- use only the facts in the research brief you are given
- if the brief does not answer the question, reply with exactly:
{{fallback}}
- if the brief answers only part of it, say what you know and what you don't

Reply with the response text only."#,
                r#"Question:
{{question}}

Research brief:
{{summary}}"#,
            ),

            variables: HashMap::new(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let stages: [(&str, &mut StagePrompt); 6] = [
                ("filter", &mut prompts.filter),
                ("router", &mut prompts.router),
                ("praise", &mut prompts.praise),
                ("search", &mut prompts.search),
                ("synthesis", &mut prompts.synthesis),
                ("question", &mut prompts.question),
            ];

            for (name, slot) in stages {
                let path = custom_path.join(format!("{}.toml", name));
                if path.exists() {
                    let content = std::fs::read_to_string(&path)?;
                    *slot = toml::from_str(&content)?;
                }
            }
        }

        Ok(prompts)
    }

    /// Templates for a given stage.
    pub fn stage(&self, kind: StageKind) -> &StagePrompt {
        match kind {
            StageKind::Filter => &self.filter,
            StageKind::Router => &self.router,
            StageKind::Praise => &self.praise,
            StageKind::WebSearch => &self.search,
            StageKind::Synthesis => &self.synthesis,
            StageKind::Question => &self.question,
        }
    }

    /// Render a prompt template with the given variables.
    ///
    /// Single pass over the template: substituted values are never scanned again, and
    /// placeholders without a variable are left as they are.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("{{") {
            result.push_str(&rest[..start]);
            let after_open = &rest[start + 2..];
            match after_open.find("}}") {
                Some(end) => {
                    let name = &after_open[..end];
                    match vars.get(name) {
                        Some(value) => result.push_str(value),
                        None => {
                            result.push_str("{{");
                            result.push_str(name);
                            result.push_str("}}");
                        }
                    }
                    rest = &after_open[end + 2..];
                }
                None => {
                    result.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }

        result.push_str(rest);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.filter.system.contains("ACCEPT"));
        assert!(prompts.router.system.contains("Question"));
        assert!(prompts.search.system.contains(NO_RELEVANT_RESULTS));
        assert!(prompts.synthesis.system.contains(NO_INFORMATION));
        assert!(prompts.question.system.contains("{{fallback}}"));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_render_does_not_expand_placeholders_in_values() {
        let template = "{{exemplars}}\n\nComment:\n{{comment}}";
        let mut vars = HashMap::new();
        vars.insert("comment".to_string(), "nice video {{exemplars}} {{fallback".to_string());
        vars.insert("exemplars".to_string(), "Comment: hi\nReply: hello".to_string());

        let expected = "Comment: hi\nReply: hello\n\nComment:\nnice video {{exemplars}} {{fallback";
        for _ in 0..32 {
            let vars = vars.clone().into_iter().collect::<HashMap<_, _>>();
            assert_eq!(Prompts::render(template, &vars), expected);
        }
    }

    #[test]
    fn test_render_keeps_unknown_and_unclosed_placeholders() {
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Asha".to_string());

        assert_eq!(
            Prompts::render("{{name}} {{unknown}} {{name", &vars),
            "Asha {{unknown}} {{name"
        );
        assert_eq!(Prompts::render("धन्यवाद {{name}}!", &vars), "धन्यवाद Asha!");
    }

    #[test]
    fn test_load_stage_override_from_custom_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("router.toml"),
            "system = \"custom router\"\nuser = \"{{comment}}\"\n",
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str(), None).unwrap();
        assert_eq!(prompts.router.system, "custom router");
        assert_eq!(prompts.router.user, "{{comment}}");
        assert_eq!(prompts.filter.user, Prompts::default().filter.user);
    }
}
