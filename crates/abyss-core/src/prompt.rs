//! Decision prompt rendering via `minijinja`.
//!
//! The built-in templates are compiled into the binary. Operators can point
//! `cognition.templates_dir` at a directory holding `identity.j2`,
//! `perception.j2`, `memory.j2` and `actions.j2` to tune the framing without
//! recompiling. Sections that render empty are left out of the final prompt.

use std::path::{Path, PathBuf};

use minijinja::Environment;

use crate::perception::Perception;

/// Section templates, in prompt order.
const SECTIONS: [&str; 4] = ["identity", "perception", "memory", "actions"];

const BUILTIN: [(&str, &str); 4] = [
    ("identity", include_str!("../templates/identity.j2")),
    ("perception", include_str!("../templates/perception.j2")),
    ("memory", include_str!("../templates/memory.j2")),
    ("actions", include_str!("../templates/actions.j2")),
];

/// Errors from loading or rendering prompt templates.
#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    /// A template file could not be read.
    #[error("failed to read template {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A template failed to compile or render.
    #[error("template {name}: {source}")]
    Template {
        /// Template name.
        name: &'static str,
        /// The underlying minijinja error.
        source: minijinja::Error,
    },
}

/// Renders a [`Perception`] into the user prompt sent to the oracle.
#[derive(Debug)]
pub struct PromptEngine {
    env: Environment<'static>,
}

impl PromptEngine {
    /// Engine using the built-in templates.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError::Template`] if a built-in template fails to
    /// compile.
    pub fn builtin() -> Result<Self, PromptError> {
        let mut env = Environment::new();
        for (name, source) in BUILTIN {
            env.add_template(name, source)
                .map_err(|source| PromptError::Template { name, source })?;
        }
        Ok(Self { env })
    }

    /// Engine loading every section template from `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError::Io`] if a file is missing or unreadable and
    /// [`PromptError::Template`] if one fails to compile.
    pub fn from_dir(dir: &Path) -> Result<Self, PromptError> {
        let mut env = Environment::new();
        for name in SECTIONS {
            let path = dir.join(format!("{name}.j2"));
            let source = std::fs::read_to_string(&path)
                .map_err(|source| PromptError::Io { path, source })?;
            env.add_template_owned(name, source)
                .map_err(|source| PromptError::Template { name, source })?;
        }
        Ok(Self { env })
    }

    /// Engine for an optional override directory.
    ///
    /// # Errors
    ///
    /// Propagates [`PromptEngine::from_dir`] or [`PromptEngine::builtin`]
    /// failures.
    pub fn load(dir: Option<&Path>) -> Result<Self, PromptError> {
        match dir {
            Some(dir) => Self::from_dir(dir),
            None => Self::builtin(),
        }
    }

    /// Render the user prompt for one decision.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError::Template`] if any section fails to render.
    pub fn render(&self, perception: &Perception) -> Result<String, PromptError> {
        let mut sections = Vec::with_capacity(SECTIONS.len());
        for name in SECTIONS {
            let rendered = self
                .env
                .get_template(name)
                .and_then(|template| template.render(perception))
                .map_err(|source| PromptError::Template { name, source })?;
            if !rendered.trim().is_empty() {
                sections.push(rendered);
            }
        }
        Ok(sections.join("\n\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::perception::{FoodSighting, NearbyView, Urgency};

    fn perception(urgency: Urgency) -> Perception {
        Perception {
            name: "Bit_3".to_owned(),
            personality: "manipulator".to_owned(),
            core_trait: "You deceive others.",
            energy: "15".to_owned(),
            urgency,
            food: Some(FoodSighting {
                kind: "rich".to_owned(),
                distance: "42".to_owned(),
                note: Some("(RICH - extra energy!)"),
            }),
            nearby: vec![NearbyView {
                name: "Bit_1".to_owned(),
                personality: "altruist".to_owned(),
                distance: "20".to_owned(),
                energy: "90".to_owned(),
                strength: "STRONGER than you",
                relation: "friend",
                relation_icon: "💚",
                says: Some("hello".to_owned()),
            }],
            memories: vec!["Consumed common nutrient (+21 energy)".to_owned()],
        }
    }

    #[test]
    fn builtin_prompt_contains_every_section() {
        let engine = PromptEngine::builtin();
        assert!(engine.is_ok());
        let Ok(engine) = engine else { return };

        let prompt = engine.render(&perception(Urgency::Critical));
        assert!(prompt.is_ok(), "{prompt:?}");
        let prompt = prompt.unwrap_or_default();

        assert!(prompt.contains("Name: Bit_3"));
        assert!(prompt.contains("Personality: MANIPULATOR"));
        assert!(prompt.contains("Energy: 15%"));
        assert!(prompt.contains("CRITICAL: You are STARVING!"));
        assert!(prompt.contains("🍃 Food (RICH - extra energy!): 42 units away"));
        assert!(prompt.contains("Bit_1 [altruist] - 20 units away"));
        assert!(prompt.contains("(STRONGER than you)"));
        assert!(prompt.contains("Relationship: 💚 friend"));
        assert!(prompt.contains("Says: \"hello\""));
        assert!(prompt.contains("Consumed common nutrient (+21 energy)"));
        assert!(prompt.contains("REMINDER: You are STARVING!"));
    }

    #[test]
    fn alone_and_calm_prompt() {
        let Ok(engine) = PromptEngine::builtin() else {
            return;
        };
        let mut view = perception(Urgency::Normal);
        view.food = None;
        view.nearby.clear();
        view.memories.clear();

        let prompt = engine.render(&view).unwrap_or_default();
        assert!(prompt.contains("No food visible nearby"));
        assert!(prompt.contains("You are alone"));
        assert!(!prompt.contains("recent memories"));
        assert!(!prompt.contains("STARVING"));
    }

    #[test]
    fn missing_template_dir_is_an_io_error() {
        let result = PromptEngine::from_dir(Path::new("/nonexistent/abyss-templates"));
        assert!(matches!(result, Err(PromptError::Io { .. })));
    }

    #[test]
    fn templates_load_from_directory() {
        let dir = std::env::temp_dir().join(format!("abyss_templates_{}", std::process::id()));
        std::fs::create_dir_all(&dir).ok();
        for name in SECTIONS {
            std::fs::write(dir.join(format!("{name}.j2")), format!("[{name}] {{{{ name }}}}")).ok();
        }

        let engine = PromptEngine::load(Some(&dir));
        assert!(engine.is_ok(), "{engine:?}");
        let prompt = engine
            .ok()
            .and_then(|e| e.render(&perception(Urgency::High)).ok())
            .unwrap_or_default();
        assert!(prompt.starts_with("[identity] Bit_3"));
        assert!(prompt.ends_with("[actions] Bit_3"));
        std::fs::remove_dir_all(&dir).ok();
    }
}
