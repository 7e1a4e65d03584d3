//! # Filler
//! Anything that fills one or more placeholders in a [PartialPrompt].

use crate::prompt::{PartialPrompt, Variables};
use anyhow::Result;

pub trait FillPlaceholders {
    fn placeholders_to_fill(&self) -> &Vec<String>;
}

pub trait Fill: FillPlaceholders {
    fn fill(&self, partial_prompt: &mut PartialPrompt) -> Result<()>;
}

pub trait FillWith<CTX>: FillPlaceholders {
    fn fill_with(&self, partial_prompt: &mut PartialPrompt, context: CTX) -> Result<CTX>;
}

impl<T: FillWith<()>> Fill for T {
    fn fill(&self, partial_prompt: &mut PartialPrompt) -> Result<()> {
        self.fill_with(partial_prompt, ())
    }
}

/// Fills placeholders from a map of values. Values for placeholders the template does not have are skipped.
#[derive(Debug, Clone)]
pub struct VariablesFiller {
    variables: Variables,
    placeholders_to_fill: Vec<String>,
}

impl VariablesFiller {
    pub fn new(variables: Variables) -> Self {
        let mut placeholders_to_fill: Vec<String> = variables.keys().cloned().collect();
        placeholders_to_fill.sort();
        Self {
            variables,
            placeholders_to_fill,
        }
    }
}

impl FillPlaceholders for VariablesFiller {
    fn placeholders_to_fill(&self) -> &Vec<String> {
        &self.placeholders_to_fill
    }
}

impl FillWith<()> for VariablesFiller {
    fn fill_with(&self, partial_prompt: &mut PartialPrompt, context: ()) -> Result<()> {
        for placeholder in &self.placeholders_to_fill {
            if partial_prompt.template.placeholders.contains(placeholder) {
                partial_prompt.try_fill(placeholder.as_str(), self.variables[placeholder].as_str())?;
            }
        }
        Ok(context)
    }
}

#[cfg(test)]
mod test_filler {
    use super::{Fill, FillPlaceholders, VariablesFiller};
    use crate::prompt::{variables, PromptTemplate};

    #[test]
    fn test_variables_filler() {
        let template = PromptTemplate::new("{sport} in {country}");
        let mut partial_prompt = template.construct_prompt();
        let filler = VariablesFiller::new(variables([("sport", "Rugby"), ("ignored", "x")]));
        assert_eq!(&vec!["ignored".to_string(), "sport".to_string()], filler.placeholders_to_fill());

        filler.fill(&mut partial_prompt).unwrap();
        assert!(!partial_prompt.is_complete());

        VariablesFiller::new(variables([("country", "France")])).fill(&mut partial_prompt).unwrap();
        assert_eq!("Rugby in France", partial_prompt.complete().unwrap());
    }
}
