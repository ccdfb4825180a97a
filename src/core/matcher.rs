use crate::core::ProjectRef;
use crate::utils::error::{QuotaComparerError, Result};
use regex::Regex;

const PLACEHOLDER: &str = "%s";

/// Pairs source projects with target projects through a shared name.
///
/// The source pattern extracts an environment-independent name from a source
/// project id with its single capture group. That name is substituted for the
/// `%s` in the target template, and the resulting regex selects the target.
#[derive(Debug, Clone)]
pub struct NameMatcher {
    source: Regex,
    target_template: String,
}

impl NameMatcher {
    pub fn new(source_pattern: &str, target_template: &str) -> Result<Self> {
        let source = Regex::new(source_pattern)?;

        // captures_len counts the implicit whole-match group
        let groups = source.captures_len() - 1;
        if groups != 1 {
            return Err(QuotaComparerError::InvalidConfigValueError {
                field: "regex.from".to_string(),
                value: source_pattern.to_string(),
                reason: format!("Pattern must have exactly one capture group, found {}", groups),
            });
        }

        let placeholders = target_template.matches(PLACEHOLDER).count();
        if placeholders != 1 {
            return Err(QuotaComparerError::InvalidTemplate {
                template: target_template.to_string(),
                reason: format!(
                    "Template must contain exactly one {} placeholder, found {}",
                    PLACEHOLDER, placeholders
                ),
            });
        }

        Ok(Self {
            source,
            target_template: target_template.to_string(),
        })
    }

    /// Name captured from a source project id.
    pub fn canonical_name<'a>(&self, project_id: &'a str) -> Result<&'a str> {
        self.source
            .captures(project_id)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .ok_or_else(|| QuotaComparerError::PatternMismatch {
                project_id: project_id.to_string(),
                pattern: self.source.as_str().to_string(),
            })
    }

    /// Target regex for a canonical name. The name is inserted verbatim.
    pub fn target_pattern(&self, name: &str) -> Result<Regex> {
        let pattern = self.target_template.replacen(PLACEHOLDER, name, 1);
        Ok(Regex::new(&pattern)?)
    }

    /// First candidate, in the given order, whose id satisfies the target
    /// pattern derived from `from`.
    pub fn find_match<'a>(
        &self,
        from: &ProjectRef,
        candidates: &'a [ProjectRef],
    ) -> Result<TargetMatch<'a>> {
        let name = self.canonical_name(&from.id)?;
        let pattern = self.target_pattern(name)?;
        let project = candidates.iter().find(|c| pattern.is_match(&c.id));
        Ok(TargetMatch { pattern, project })
    }
}

/// Outcome of a target search: the derived pattern and the project it
/// selected, if any.
#[derive(Debug, Clone)]
pub struct TargetMatch<'a> {
    pub pattern: Regex,
    pub project: Option<&'a ProjectRef>,
}
