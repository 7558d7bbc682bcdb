//! Module for the lint rules.

use cstyle_ast::Visitor;

use crate::Config;
use crate::Diagnostics;
use crate::TagSet;

mod expression_indentation;
mod unnecessary_if_braces;

pub use expression_indentation::*;
pub use unnecessary_if_braces::*;

/// A trait implemented by lint rules.
pub trait Rule: Visitor<State = Diagnostics> + Send + Sync {
    /// The unique identifier for the lint rule.
    ///
    /// The identifier is required to be pascal case.
    ///
    /// This is the identifier by which a lint rule is disabled.
    fn id(&self) -> &'static str;

    /// A short, single sentence description of the lint rule.
    fn description(&self) -> &'static str;

    /// Get the long-form explanation of the lint rule.
    fn explanation(&self) -> &'static str;

    /// Get the tags of the lint rule.
    fn tags(&self) -> TagSet;

    /// Gets the identifiers of rules related to this one.
    fn related_rules(&self) -> &[&'static str];
}

/// Gets all of the lint rules, configured with the given configuration.
pub fn rules(config: &Config) -> Vec<Box<dyn Rule>> {
    let rules: Vec<Box<dyn Rule>> = vec![
        Box::new(ExpressionIndentationRule::new(config)),
        Box::new(UnnecessaryIfBracesRule),
    ];

    // Ensure all the rule ids are unique and pascal case
    #[cfg(debug_assertions)]
    {
        use convert_case::Case;
        use convert_case::Casing;
        let mut set = std::collections::HashSet::new();
        for r in rules.iter() {
            if r.id().to_case(Case::Pascal) != r.id() {
                panic!("lint rule id `{id}` is not pascal case", id = r.id());
            }

            if !set.insert(r.id()) {
                panic!("duplicate rule id `{id}`", id = r.id());
            }
        }
    }

    rules
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::Tag;

    #[test]
    fn rule_set() {
        let rules = rules(&Config::default());
        let ids: Vec<_> = rules.iter().map(|r| r.id()).collect();
        assert_eq!(ids, ["ExpressionIndentation", "UnnecessaryIfBraces"]);

        for rule in &rules {
            assert!(rule.description().ends_with('.'));
            for related in rule.related_rules() {
                assert!(ids.contains(related), "unknown related rule `{related}`");
            }
        }

        assert!(rules[0].tags().contains(Tag::Style));
    }
}
