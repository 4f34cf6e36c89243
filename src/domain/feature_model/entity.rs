//! Feature model entities

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use crate::domain::DomainError;

/// Kind of a parent-child relation in the feature tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// Single child that is selected whenever its parent is
    Mandatory,
    /// Single child that may be selected when its parent is
    Optional,
    /// At least one child of the group
    Or,
    /// Exactly one child of the group
    Alternative,
    /// Between `min` and `max` children of the group
    Cardinality { min: usize, max: usize },
}

impl RelationKind {
    /// Whether the relation groups several children
    pub fn is_group(&self) -> bool {
        !matches!(self, Self::Mandatory | Self::Optional)
    }
}

/// A relation from a feature to one or more children
#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    pub kind: RelationKind,
    pub children: Vec<Feature>,
}

impl Relation {
    pub fn mandatory(child: Feature) -> Self {
        Self {
            kind: RelationKind::Mandatory,
            children: vec![child],
        }
    }

    pub fn optional(child: Feature) -> Self {
        Self {
            kind: RelationKind::Optional,
            children: vec![child],
        }
    }

    pub fn group(kind: RelationKind, children: Vec<Feature>) -> Self {
        Self { kind, children }
    }

    /// Bounds on how many children are selected together with the parent
    pub fn bounds(&self) -> (usize, usize) {
        let count = self.children.len();

        match self.kind {
            RelationKind::Mandatory => (1, 1),
            RelationKind::Optional => (0, 1),
            RelationKind::Or => (1, count),
            RelationKind::Alternative => (1, 1),
            RelationKind::Cardinality { min, max } => (min, max.min(count)),
        }
    }
}

/// A feature in the feature tree
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub name: String,
    pub is_abstract: bool,
    pub relations: Vec<Relation>,
}

impl Feature {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_abstract: false,
            relations: Vec::new(),
        }
    }

    pub fn with_abstract(mut self, is_abstract: bool) -> Self {
        self.is_abstract = is_abstract;
        self
    }

    pub fn with_relation(mut self, relation: Relation) -> Self {
        self.relations.push(relation);
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.relations.iter().all(|r| r.children.is_empty())
    }

    /// Direct children across all relations
    pub fn children(&self) -> impl Iterator<Item = &Feature> {
        self.relations.iter().flat_map(|r| r.children.iter())
    }
}

/// Propositional formula over feature names
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Formula {
    Var(String),
    Not(Box<Formula>),
    And(Box<Formula>, Box<Formula>),
    Or(Box<Formula>, Box<Formula>),
    Implies(Box<Formula>, Box<Formula>),
    Iff(Box<Formula>, Box<Formula>),
}

impl Formula {
    pub fn var(name: impl Into<String>) -> Self {
        Self::Var(name.into())
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(inner: Formula) -> Self {
        Self::Not(Box::new(inner))
    }

    pub fn and(left: Formula, right: Formula) -> Self {
        Self::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Formula, right: Formula) -> Self {
        Self::Or(Box::new(left), Box::new(right))
    }

    pub fn implies(left: Formula, right: Formula) -> Self {
        Self::Implies(Box::new(left), Box::new(right))
    }

    pub fn iff(left: Formula, right: Formula) -> Self {
        Self::Iff(Box::new(left), Box::new(right))
    }

    /// Feature names referenced by the formula
    pub fn variables(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        self.collect_variables(&mut names);
        names
    }

    fn collect_variables<'a>(&'a self, names: &mut BTreeSet<&'a str>) {
        match self {
            Self::Var(name) => {
                names.insert(name.as_str());
            }
            Self::Not(inner) => inner.collect_variables(names),
            Self::And(l, r) | Self::Or(l, r) | Self::Implies(l, r) | Self::Iff(l, r) => {
                l.collect_variables(names);
                r.collect_variables(names);
            }
        }
    }

    fn is_atomic(&self) -> bool {
        matches!(self, Self::Var(_) | Self::Not(_))
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let operand = |f: &mut fmt::Formatter<'_>, formula: &Formula| {
            if formula.is_atomic() {
                write!(f, "{}", formula)
            } else {
                write!(f, "({})", formula)
            }
        };

        match self {
            Self::Var(name) if name.chars().all(|c| c.is_alphanumeric() || c == '_') => {
                write!(f, "{}", name)
            }
            Self::Var(name) => write!(f, "\"{}\"", name),
            Self::Not(inner) => {
                write!(f, "!")?;
                operand(f, inner)
            }
            Self::And(l, r) | Self::Or(l, r) | Self::Implies(l, r) | Self::Iff(l, r) => {
                let op = match self {
                    Self::And(..) => "&",
                    Self::Or(..) => "|",
                    Self::Implies(..) => "=>",
                    _ => "<=>",
                };
                operand(f, l)?;
                write!(f, " {} ", op)?;
                operand(f, r)
            }
        }
    }
}

/// Shape of a cross-tree constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    /// `A => B`
    Requires,
    /// `A => !B` or `!(A & B)`
    Excludes,
    /// Anything else
    Complex,
}

/// Cross-tree constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub formula: Formula,
}

impl Constraint {
    pub fn new(formula: Formula) -> Self {
        Self { formula }
    }

    pub fn kind(&self) -> ConstraintKind {
        use Formula::{And, Implies, Not, Var};

        match &self.formula {
            Implies(l, r) => match (l.as_ref(), r.as_ref()) {
                (Var(_), Var(_)) => ConstraintKind::Requires,
                (Var(_), Not(inner)) if matches!(inner.as_ref(), Var(_)) => {
                    ConstraintKind::Excludes
                }
                _ => ConstraintKind::Complex,
            },
            Not(inner) => match inner.as_ref() {
                And(l, r) if matches!((l.as_ref(), r.as_ref()), (Var(_), Var(_))) => {
                    ConstraintKind::Excludes
                }
                _ => ConstraintKind::Complex,
            },
            _ => ConstraintKind::Complex,
        }
    }
}

/// Parsed feature model: a feature tree plus cross-tree constraints
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureModel {
    pub root: Feature,
    pub constraints: Vec<Constraint>,
}

/// A feature visited during a tree walk
#[derive(Debug, Clone, Copy)]
pub struct FeatureVisit<'a> {
    pub feature: &'a Feature,
    pub depth: usize,
    /// Kind of the relation linking the feature to its parent (`None` for the root)
    pub parent_relation: Option<RelationKind>,
}

impl FeatureModel {
    pub fn new(root: Feature) -> Self {
        Self {
            root,
            constraints: Vec::new(),
        }
    }

    pub fn with_constraints(mut self, constraints: Vec<Constraint>) -> Self {
        self.constraints = constraints;
        self
    }

    /// Pre-order walk of the feature tree
    pub fn walk(&self) -> Vec<FeatureVisit<'_>> {
        let mut visits = Vec::new();
        let mut stack = vec![FeatureVisit {
            feature: &self.root,
            depth: 0,
            parent_relation: None,
        }];

        while let Some(visit) = stack.pop() {
            for relation in visit.feature.relations.iter().rev() {
                for child in relation.children.iter().rev() {
                    stack.push(FeatureVisit {
                        feature: child,
                        depth: visit.depth + 1,
                        parent_relation: Some(relation.kind),
                    });
                }
            }
            visits.push(visit);
        }

        visits
    }

    pub fn feature_names(&self) -> Vec<&str> {
        self.walk().iter().map(|v| v.feature.name.as_str()).collect()
    }

    /// Check structural well-formedness: unique feature names, constraints
    /// only referencing declared features, groups with children
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut seen = HashSet::new();

        for visit in self.walk() {
            let feature = visit.feature;

            if feature.name.trim().is_empty() {
                return Err(DomainError::validation("Feature with an empty name"));
            }

            if !seen.insert(feature.name.as_str()) {
                return Err(DomainError::validation(format!(
                    "Duplicate feature '{}'",
                    feature.name
                )));
            }

            for relation in &feature.relations {
                if relation.children.is_empty() {
                    return Err(DomainError::validation(format!(
                        "Feature '{}' has a group without children",
                        feature.name
                    )));
                }

                let (min, max) = relation.bounds();

                if min > max {
                    return Err(DomainError::validation(format!(
                        "Feature '{}' has an unsatisfiable group cardinality [{}..{}]",
                        feature.name, min, max
                    )));
                }
            }
        }

        for constraint in &self.constraints {
            if let Some(unknown) = constraint
                .formula
                .variables()
                .into_iter()
                .find(|name| !seen.contains(name))
            {
                return Err(DomainError::validation(format!(
                    "Constraint '{}' references unknown feature '{}'",
                    constraint.formula, unknown
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_model() -> FeatureModel {
        let root = Feature::new("Pizza")
            .with_abstract(true)
            .with_relation(Relation::mandatory(Feature::new("Dough")))
            .with_relation(Relation::optional(Feature::new("Cheese")))
            .with_relation(Relation::group(
                RelationKind::Alternative,
                vec![Feature::new("Thin"), Feature::new("Thick")],
            ));

        FeatureModel::new(root).with_constraints(vec![Constraint::new(Formula::implies(
            Formula::var("Thin"),
            Formula::var("Cheese"),
        ))])
    }

    #[test]
    fn test_walk_is_pre_order_with_depth() {
        let model = sample_model();
        let visits = model.walk();

        let names: Vec<_> = visits.iter().map(|v| v.feature.name.as_str()).collect();
        assert_eq!(names, vec!["Pizza", "Dough", "Cheese", "Thin", "Thick"]);
        assert_eq!(visits[0].depth, 0);
        assert!(visits[0].parent_relation.is_none());
        assert_eq!(visits[3].depth, 1);
        assert_eq!(visits[3].parent_relation, Some(RelationKind::Alternative));
    }

    #[test]
    fn test_validate_accepts_sample() {
        assert!(sample_model().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let root = Feature::new("Root")
            .with_relation(Relation::optional(Feature::new("A")))
            .with_relation(Relation::optional(Feature::new("A")));

        let err = FeatureModel::new(root).validate().unwrap_err();
        assert!(err.to_string().contains("Duplicate feature 'A'"));
    }

    #[test]
    fn test_validate_rejects_unknown_constraint_feature() {
        let model = FeatureModel::new(Feature::new("Root")).with_constraints(vec![
            Constraint::new(Formula::implies(Formula::var("Root"), Formula::var("Ghost"))),
        ]);

        let err = model.validate().unwrap_err();
        assert!(err.to_string().contains("Ghost"));
    }

    #[test]
    fn test_constraint_kinds() {
        let requires = Constraint::new(Formula::implies(Formula::var("A"), Formula::var("B")));
        let excludes = Constraint::new(Formula::implies(
            Formula::var("A"),
            Formula::not(Formula::var("B")),
        ));
        let nand = Constraint::new(Formula::not(Formula::and(
            Formula::var("A"),
            Formula::var("B"),
        )));
        let complex = Constraint::new(Formula::or(Formula::var("A"), Formula::var("B")));

        assert_eq!(requires.kind(), ConstraintKind::Requires);
        assert_eq!(excludes.kind(), ConstraintKind::Excludes);
        assert_eq!(nand.kind(), ConstraintKind::Excludes);
        assert_eq!(complex.kind(), ConstraintKind::Complex);
    }

    #[test]
    fn test_formula_display() {
        let formula = Formula::implies(
            Formula::and(Formula::var("A"), Formula::var("Extra Cheese")),
            Formula::not(Formula::var("B")),
        );

        assert_eq!(formula.to_string(), "(A & \"Extra Cheese\") => !B");
    }

    #[test]
    fn test_relation_bounds() {
        let group = Relation::group(
            RelationKind::Cardinality { min: 1, max: 5 },
            vec![Feature::new("A"), Feature::new("B")],
        );
        assert_eq!(group.bounds(), (1, 2));
        assert_eq!(Relation::optional(Feature::new("A")).bounds(), (0, 1));
    }
}
