//! Structural characterization engine
//!
//! Computes counts and statistics of the feature tree and its cross-tree
//! constraints. Configuration counting only considers the tree; constraints
//! are not taken into account.

use std::collections::BTreeSet;

use crate::domain::characterization::{
    Characterizer, FactValue, FmCharacterization, FmFact, FmMetadata,
};
use crate::domain::feature_model::{ConstraintKind, Feature, FeatureModel, RelationKind};
use crate::domain::DomainError;

/// Characterizer based on the shape of the feature tree
#[derive(Debug, Clone, Default)]
pub struct StructuralCharacterizer;

impl StructuralCharacterizer {
    pub fn new() -> Self {
        Self
    }
}

impl Characterizer for StructuralCharacterizer {
    fn characterize(
        &self,
        model: &FeatureModel,
        name: &str,
    ) -> Result<FmCharacterization, DomainError> {
        Ok(FmCharacterization {
            metadata: FmMetadata::named(name),
            metrics: metrics(model),
            analysis: analysis(model),
        })
    }
}

#[derive(Debug, Default)]
struct TreeStats {
    features: usize,
    abstract_leaf: usize,
    abstract_compound: usize,
    concrete_leaf: usize,
    concrete_compound: usize,
    solitary: usize,
    grouped: usize,
    mandatory: usize,
    optional: usize,
    or_groups: usize,
    alternative_groups: usize,
    cardinality_groups: usize,
    max_depth: usize,
    leaf_depth_sum: usize,
    min_children: Option<usize>,
    max_children: usize,
    children_sum: usize,
}

impl TreeStats {
    fn collect(model: &FeatureModel) -> Self {
        let mut stats = Self::default();

        for visit in model.walk() {
            let feature = visit.feature;
            stats.features += 1;

            let leaf = feature.is_leaf();
            match (feature.is_abstract, leaf) {
                (true, true) => stats.abstract_leaf += 1,
                (true, false) => stats.abstract_compound += 1,
                (false, true) => stats.concrete_leaf += 1,
                (false, false) => stats.concrete_compound += 1,
            }

            match visit.parent_relation {
                Some(kind) if kind.is_group() => stats.grouped += 1,
                Some(_) => stats.solitary += 1,
                None => {}
            }

            if leaf {
                stats.leaf_depth_sum += visit.depth;
                stats.max_depth = stats.max_depth.max(visit.depth);
            } else {
                let children = feature.children().count();
                stats.children_sum += children;
                stats.max_children = stats.max_children.max(children);
                stats.min_children = Some(stats.min_children.map_or(children, |m| m.min(children)));
            }

            for relation in &feature.relations {
                match relation.kind {
                    RelationKind::Mandatory => stats.mandatory += 1,
                    RelationKind::Optional => stats.optional += 1,
                    RelationKind::Or => stats.or_groups += 1,
                    RelationKind::Alternative => stats.alternative_groups += 1,
                    RelationKind::Cardinality { .. } => stats.cardinality_groups += 1,
                }
            }
        }

        stats
    }

    fn leaves(&self) -> usize {
        self.abstract_leaf + self.concrete_leaf
    }

    fn compounds(&self) -> usize {
        self.abstract_compound + self.concrete_compound
    }
}

fn mean(sum: usize, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}

fn count(value: usize) -> FactValue {
    FactValue::Int(value as u64)
}

fn metrics(model: &FeatureModel) -> Vec<FmFact> {
    let stats = TreeStats::collect(model);
    let total = stats.features;
    let abstract_total = stats.abstract_leaf + stats.abstract_compound;
    let concrete_total = stats.concrete_leaf + stats.concrete_compound;
    let relationships = stats.mandatory
        + stats.optional
        + stats.or_groups
        + stats.alternative_groups
        + stats.cardinality_groups;

    let top_features: Vec<String> = model.root.children().map(|f| f.name.clone()).collect();

    let mut facts = vec![
        FmFact::new("Features", "Number of features in the model", count(total)),
        FmFact::new("Abstract features", "Features without implementation artifacts", count(abstract_total))
            .at_level(1)
            .with_ratio(abstract_total, total),
        FmFact::new("Abstract leaf features", "Abstract features without children", count(stats.abstract_leaf))
            .at_level(2)
            .with_ratio(stats.abstract_leaf, abstract_total),
        FmFact::new("Abstract compound features", "Abstract features with children", count(stats.abstract_compound))
            .at_level(2)
            .with_ratio(stats.abstract_compound, abstract_total),
        FmFact::new("Concrete features", "Features mapped to implementation artifacts", count(concrete_total))
            .at_level(1)
            .with_ratio(concrete_total, total),
        FmFact::new("Concrete leaf features", "Concrete features without children", count(stats.concrete_leaf))
            .at_level(2)
            .with_ratio(stats.concrete_leaf, concrete_total),
        FmFact::new("Concrete compound features", "Concrete features with children", count(stats.concrete_compound))
            .at_level(2)
            .with_ratio(stats.concrete_compound, concrete_total),
        FmFact::new("Compound features", "Features with children", count(stats.compounds()))
            .at_level(1)
            .with_ratio(stats.compounds(), total),
        FmFact::new("Leaf features", "Features without children", count(stats.leaves()))
            .at_level(1)
            .with_ratio(stats.leaves(), total),
        FmFact::new("Root feature", "Root of the feature tree", FactValue::Text(model.root.name.clone()))
            .at_level(1),
        FmFact::new("Top features", "Children of the root feature", FactValue::Names(top_features))
            .at_level(1),
        FmFact::new("Solitary features", "Features not belonging to a group", count(stats.solitary))
            .at_level(1)
            .with_ratio(stats.solitary, total),
        FmFact::new("Grouped features", "Features belonging to an or, alternative or cardinality group", count(stats.grouped))
            .at_level(1)
            .with_ratio(stats.grouped, total),
        FmFact::new("Tree relationships", "Relations between features in the tree", count(relationships)),
        FmFact::new("Mandatory features", "Mandatory parent-child relations", count(stats.mandatory))
            .at_level(1)
            .with_ratio(stats.mandatory, relationships),
        FmFact::new("Optional features", "Optional parent-child relations", count(stats.optional))
            .at_level(1)
            .with_ratio(stats.optional, relationships),
        FmFact::new("Or groups", "Groups selecting at least one child", count(stats.or_groups))
            .at_level(1)
            .with_ratio(stats.or_groups, relationships),
        FmFact::new("Alternative groups", "Groups selecting exactly one child", count(stats.alternative_groups))
            .at_level(1)
            .with_ratio(stats.alternative_groups, relationships),
        FmFact::new("Group cardinality", "Groups with explicit cardinality bounds", count(stats.cardinality_groups))
            .at_level(1)
            .with_ratio(stats.cardinality_groups, relationships),
        FmFact::new("Depth of tree", "Length of the longest path from the root to a leaf", count(stats.max_depth)),
        FmFact::new("Mean depth of tree", "Average path length from the root to a leaf", FactValue::Float(mean(stats.leaf_depth_sum, stats.leaves())))
            .at_level(1),
        FmFact::new("Branching factor", "Average number of children of compound features", FactValue::Float(mean(stats.children_sum, stats.compounds()))),
        FmFact::new("Min children", "Fewest children of a compound feature", count(stats.min_children.unwrap_or(0)))
            .at_level(1),
        FmFact::new("Max children", "Most children of a compound feature", count(stats.max_children))
            .at_level(1),
    ];

    facts.extend(constraint_metrics(model, total));
    facts
}

fn constraint_metrics(model: &FeatureModel, total_features: usize) -> Vec<FmFact> {
    let constraints = model.constraints.len();
    let of_kind = |kind: ConstraintKind| {
        model
            .constraints
            .iter()
            .filter(|c| c.kind() == kind)
            .count()
    };
    let requires = of_kind(ConstraintKind::Requires);
    let excludes = of_kind(ConstraintKind::Excludes);
    let complex = of_kind(ConstraintKind::Complex);

    let mut referenced = BTreeSet::new();
    let mut references = 0;
    for constraint in &model.constraints {
        let variables = constraint.formula.variables();
        references += variables.len();
        referenced.extend(variables);
    }

    vec![
        FmFact::new("Cross-tree constraints", "Constraints outside the feature tree", count(constraints)),
        FmFact::new("Requires constraints", "Constraints of the form A => B", count(requires))
            .at_level(1)
            .with_ratio(requires, constraints),
        FmFact::new("Excludes constraints", "Constraints of the form A => !B", count(excludes))
            .at_level(1)
            .with_ratio(excludes, constraints),
        FmFact::new("Complex constraints", "Any other propositional constraint", count(complex))
            .at_level(1)
            .with_ratio(complex, constraints),
        FmFact::new("Features in constraints", "Distinct features referenced by constraints", count(referenced.len()))
            .with_ratio(referenced.len(), total_features),
        FmFact::new("Avg constraints per feature", "Average number of constraints referencing each constrained feature", FactValue::Float(mean(references, referenced.len()))),
    ]
}

fn analysis(model: &FeatureModel) -> Vec<FmFact> {
    let configurations = match tree_configurations(&model.root) {
        Some(value) => match u64::try_from(value) {
            Ok(small) => FactValue::Int(small),
            Err(_) => FactValue::Text(value.to_string()),
        },
        None => FactValue::Text("> 2^128".to_string()),
    };

    let total = model.walk().len();
    let core = core_features(&model.root);

    vec![
        FmFact::new(
            "Tree configurations",
            "Configurations of the feature tree, ignoring cross-tree constraints",
            configurations,
        ),
        FmFact::new("Core features (tree)", "Features present in every configuration of the tree", count(core))
            .with_ratio(core, total),
        FmFact::new("Variant features (tree)", "Features present in some configurations of the tree", count(total - core))
            .with_ratio(total - core, total),
    ]
}

/// Number of configurations of the subtree rooted at a selected `feature`,
/// or `None` on overflow
fn tree_configurations(feature: &Feature) -> Option<u128> {
    let mut total: u128 = 1;

    for relation in &feature.relations {
        let counts = relation
            .children
            .iter()
            .map(tree_configurations)
            .collect::<Option<Vec<_>>>()?;

        let relation_total = match relation.kind {
            RelationKind::Mandatory => counts.first().copied().unwrap_or(1),
            RelationKind::Optional => counts.first().copied().unwrap_or(0).checked_add(1)?,
            _ => {
                let (min, max) = relation.bounds();
                let sums = elementary_symmetric(&counts, max)?;
                let mut selected: u128 = 0;
                for k in min..=max {
                    selected = selected.checked_add(*sums.get(k)?)?;
                }
                selected
            }
        };

        total = total.checked_mul(relation_total)?;
    }

    Some(total)
}

/// `e[k]` = sum over all k-subsets of `values` of their product, for `k <= max`
fn elementary_symmetric(values: &[u128], max: usize) -> Option<Vec<u128>> {
    let mut e = vec![0u128; max + 1];
    e[0] = 1;

    for &value in values {
        for k in (1..=max).rev() {
            e[k] = e[k].checked_add(e[k - 1].checked_mul(value)?)?;
        }
    }

    Some(e)
}

/// Features selected in every configuration of the tree
fn core_features(root: &Feature) -> usize {
    let mut core = 1;
    let mut stack = vec![root];

    while let Some(feature) = stack.pop() {
        for relation in &feature.relations {
            let (min, _) = relation.bounds();
            if relation.kind == RelationKind::Mandatory || min >= relation.children.len() {
                core += relation.children.len();
                stack.extend(relation.children.iter());
            }
        }
    }

    core
}
